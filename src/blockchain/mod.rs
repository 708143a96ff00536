//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private key, RPC URL)
//!     → wallet.rs (key loading, signer)
//!     → client.rs (RPC connection with timeouts and failover)
//!     → contract.rs (getPacket reads, calldata, Created log scan)
//!     → transaction.rs (sign, broadcast, wait for receipt)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod chains;
pub mod client;
pub mod context;
pub mod contract;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use context::WalletContext;
pub use contract::{PacketInfo, PacketReader, RedPacketContract};
pub use transaction::{ContractWriter, TxSender};
pub use types::{BlockchainError, BlockchainResult, ChainId, TxOutcome, WriteCall};
pub use wallet::Wallet;
