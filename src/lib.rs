//! Red packet client library.
//!
//! Reads and writes a red packet contract on an EVM chain and consults an
//! indexing service for claim history.
//!
//! # Layout
//! - [`blockchain`]: chains, contract bindings, RPC, signing, receipts
//! - [`subgraph`]: GraphQL queries against the indexing service
//! - [`packets`]: lookup, claim pre-check, transaction lifecycle, flows
//! - [`history`]: created/claimed events for the connected account
//! - [`scheduling`]: cancellable delayed tasks and debouncing
//! - [`config`] and [`observability`]: the usual

pub mod blockchain;
pub mod config;
pub mod history;
pub mod observability;
pub mod packets;
pub mod scheduling;
pub mod subgraph;

pub use blockchain::{BlockchainClient, WalletContext};
pub use config::AppConfig;
pub use history::HistoryFeed;
pub use packets::{ClaimFlow, CreateFlow, PacketLookup};
pub use subgraph::SubgraphClient;
