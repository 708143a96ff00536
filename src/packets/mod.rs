//! Red packet workflows.
//!
//! # Data Flow
//! ```text
//! input.rs (parse ID / amount / count)
//!     → lookup.rs (debounced getPacket read)
//!     → preflight.rs (advisory index check before claiming)
//!     → lifecycle.rs (sign → broadcast → receipt)
//!     → create.rs / claim.rs (user-facing flows)
//! ```
//!
//! Alerts and confirmations go through the injected [`Prompt`].

pub mod claim;
pub mod create;
pub mod input;
pub mod lifecycle;
pub mod lookup;
pub mod preflight;
pub mod prompt;

use thiserror::Error;

use crate::blockchain::types::BlockchainError;

pub use claim::{ClaimFlow, ClaimResult};
pub use create::{CreateFlow, CreateReceipt, CreateRequest};
pub use input::InputError;
pub use lifecycle::{ButtonState, PendingTransaction, TxAction, TxPhase, TxTracker};
pub use lookup::{LookupState, PacketLookup};
pub use preflight::{check_claim, PreflightVerdict};
pub use prompt::{Prompt, TerminalPrompt};

/// Why a create or claim flow stopped with an error.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Blockchain(#[from] BlockchainError),
}
