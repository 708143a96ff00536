//! Indexing service (subgraph) access.
//!
//! # Data Flow
//! ```text
//! queries.rs (fixed GraphQL documents)
//!     → client.rs (POST to the chain's endpoint, decode envelope)
//!     → types.rs (typed Created/Claimed records, packet status)
//! ```
//!
//! The indexer is eventually consistent with the chain. Callers treat it
//! as advisory; the contract remains the source of truth.

pub mod client;
pub mod queries;
pub mod types;

pub use client::{normalize_address, EventIndex, SubgraphClient};
pub use types::{
    ClaimedEvent, CreatedEvent, PacketStatus, SubgraphError, SubgraphResult, UserClaim,
};
