//! Event history for the connected account.
//!
//! Refetches are debounced on account or chain changes; a manual refresh
//! runs at once. Failures clear the lists rather than showing stale data.

pub mod feed;

pub use feed::{HistoryEntry, HistoryFeed, HistorySnapshot};
