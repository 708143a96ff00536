//! Timer primitives for debounced reads and one-shot refreshes.
//!
//! # Design Decisions
//! - Cancel-on-reschedule: only the last task scheduled in a window runs
//! - Handles abort on drop, so tearing down an owner cancels its timers
//! - Already-submitted transactions are never cancelled here; only reads

pub mod debounce;

pub use debounce::{Debouncer, DelayedTask};
