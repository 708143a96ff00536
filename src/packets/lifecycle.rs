//! Write lifecycle tracking.
//!
//! ```text
//! Idle → AwaitingSignature → Processing(hash) → Confirmed
//!              ↓                    ↓
//!            Failed              Failed
//! ```
//!
//! A signed transaction is followed to completion; there is no cancel and
//! no automatic retry. The user resubmits after a failure. If the caller
//! stops polling [`TxTracker::execute`] midway, the phase becomes
//! `Failed` with reason [`ABANDONED`] so the tracker is usable again.

use alloy::primitives::TxHash;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

use crate::blockchain::transaction::ContractWriter;
use crate::blockchain::types::{BlockchainError, BlockchainResult, TxOutcome, WriteCall};
use crate::observability::metrics;

/// Failure reason left behind by an execution that was dropped mid-flight.
pub const ABANDONED: &str = "abandoned";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxAction {
    Create,
    Claim,
}

impl TxAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxAction::Create => "create",
            TxAction::Claim => "claim",
        }
    }

    fn processing_label(&self) -> &'static str {
        match self {
            TxAction::Create => "Processing...",
            TxAction::Claim => "Claiming...",
        }
    }

    fn success_label(&self) -> &'static str {
        match self {
            TxAction::Create => "Red packet created!",
            TxAction::Claim => "Claimed successfully!",
        }
    }
}

/// A write that has been broadcast but has no receipt yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub hash: TxHash,
    pub action: TxAction,
    pub submitted_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxPhase {
    Idle,
    /// Waiting for the wallet to sign.
    AwaitingSignature,
    /// Broadcast; waiting for the receipt.
    Processing(PendingTransaction),
    Confirmed { hash: TxHash, block_number: u64 },
    /// Rejected before broadcast (`hash` is `None`), reverted, or timed out.
    Failed { hash: Option<TxHash>, reason: String },
}

impl TxPhase {
    pub fn is_busy(&self) -> bool {
        matches!(self, TxPhase::AwaitingSignature | TxPhase::Processing(_))
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, TxPhase::Confirmed { .. })
    }

    fn name(&self) -> &'static str {
        match self {
            TxPhase::Idle => "idle",
            TxPhase::AwaitingSignature => "awaiting_signature",
            TxPhase::Processing(_) => "processing",
            TxPhase::Confirmed { .. } => "confirmed",
            TxPhase::Failed { .. } => "failed",
        }
    }
}

/// Label and enablement of an action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonState {
    pub label: &'static str,
    pub disabled: bool,
}

impl ButtonState {
    pub fn enabled(label: &'static str) -> Self {
        Self {
            label,
            disabled: false,
        }
    }

    pub fn disabled(label: &'static str) -> Self {
        Self {
            label,
            disabled: true,
        }
    }
}

/// Drives one action's writes and publishes each phase.
pub struct TxTracker {
    action: TxAction,
    writer: Arc<dyn ContractWriter>,
    phase: watch::Sender<TxPhase>,
}

impl TxTracker {
    pub fn new(action: TxAction, writer: Arc<dyn ContractWriter>) -> Self {
        let (phase, _) = watch::channel(TxPhase::Idle);
        Self {
            action,
            writer,
            phase,
        }
    }

    pub fn action(&self) -> TxAction {
        self.action
    }

    pub fn phase(&self) -> TxPhase {
        self.phase.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TxPhase> {
        self.phase.subscribe()
    }

    /// Button for the current phase; `idle_label` when nothing is in flight.
    pub fn button_state(&self, idle_label: &'static str) -> ButtonState {
        match &*self.phase.borrow() {
            TxPhase::AwaitingSignature => ButtonState::disabled("Waiting for signature..."),
            TxPhase::Processing(_) => ButtonState::disabled(self.action.processing_label()),
            TxPhase::Confirmed { .. } => ButtonState::enabled(self.action.success_label()),
            TxPhase::Idle | TxPhase::Failed { .. } => ButtonState::enabled(idle_label),
        }
    }

    /// Submit `call` and follow it to a receipt.
    ///
    /// A mined-but-reverted transaction is returned as
    /// [`BlockchainError::Reverted`].
    pub async fn execute(&self, call: WriteCall) -> BlockchainResult<TxOutcome> {
        let started = self.phase.send_if_modified(|phase| {
            if phase.is_busy() {
                return false;
            }
            *phase = TxPhase::AwaitingSignature;
            true
        });
        if !started {
            return Err(BlockchainError::Rejected(format!(
                "a {} transaction is already in flight",
                self.action.as_str()
            )));
        }
        self.record();
        let _guard = InFlightGuard(self);

        let hash = match self.writer.submit(call).await {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!(action = self.action.as_str(), error = %e, "Transaction not submitted");
                self.fail(None, e.to_string());
                return Err(e);
            }
        };

        tracing::info!(action = self.action.as_str(), tx_hash = %hash, "Transaction submitted");
        self.set(TxPhase::Processing(PendingTransaction {
            hash,
            action: self.action,
            submitted_at: Instant::now(),
        }));

        let outcome = match self.writer.wait_for_receipt(hash).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(action = self.action.as_str(), tx_hash = %hash, error = %e, "Transaction not confirmed");
                self.fail(Some(hash), e.to_string());
                return Err(e);
            }
        };

        if !outcome.success {
            tracing::warn!(action = self.action.as_str(), tx_hash = %hash, "Transaction reverted");
            let err = BlockchainError::Reverted(hash);
            self.fail(Some(hash), err.to_string());
            return Err(err);
        }

        tracing::info!(
            action = self.action.as_str(),
            tx_hash = %hash,
            block = outcome.block_number,
            "Transaction confirmed"
        );
        self.set(TxPhase::Confirmed {
            hash,
            block_number: outcome.block_number,
        });
        Ok(outcome)
    }

    /// Back to idle, e.g. when the form is reused.
    pub fn reset(&self) {
        self.phase.send_if_modified(|phase| {
            if phase.is_busy() || *phase == TxPhase::Idle {
                return false;
            }
            *phase = TxPhase::Idle;
            true
        });
    }

    fn fail(&self, hash: Option<TxHash>, reason: String) {
        self.set(TxPhase::Failed { hash, reason });
    }

    fn set(&self, phase: TxPhase) {
        self.phase.send_replace(phase);
        self.record();
    }

    fn record(&self) {
        let phase = self.phase.borrow().name();
        metrics::record_tx(self.action.as_str(), phase);
    }
}

/// Marks the tracker failed if `execute` is dropped while still busy.
struct InFlightGuard<'a>(&'a TxTracker);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let tracker = self.0;
        let abandoned = tracker.phase.send_if_modified(|phase| {
            let hash = match phase {
                TxPhase::AwaitingSignature => None,
                TxPhase::Processing(pending) => Some(pending.hash),
                _ => return false,
            };
            *phase = TxPhase::Failed {
                hash,
                reason: ABANDONED.to_string(),
            };
            true
        });
        if abandoned {
            tracing::warn!(action = tracker.action.as_str(), "Transaction tracking abandoned");
            tracker.record();
        }
    }
}
