//! Claiming a share of a red packet.
//!
//! # Flow
//! ```text
//! input + wallet check → pre-check (index) → [confirm bypass] → claim tx
//!                                                                  ↓
//!                                   one-shot refresh after confirmation
//! ```

use alloy::primitives::{Address, U256};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::blockchain::context::WalletContext;
use crate::blockchain::types::{TxOutcome, WriteCall};
use crate::history::HistoryFeed;
use crate::packets::input::{parse_packet_id, InputError};
use crate::packets::lifecycle::{ButtonState, TxTracker};
use crate::packets::lookup::PacketLookup;
use crate::packets::preflight::{check_claim, PreflightVerdict};
use crate::packets::prompt::Prompt;
use crate::packets::FlowError;
use crate::scheduling::Debouncer;
use crate::subgraph::EventIndex;

/// Asked when the index cannot be reached.
pub const BYPASS_QUESTION: &str = "Unable to query claim records. Claim the red packet anyway?";

const IDLE_LABEL: &str = "Claim red packet";

/// How a claim attempt ended, short of an error.
#[derive(Debug)]
pub enum ClaimResult {
    /// Claim transaction confirmed.
    Submitted(TxOutcome),
    /// The pre-check found a reason not to send.
    Blocked(PreflightVerdict),
    /// Index unreachable and the user chose not to continue.
    Declined,
    /// The button was disabled or absent; nothing happened.
    Ignored,
}

/// Clears the "checking" flag even if the claim future is dropped.
struct CheckingGuard<'a>(&'a AtomicBool);

impl<'a> CheckingGuard<'a> {
    fn set(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for CheckingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct ClaimFlow {
    ctx: WalletContext,
    index: Arc<dyn EventIndex>,
    prompt: Arc<dyn Prompt>,
    tracker: Arc<TxTracker>,
    lookup: Arc<PacketLookup>,
    history: Option<Arc<HistoryFeed>>,
    checking: AtomicBool,
    refresh: Debouncer,
}

impl ClaimFlow {
    pub fn new(
        ctx: WalletContext,
        index: Arc<dyn EventIndex>,
        prompt: Arc<dyn Prompt>,
        tracker: Arc<TxTracker>,
        lookup: Arc<PacketLookup>,
        refresh_delay: Duration,
    ) -> Self {
        Self {
            ctx,
            index,
            prompt,
            tracker,
            lookup,
            history: None,
            checking: AtomicBool::new(false),
            refresh: Debouncer::new(refresh_delay),
        }
    }

    /// Also refresh `feed` after each confirmed claim.
    pub fn with_history(mut self, feed: Arc<HistoryFeed>) -> Self {
        self.history = Some(feed);
        self
    }

    pub fn lookup(&self) -> &PacketLookup {
        &self.lookup
    }

    pub fn tracker(&self) -> &TxTracker {
        &self.tracker
    }

    pub fn is_checking(&self) -> bool {
        self.checking.load(Ordering::SeqCst)
    }

    /// True while the post-claim refresh has not fired yet.
    pub fn refresh_pending(&self) -> bool {
        self.refresh.is_pending()
    }

    /// The claim button, or `None` while no packet is loaded.
    pub fn button_state(&self) -> Option<ButtonState> {
        let packet = self.lookup.packet()?;

        if self.is_checking() {
            return Some(ButtonState::disabled("Checking claim records..."));
        }
        if self.tracker.phase().is_busy() {
            return Some(self.tracker.button_state(IDLE_LABEL));
        }
        if packet.is_fully_claimed() {
            return Some(ButtonState::disabled("Fully claimed"));
        }
        Some(self.tracker.button_state(IDLE_LABEL))
    }

    /// Press the button. A disabled or hidden button does nothing.
    pub async fn click(&self) -> Result<ClaimResult, FlowError> {
        match self.button_state() {
            Some(button) if !button.disabled => self.claim(&self.lookup.input()).await,
            _ => Ok(ClaimResult::Ignored),
        }
    }

    /// Run the full claim workflow for the raw ID `input`.
    ///
    /// Input problems are shown through the prompt and returned as errors.
    /// Blocking pre-check verdicts are shown and returned as
    /// [`ClaimResult::Blocked`] without touching the write path.
    pub async fn claim(&self, input: &str) -> Result<ClaimResult, FlowError> {
        let (id, account) = match self.validate(input) {
            Ok(valid) => valid,
            Err(e) => {
                self.prompt.notify(&e.to_string()).await;
                return Err(e.into());
            }
        };

        let verdict = {
            let _checking = CheckingGuard::set(&self.checking);
            check_claim(self.index.as_ref(), id, account).await
        };

        match verdict {
            PreflightVerdict::Proceed => {}
            PreflightVerdict::Inconclusive(_) => {
                if !self.prompt.confirm(BYPASS_QUESTION).await {
                    tracing::info!(packet_id = %id, "Claim abandoned without claim records");
                    return Ok(ClaimResult::Declined);
                }
                tracing::info!(packet_id = %id, "Claiming without claim records");
            }
            blocked => {
                if let Some(report) = blocked.report() {
                    self.prompt.notify(&report).await;
                }
                return Ok(ClaimResult::Blocked(blocked));
            }
        }

        let outcome = self.tracker.execute(WriteCall::Claim { id }).await?;
        self.schedule_refresh();
        Ok(ClaimResult::Submitted(outcome))
    }

    fn validate(&self, input: &str) -> Result<(U256, Address), InputError> {
        if input.trim().is_empty() {
            return Err(InputError::EmptyPacketId);
        }
        let account = self.ctx.account().ok_or(InputError::WalletNotConnected)?;
        Ok((parse_packet_id(input)?, account))
    }

    /// The index lags the chain; re-read once after a short delay instead
    /// of polling.
    fn schedule_refresh(&self) {
        let lookup = self.lookup.clone();
        let history = self.history.clone();
        self.refresh.schedule(async move {
            tracing::debug!("Refreshing after claim");
            lookup.requery();
            if let Some(feed) = history {
                feed.refresh().await;
            }
        });
    }
}
