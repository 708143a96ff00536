//! Funding a new red packet.

use alloy::primitives::{utils::format_ether, U256};
use std::sync::Arc;

use crate::blockchain::context::WalletContext;
use crate::blockchain::contract::find_created_packet_id;
use crate::blockchain::types::{TxOutcome, WriteCall};
use crate::packets::input::{parse_amount, parse_count, InputError};
use crate::packets::lifecycle::{ButtonState, TxTracker};
use crate::packets::FlowError;

/// Validated create form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    /// Wei to lock in the packet.
    pub value: U256,
    pub count: u32,
    pub is_random: bool,
}

impl CreateRequest {
    /// Both fields blank or either blank → [`InputError::MissingFields`].
    pub fn parse(amount: &str, count: &str, is_random: bool) -> Result<Self, InputError> {
        if amount.trim().is_empty() || count.trim().is_empty() {
            return Err(InputError::MissingFields);
        }
        Ok(Self {
            value: parse_amount(amount)?,
            count: parse_count(count)?,
            is_random,
        })
    }

    fn into_call(self) -> WriteCall {
        WriteCall::Create {
            count: self.count,
            is_random: self.is_random,
            value: self.value,
        }
    }
}

/// A confirmed creation.
#[derive(Debug, Clone)]
pub struct CreateReceipt {
    pub outcome: TxOutcome,
    /// `None` when no matching `Created` record was found in the receipt.
    pub packet_id: Option<U256>,
}

pub struct CreateFlow {
    ctx: WalletContext,
    tracker: Arc<TxTracker>,
}

impl CreateFlow {
    pub fn new(ctx: WalletContext, tracker: Arc<TxTracker>) -> Self {
        Self { ctx, tracker }
    }

    pub fn tracker(&self) -> &TxTracker {
        &self.tracker
    }

    pub fn button_state(&self) -> ButtonState {
        self.tracker.button_state("Send red packet")
    }

    /// Submit `request`, wait for confirmation, and pull the new packet ID
    /// out of the receipt.
    pub async fn create(&self, request: CreateRequest) -> Result<CreateReceipt, FlowError> {
        let account = self.ctx.account().ok_or(InputError::WalletNotConnected)?;

        tracing::info!(
            amount = %format_ether(request.value),
            count = request.count,
            random = request.is_random,
            "Creating red packet"
        );
        let outcome = self.tracker.execute(request.into_call()).await?;

        let packet_id = find_created_packet_id(&outcome.logs, self.ctx.contract_address(), account);
        match packet_id {
            Some(id) => tracing::info!(packet_id = %id, tx_hash = %outcome.hash, "Red packet created"),
            None => tracing::warn!(
                tx_hash = %outcome.hash,
                "No Created record for this account in the receipt; packet ID unknown"
            ),
        }

        Ok(CreateReceipt { outcome, packet_id })
    }
}
