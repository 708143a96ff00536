//! Transaction submission and receipt monitoring.
//!
//! # Responsibilities
//! - Encode and sign contract writes
//! - Broadcast through a signing provider
//! - Poll for the receipt until confirmed, reverted, or timed out

use alloy::network::{ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::contract::encode_write;
use crate::blockchain::types::{BlockchainError, BlockchainResult, TxOutcome, WriteCall};
use crate::blockchain::wallet::Wallet;

/// Write path to the red packet contract.
///
/// `submit` resolves once the transaction is signed and broadcast;
/// `wait_for_receipt` resolves once it is mined.
#[async_trait]
pub trait ContractWriter: Send + Sync {
    async fn submit(&self, call: WriteCall) -> BlockchainResult<TxHash>;

    async fn wait_for_receipt(&self, hash: TxHash) -> BlockchainResult<TxOutcome>;
}

/// Signs with a local [`Wallet`] and broadcasts over HTTP JSON-RPC.
pub struct TxSender {
    client: BlockchainClient,
    signer: Arc<dyn Provider + Send + Sync>,
    contract: Address,
    from: Address,
}

impl TxSender {
    /// Create a sender for `contract` using the client's primary RPC URL.
    pub fn new(client: BlockchainClient, wallet: &Wallet, contract: Address) -> BlockchainResult<Self> {
        let url: url::Url = client.config().rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", client.config().rpc_url, e))
        })?;
        let signer = Arc::new(
            ProviderBuilder::new()
                .wallet(wallet.ethereum_wallet())
                .connect_http(url),
        ) as Arc<dyn Provider + Send + Sync>;

        Ok(Self {
            client,
            signer,
            contract,
            from: wallet.address(),
        })
    }

    /// Address transactions are sent from.
    pub fn address(&self) -> Address {
        self.from
    }

    fn build(&self, call: &WriteCall) -> TransactionRequest {
        let (data, value) = encode_write(call);
        TransactionRequest::default()
            .with_from(self.from)
            .with_to(self.contract)
            .with_value(value)
            .with_input(data)
    }
}

#[async_trait]
impl ContractWriter for TxSender {
    async fn submit(&self, call: WriteCall) -> BlockchainResult<TxHash> {
        let tx = self.build(&call);
        let pending = self
            .signer
            .send_transaction(tx)
            .await
            .map_err(|e| BlockchainError::Rejected(e.to_string()))?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> BlockchainResult<TxOutcome> {
        let config = self.client.config();
        let required_confirmations = u64::from(self.client.confirmation_blocks());
        let limit_secs = config.confirmation_timeout_secs;
        let poll_interval = Duration::from_millis(config.receipt_poll_ms);

        let result = timeout(Duration::from_secs(limit_secs), async {
            let mut ticker = interval(poll_interval);

            loop {
                ticker.tick().await;

                let receipt = match self.client.get_transaction_receipt(hash).await {
                    Ok(Some(r)) => r,
                    Ok(None) => {
                        tracing::debug!(tx_hash = %hash, "Transaction pending");
                        continue;
                    }
                    Err(e) => {
                        tracing::debug!(tx_hash = %hash, error = %e, "Receipt poll failed");
                        continue;
                    }
                };

                let logs = receipt.inner.logs().to_vec();
                if !receipt.status() {
                    return Ok(TxOutcome {
                        hash,
                        block_number: receipt.block_number.unwrap_or_default(),
                        success: false,
                        logs,
                    });
                }

                // A successful receipt is already the first confirmation
                if required_confirmations <= 1 {
                    return Ok(TxOutcome {
                        hash,
                        block_number: receipt.block_number.unwrap_or_default(),
                        success: true,
                        logs,
                    });
                }

                let current_block = match self.client.get_block_number().await {
                    Ok(n) => n,
                    Err(e) => {
                        tracing::debug!(tx_hash = %hash, error = %e, "Block number poll failed");
                        continue;
                    }
                };
                let tx_block = receipt.block_number.unwrap_or(current_block);

                // The inclusion block counts as the first confirmation
                let confirmations = current_block.saturating_sub(tx_block) + 1;
                if confirmations >= required_confirmations {
                    return Ok(TxOutcome {
                        hash,
                        block_number: tx_block,
                        success: true,
                        logs,
                    });
                }

                tracing::debug!(
                    tx_hash = %hash,
                    confirmations = confirmations,
                    required = required_confirmations,
                    "Waiting for confirmations"
                );
            }
        })
        .await;

        match result {
            Ok(outcome) => outcome,
            Err(_) => Err(BlockchainError::ConfirmationTimeout(limit_secs)),
        }
    }
}
