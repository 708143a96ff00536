//! Connected wallet and active chain, passed explicitly to the flows.

use alloy::primitives::Address;

use crate::blockchain::chains;
use crate::blockchain::types::ChainId;

/// Snapshot of the wallet connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletContext {
    chain_id: Option<ChainId>,
    account: Option<Address>,
}

impl WalletContext {
    pub fn new(chain_id: Option<ChainId>, account: Option<Address>) -> Self {
        Self { chain_id, account }
    }

    /// Connected on `chain_id` as `account`.
    pub fn connected(chain_id: ChainId, account: Address) -> Self {
        Self::new(Some(chain_id), Some(account))
    }

    pub fn disconnected(chain_id: Option<ChainId>) -> Self {
        Self::new(chain_id, None)
    }

    pub fn chain_id(&self) -> Option<ChainId> {
        self.chain_id
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    /// Red packet contract on the active chain (Sepolia when unrecognized).
    pub fn contract_address(&self) -> Address {
        chains::red_packet_address(self.chain_id)
    }

    pub fn chain_name(&self) -> &'static str {
        chains::chain_name(self.chain_id)
    }

    pub fn explorer_url(&self, tx_hash: &str) -> String {
        chains::explorer_url(self.chain_id, tx_hash)
    }
}
