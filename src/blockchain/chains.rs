//! Known chains: contract deployments, explorers, display names.
//!
//! Unknown chain IDs resolve to Sepolia everywhere except the display name.

use alloy::primitives::{address, Address};

use crate::blockchain::types::ChainId;

pub const MAINNET: ChainId = ChainId(1);
pub const SEPOLIA: ChainId = ChainId(11155111);

/// Chain used when the active chain is unrecognized.
pub const FALLBACK_CHAIN: ChainId = SEPOLIA;

/// Static description of a supported chain.
#[derive(Debug, Clone, Copy)]
pub struct ChainInfo {
    pub id: ChainId,
    pub name: &'static str,
    pub explorer: &'static str,
    /// Red packet contract. `Address::ZERO` means not deployed yet.
    pub red_packet: Address,
}

pub static CHAINS: [ChainInfo; 2] = [
    ChainInfo {
        id: SEPOLIA,
        name: "Sepolia",
        explorer: "https://sepolia.etherscan.io",
        red_packet: address!("681ddD24197358474BDD541d51a6424Ea5EcC494"),
    },
    ChainInfo {
        id: MAINNET,
        name: "Ethereum",
        explorer: "https://etherscan.io",
        red_packet: Address::ZERO,
    },
];

/// Look up a supported chain.
pub fn find(chain_id: ChainId) -> Option<&'static ChainInfo> {
    CHAINS.iter().find(|c| c.id == chain_id)
}

/// Look up a chain, falling back to Sepolia.
pub fn resolve(chain_id: Option<ChainId>) -> &'static ChainInfo {
    chain_id
        .and_then(find)
        .unwrap_or(&CHAINS[0])
}

/// Red packet contract address for the chain.
pub fn red_packet_address(chain_id: Option<ChainId>) -> Address {
    resolve(chain_id).red_packet
}

/// Display name; "Unknown" for unsupported chains.
pub fn chain_name(chain_id: Option<ChainId>) -> &'static str {
    chain_id
        .and_then(find)
        .map(|c| c.name)
        .unwrap_or("Unknown")
}

/// Block explorer link for a transaction hash.
pub fn explorer_url(chain_id: Option<ChainId>, tx_hash: &str) -> String {
    format!("{}/tx/{}", resolve(chain_id).explorer, tx_hash)
}
