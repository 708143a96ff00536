//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::blockchain::chains::{MAINNET, SEPOLIA};

/// Root configuration for the red packet client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Wallet connection settings.
    pub wallet: WalletConfig,

    /// Chain and RPC settings.
    pub chain: ChainConfig,

    /// Indexing service (subgraph) endpoints.
    pub subgraph: SubgraphConfig,

    /// Debounce and refresh delays.
    pub timing: TimingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Switch the active chain, e.g. from a `--chain-id` flag. Everything
    /// chain-dependent is derived afterwards.
    pub fn select_chain(&mut self, chain_id: u64) {
        self.chain.chain_id = chain_id;
    }

    /// Subgraph endpoint for the active chain.
    pub fn active_subgraph_url(&self) -> Option<&str> {
        self.subgraph.url_for(self.chain.chain_id)
    }
}

/// Wallet connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Wallet-connection project identifier. Required.
    pub project_id: String,

    /// Name of the environment variable holding the signer's private key.
    pub private_key_env: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            private_key_env: "REDPACKET_PRIVATE_KEY".to_string(),
        }
    }
}

/// Chain and JSON-RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Active chain ID (1 for Ethereum mainnet, 11155111 for Sepolia).
    pub chain_id: u64,

    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Number of block confirmations required before a write counts as confirmed.
    pub confirmation_blocks: u32,

    /// Receipt polling interval in milliseconds.
    pub receipt_poll_ms: u64,

    /// Maximum time to wait for a receipt, in seconds.
    pub confirmation_timeout_secs: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: SEPOLIA.0,
            rpc_url: "https://ethereum-sepolia-rpc.publicnode.com".to_string(),
            failover_urls: Vec::new(),
            rpc_timeout_secs: 10,
            confirmation_blocks: 1,
            receipt_poll_ms: 2000,
            confirmation_timeout_secs: 180,
        }
    }
}

/// Indexing service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SubgraphConfig {
    /// Ethereum mainnet GraphQL endpoint. Empty means "not configured".
    pub mainnet_url: String,

    /// Sepolia GraphQL endpoint. Empty means "not configured".
    pub sepolia_url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Result-count limit for history queries.
    pub page_size: u32,
}

impl Default for SubgraphConfig {
    fn default() -> Self {
        Self {
            mainnet_url: String::new(),
            sepolia_url: String::new(),
            timeout_secs: 10,
            page_size: 100,
        }
    }
}

impl SubgraphConfig {
    /// Endpoint for a chain, falling back to the Sepolia endpoint for
    /// unrecognized chains. Returns `None` when nothing is configured.
    pub fn url_for(&self, chain_id: u64) -> Option<&str> {
        let url = match chain_id {
            id if id == MAINNET.0 => &self.mainnet_url,
            _ => &self.sepolia_url,
        };
        Some(url.trim()).filter(|u| !u.is_empty())
    }
}

/// Debounce and refresh delays, in milliseconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Quiet period before a packet lookup is issued.
    pub lookup_debounce_ms: u64,

    /// Quiet period before the history feed refetches.
    pub history_debounce_ms: u64,

    /// Delay between a confirmed claim and the packet status re-query.
    pub refresh_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            lookup_debounce_ms: 600,
            history_debounce_ms: 500,
            refresh_delay_ms: 1000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log directive when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "redpacket_client=info".to_string(),
        }
    }
}
