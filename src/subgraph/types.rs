//! Indexed event records and GraphQL response envelopes.

use alloy::primitives::{utils::format_ether, Address, U256};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Errors talking to the indexing service.
#[derive(Debug, Error)]
pub enum SubgraphError {
    /// No endpoint configured for the active chain.
    #[error("subgraph endpoint not configured")]
    NotConfigured,

    #[error("invalid subgraph URL '{0}'")]
    InvalidUrl(String),

    #[error("subgraph request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("subgraph returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("subgraph query error: {0}")]
    GraphQl(String),

    #[error("subgraph response had no data")]
    MissingData,
}

pub type SubgraphResult<T> = Result<T, SubgraphError>;

/// A `Created` event as indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEvent {
    /// Indexer entity ID (not the packet ID).
    #[serde(rename = "id")]
    pub entity_id: String,
    #[serde(rename = "internal_id", deserialize_with = "de_u256")]
    pub packet_id: U256,
    pub creator: Address,
    #[serde(deserialize_with = "de_u256")]
    pub amount: U256,
    #[serde(deserialize_with = "de_u32")]
    pub count: u32,
    pub is_random: bool,
    #[serde(deserialize_with = "de_u64")]
    pub block_number: u64,
    #[serde(deserialize_with = "de_u64")]
    pub block_timestamp: u64,
    pub transaction_hash: String,
}

impl CreatedEvent {
    pub fn amount_ether(&self) -> String {
        format_ether(self.amount)
    }
}

/// A `Claimed` event as indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimedEvent {
    #[serde(rename = "id")]
    pub entity_id: String,
    #[serde(rename = "internal_id", deserialize_with = "de_u256")]
    pub packet_id: U256,
    pub claimer: Address,
    #[serde(deserialize_with = "de_u256")]
    pub amount: U256,
    pub creator: Address,
    /// Total funded into the packet.
    #[serde(deserialize_with = "de_u256")]
    pub total: U256,
    #[serde(deserialize_with = "de_u64")]
    pub block_number: u64,
    #[serde(deserialize_with = "de_u64")]
    pub block_timestamp: u64,
    pub transaction_hash: String,
}

impl ClaimedEvent {
    pub fn amount_ether(&self) -> String {
        format_ether(self.amount)
    }

    pub fn total_ether(&self) -> String {
        format_ether(self.total)
    }
}

/// Indexed view of a packet's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketStatus {
    pub total_count: u32,
    pub claimed_count: usize,
    /// Unix seconds of the creation block.
    pub created_at: u64,
}

impl PacketStatus {
    pub fn is_exhausted(&self) -> bool {
        self.claimed_count >= self.total_count as usize
    }
}

/// A prior claim of one packet by one address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserClaim {
    #[serde(rename = "id")]
    pub entity_id: String,
    #[serde(deserialize_with = "de_u256")]
    pub amount: U256,
    #[serde(deserialize_with = "de_u64")]
    pub block_timestamp: u64,
    pub transaction_hash: String,
}

impl UserClaim {
    pub fn amount_ether(&self) -> String {
        format_ether(self.amount)
    }
}

// ---- response envelopes ----

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQlErrorEntry>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlErrorEntry {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedEventsData {
    pub createds: Vec<CreatedEvent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClaimedEventsData {
    pub claimeds: Vec<ClaimedEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreationRow {
    #[serde(deserialize_with = "de_u32")]
    pub count: u32,
    #[serde(deserialize_with = "de_u64")]
    pub block_timestamp: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClaimRef {
    #[allow(dead_code)]
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PacketStatusData {
    #[serde(default)]
    pub createds: Vec<CreationRow>,
    #[serde(default)]
    pub claimeds: Vec<ClaimRef>,
}

impl PacketStatusData {
    /// `None` when the creation record is not indexed yet.
    pub fn into_status(self) -> Option<PacketStatus> {
        let created = self.createds.first()?;
        Some(PacketStatus {
            total_count: created.count,
            claimed_count: self.claimeds.len(),
            created_at: created.block_timestamp,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserClaimData {
    #[serde(default)]
    pub claimeds: Vec<UserClaim>,
}

// ---- numeric fields ----
//
// The indexer encodes BigInt as decimal strings; empty strings read as zero.

#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Text(String),
    Int(u64),
}

impl Numeric {
    fn into_u256(self) -> Result<U256, String> {
        match self {
            Numeric::Int(n) => Ok(U256::from(n)),
            Numeric::Text(s) if s.trim().is_empty() => Ok(U256::ZERO),
            Numeric::Text(s) => s
                .trim()
                .parse::<U256>()
                .map_err(|e| format!("invalid number '{}': {}", s, e)),
        }
    }
}

fn de_u256<'de, D: Deserializer<'de>>(d: D) -> Result<U256, D::Error> {
    Numeric::deserialize(d)?
        .into_u256()
        .map_err(serde::de::Error::custom)
}

fn de_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let value = de_u256(d)?;
    u64::try_from(value).map_err(|_| serde::de::Error::custom(format!("{} overflows u64", value)))
}

fn de_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let value = de_u256(d)?;
    u32::try_from(value).map_err(|_| serde::de::Error::custom(format!("{} overflows u32", value)))
}
