//! Red packet contract bindings and typed read surface.
//!
//! # Responsibilities
//! - ABI for the calls and events the client consumes
//! - `PacketReader` seam for the authoritative `getPacket` read
//! - Calldata encoding for writes
//! - Tolerant scan of receipt logs for the `Created` record

use alloy::network::TransactionBuilder;
use alloy::primitives::{utils::format_ether, Address, Bytes, U256};
use alloy::rpc::types::{Log, TransactionRequest};
use alloy::sol;
use alloy::sol_types::SolCall;
use async_trait::async_trait;

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult, WriteCall};
use crate::observability::metrics;

sol! {
    /// Emitted when a packet is funded.
    #[derive(Debug, PartialEq, Eq)]
    event Created(uint256 indexed id, address indexed creator, uint256 amount, uint32 count, bool isRandom);

    /// Emitted when an address takes its share.
    #[derive(Debug, PartialEq, Eq)]
    event Claimed(uint256 indexed id, address indexed claimer, uint256 amount, address creator, uint256 total);

    function getPacket(uint256 id) external view returns (address creator, uint32 count, uint32 claimed, bool isRandom, uint256 total, uint256 remain);
    function create(uint32 count, bool isRandom) external payable returns (uint256);
    function claim(uint256 id) external;
    function claims(uint256 id, address claimer) external view returns (uint256);
    function lastPacketId() external view returns (uint256);
}

/// On-chain state of a red packet, as returned by `getPacket`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketInfo {
    pub id: U256,
    pub creator: Address,
    pub count: u32,
    pub claimed: u32,
    pub is_random: bool,
    pub total: U256,
    pub remain: U256,
}

impl PacketInfo {
    /// The contract returns a zeroed struct for IDs it never assigned.
    pub fn exists(&self) -> bool {
        self.creator != Address::ZERO
    }

    pub fn is_fully_claimed(&self) -> bool {
        self.claimed >= self.count
    }

    /// Claim progress in percent; 0 for a zero-count packet.
    pub fn progress_percent(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        f64::from(self.claimed) / f64::from(self.count) * 100.0
    }

    pub fn split_kind(&self) -> &'static str {
        if self.is_random {
            "random"
        } else {
            "equal"
        }
    }

    pub fn total_ether(&self) -> String {
        format_ether(self.total)
    }

    pub fn remain_ether(&self) -> String {
        format_ether(self.remain)
    }
}

/// Authoritative packet read. Every call must hit the chain; no caching.
#[async_trait]
pub trait PacketReader: Send + Sync {
    async fn get_packet(&self, id: U256) -> BlockchainResult<PacketInfo>;
}

/// Read access to the deployed red packet contract.
#[derive(Clone, Debug)]
pub struct RedPacketContract {
    client: BlockchainClient,
    address: Address,
}

impl RedPacketContract {
    pub fn new(client: BlockchainClient, address: Address) -> BlockchainResult<Self> {
        if address == Address::ZERO {
            return Err(BlockchainError::NotAvailable(
                "red packet contract is not deployed on this chain".to_string(),
            ));
        }
        Ok(Self { client, address })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Amount `claimer` has taken from packet `id` (zero if none).
    pub async fn claimed_amount(&self, id: U256, claimer: Address) -> BlockchainResult<U256> {
        let data = self.call(claimsCall { id, claimer }.abi_encode()).await?;
        claimsCall::abi_decode_returns(&data).map_err(|e| BlockchainError::Decode(e.to_string()))
    }

    /// Highest packet ID assigned so far.
    pub async fn last_packet_id(&self) -> BlockchainResult<U256> {
        let data = self.call(lastPacketIdCall {}.abi_encode()).await?;
        lastPacketIdCall::abi_decode_returns(&data)
            .map_err(|e| BlockchainError::Decode(e.to_string()))
    }

    async fn call(&self, input: Vec<u8>) -> BlockchainResult<Bytes> {
        let tx = TransactionRequest::default()
            .with_to(self.address)
            .with_input(input);
        self.client.call(tx).await
    }
}

#[async_trait]
impl PacketReader for RedPacketContract {
    async fn get_packet(&self, id: U256) -> BlockchainResult<PacketInfo> {
        metrics::record_packet_read();
        let data = self.call(getPacketCall { id }.abi_encode()).await?;
        let ret = getPacketCall::abi_decode_returns(&data)
            .map_err(|e| BlockchainError::Decode(e.to_string()))?;

        Ok(PacketInfo {
            id,
            creator: ret.creator,
            count: ret.count,
            claimed: ret.claimed,
            is_random: ret.isRandom,
            total: ret.total,
            remain: ret.remain,
        })
    }
}

/// Calldata and attached value for a write.
pub fn encode_write(call: &WriteCall) -> (Bytes, U256) {
    match call {
        WriteCall::Create {
            count,
            is_random,
            value,
        } => (
            createCall {
                count: *count,
                isRandom: *is_random,
            }
            .abi_encode()
            .into(),
            *value,
        ),
        WriteCall::Claim { id } => (claimCall { id: *id }.abi_encode().into(), U256::ZERO),
    }
}

/// Find the packet ID assigned to `creator` among a receipt's logs.
///
/// Logs from other contracts, other events, or that fail to decode are
/// skipped. Returns `None` when no matching `Created` record is present.
pub fn find_created_packet_id(logs: &[Log], contract: Address, creator: Address) -> Option<U256> {
    for log in logs {
        if log.address() != contract {
            continue;
        }
        let decoded = match log.log_decode::<Created>() {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping undecodable log entry");
                continue;
            }
        };
        let event = decoded.inner.data;
        if event.creator == creator {
            return Some(event.id);
        }
    }
    None
}
