//! Shared fixtures for integration tests.
#![allow(dead_code)]

use alloy::primitives::{address, Address, Bytes, LogData, TxHash, B256, U256};
use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use redpacket_client::blockchain::contract::{Claimed, Created};
use redpacket_client::blockchain::{
    BlockchainError, BlockchainResult, ContractWriter, PacketInfo, PacketReader, TxOutcome,
    WriteCall,
};
use redpacket_client::packets::Prompt;
use redpacket_client::subgraph::{
    normalize_address, ClaimedEvent, CreatedEvent, EventIndex, PacketStatus, SubgraphError,
    SubgraphResult, UserClaim,
};

pub const CONTRACT: Address = address!("681ddD24197358474BDD541d51a6424Ea5EcC494");
pub const ALICE: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const BOB: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");

pub fn eth(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
}

// ---- mock HTTP JSON backends ----

/// A JSON-over-HTTP endpoint served from a raw socket. Every request body
/// is kept.
pub struct MockBackend {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl MockBackend {
    pub fn url(&self) -> url::Url {
        format!("http://{}/subgraphs/redpacket", self.addr)
            .parse()
            .unwrap()
    }

    pub fn rpc_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    /// How many JSON-RPC requests named `method` were received.
    pub fn calls_to(&self, method: &str) -> usize {
        self.requests()
            .iter()
            .filter(|req| req["method"] == method)
            .count()
    }
}

/// Start a backend that answers each parsed request body with `handler`.
pub async fn start_graphql_backend<F>(handler: F) -> MockBackend
where
    F: Fn(&Value) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let handler = Arc::new(handler);

    let seen = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let handler = handler.clone();
                    let seen = seen.clone();
                    tokio::spawn(async move {
                        let body = read_json_body(&mut socket).await.unwrap_or(Value::Null);
                        let (status, payload) = handler(&body);
                        seen.lock().unwrap().push(body);

                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            payload.len(),
                            payload
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockBackend { addr, requests }
}

/// Start a JSON-RPC node. `handler` sees the method and params and returns
/// either a result or an error message, wrapped in the usual envelope.
pub async fn start_rpc_backend<F>(handler: F) -> MockBackend
where
    F: Fn(&str, &Value) -> Result<Value, String> + Send + Sync + 'static,
{
    start_graphql_backend(move |req| {
        let id = req["id"].clone();
        let method = req["method"].as_str().unwrap_or_default();
        let body = match handler(method, &req["params"]) {
            Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
            Err(message) => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": -32000, "message": message }
            }),
        };
        (200, body.to_string())
    })
    .await
}

/// A mined receipt as a node would return it.
pub fn rpc_receipt(hash: TxHash, block: u64, success: bool, logs: &[LogData]) -> Value {
    let logs: Vec<Value> = logs
        .iter()
        .enumerate()
        .map(|(idx, data)| {
            json!({
                "address": CONTRACT,
                "topics": data.topics(),
                "data": data.data,
                "blockHash": B256::repeat_byte(0x11),
                "blockNumber": format!("{:#x}", block),
                "transactionHash": hash,
                "transactionIndex": "0x0",
                "logIndex": format!("{:#x}", idx),
                "removed": false
            })
        })
        .collect();

    json!({
        "type": "0x2",
        "status": if success { "0x1" } else { "0x0" },
        "cumulativeGasUsed": "0x5208",
        "logs": logs,
        "logsBloom": format!("0x{}", "00".repeat(256)),
        "transactionHash": hash,
        "transactionIndex": "0x0",
        "blockHash": B256::repeat_byte(0x11),
        "blockNumber": format!("{:#x}", block),
        "gasUsed": "0x5208",
        "effectiveGasPrice": "0x3b9aca00",
        "from": ALICE,
        "to": CONTRACT,
        "contractAddress": null
    })
}

/// ABI encoding of a single `uint256` return value.
pub fn abi_word(value: U256) -> Value {
    json!(alloy::primitives::hex::encode_prefixed(value.to_be_bytes::<32>()))
}

async fn read_json_body(socket: &mut TcpStream) -> Option<Value> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_string();
        let len = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);

        let start = end + 4;
        while buf.len() < start + len {
            let n = socket.read(&mut chunk).await.ok()?;
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        return serde_json::from_slice(&buf[start..]).ok();
    }
}

// ---- in-memory chain ----

/// Contract reader and writer over an in-memory packet table.
///
/// Writes take effect immediately and their receipts carry the events the
/// contract would emit, plus some unrelated log noise.
pub struct FakeChain {
    sender: Address,
    packets: Mutex<HashMap<U256, PacketInfo>>,
    receipts: Mutex<HashMap<TxHash, TxOutcome>>,
    writes: Mutex<Vec<WriteCall>>,
    reads: AtomicUsize,
    next_id: AtomicU64,
    next_tx: AtomicU64,
    revert: AtomicBool,
}

impl FakeChain {
    pub fn new(sender: Address) -> Self {
        Self {
            sender,
            packets: Mutex::new(HashMap::new()),
            receipts: Mutex::new(HashMap::new()),
            writes: Mutex::new(Vec::new()),
            reads: AtomicUsize::new(0),
            next_id: AtomicU64::new(1),
            next_tx: AtomicU64::new(1),
            revert: AtomicBool::new(false),
        }
    }

    pub fn insert_packet(&self, id: u64, creator: Address, count: u32, claimed: u32, total: U256) {
        let per_share = if count == 0 { U256::ZERO } else { total / U256::from(count) };
        let remain = total.saturating_sub(per_share * U256::from(claimed));
        self.packets.lock().unwrap().insert(
            U256::from(id),
            PacketInfo {
                id: U256::from(id),
                creator,
                count,
                claimed,
                is_random: false,
                total,
                remain,
            },
        );
        self.next_id.fetch_max(id + 1, Ordering::SeqCst);
    }

    pub fn packet(&self, id: u64) -> Option<PacketInfo> {
        self.packets.lock().unwrap().get(&U256::from(id)).cloned()
    }

    pub fn writes(&self) -> Vec<WriteCall> {
        self.writes.lock().unwrap().clone()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn revert_next(&self) {
        self.revert.store(true, Ordering::SeqCst);
    }

    fn log(address: Address, data: LogData) -> Log {
        Log {
            inner: alloy::primitives::Log { address, data },
            ..Default::default()
        }
    }

    fn apply(&self, call: &WriteCall) -> BlockchainResult<Vec<Log>> {
        match call {
            WriteCall::Create { count, is_random, value } => {
                let id = U256::from(self.next_id.fetch_add(1, Ordering::SeqCst));
                self.packets.lock().unwrap().insert(
                    id,
                    PacketInfo {
                        id,
                        creator: self.sender,
                        count: *count,
                        claimed: 0,
                        is_random: *is_random,
                        total: *value,
                        remain: *value,
                    },
                );
                let created = Created {
                    id,
                    creator: self.sender,
                    amount: *value,
                    count: *count,
                    isRandom: *is_random,
                };
                // A token transfer from elsewhere and a malformed entry
                // around the record we care about
                Ok(vec![
                    Self::log(BOB, created.encode_log_data()),
                    Self::log(
                        CONTRACT,
                        LogData::new_unchecked(vec![Created::SIGNATURE_HASH], Bytes::from(vec![1u8, 2, 3])),
                    ),
                    Self::log(CONTRACT, created.encode_log_data()),
                ])
            }
            WriteCall::Claim { id } => {
                let mut packets = self.packets.lock().unwrap();
                let packet = packets
                    .get_mut(id)
                    .ok_or_else(|| BlockchainError::Rpc("execution reverted: no packet".to_string()))?;
                let share = packet.total / U256::from(packet.count.max(1));
                packet.claimed += 1;
                packet.remain = packet.remain.saturating_sub(share);
                let claimed = Claimed {
                    id: *id,
                    claimer: self.sender,
                    amount: share,
                    creator: packet.creator,
                    total: packet.total,
                };
                Ok(vec![Self::log(CONTRACT, claimed.encode_log_data())])
            }
        }
    }
}

#[async_trait]
impl PacketReader for FakeChain {
    async fn get_packet(&self, id: U256) -> BlockchainResult<PacketInfo> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .packets
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap_or(PacketInfo {
                id,
                creator: Address::ZERO,
                count: 0,
                claimed: 0,
                is_random: false,
                total: U256::ZERO,
                remain: U256::ZERO,
            }))
    }
}

#[async_trait]
impl ContractWriter for FakeChain {
    async fn submit(&self, call: WriteCall) -> BlockchainResult<TxHash> {
        self.writes.lock().unwrap().push(call.clone());
        let hash = TxHash::with_last_byte(self.next_tx.fetch_add(1, Ordering::SeqCst) as u8);

        let reverted = self.revert.swap(false, Ordering::SeqCst);
        let logs = if reverted { Vec::new() } else { self.apply(&call)? };
        self.receipts.lock().unwrap().insert(
            hash,
            TxOutcome {
                hash,
                block_number: 100,
                success: !reverted,
                logs,
            },
        );
        Ok(hash)
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> BlockchainResult<TxOutcome> {
        self.receipts
            .lock()
            .unwrap()
            .get(&hash)
            .cloned()
            .ok_or(BlockchainError::ConfirmationTimeout(1))
    }
}

// ---- in-memory index ----

/// Programmable indexing service.
#[derive(Default)]
pub struct FakeIndex {
    status: Mutex<HashMap<U256, PacketStatus>>,
    claims: Mutex<HashMap<(U256, String), UserClaim>>,
    claimed_events: Mutex<Vec<ClaimedEvent>>,
    created_events: Mutex<Vec<CreatedEvent>>,
    down: AtomicBool,
    calls: AtomicUsize,
}

impl FakeIndex {
    pub fn set_status(&self, id: u64, total_count: u32, claimed_count: usize) {
        self.status.lock().unwrap().insert(
            U256::from(id),
            PacketStatus {
                total_count,
                claimed_count,
                created_at: 1_700_000_000,
            },
        );
    }

    pub fn record_claim(&self, id: u64, claimer: Address, amount: U256) {
        self.claims.lock().unwrap().insert(
            (U256::from(id), normalize_address(&claimer)),
            UserClaim {
                entity_id: format!("0x{:02x}-0", id),
                amount,
                block_timestamp: 1_700_000_500,
                transaction_hash: "0xfeed".to_string(),
            },
        );
        self.claimed_events.lock().unwrap().push(ClaimedEvent {
            entity_id: format!("0x{:02x}-0", id),
            packet_id: U256::from(id),
            claimer,
            amount,
            creator: ALICE,
            total: eth(1),
            block_number: 101,
            block_timestamp: 1_700_000_500,
            transaction_hash: "0xfeed".to_string(),
        });
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) -> SubgraphResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(SubgraphError::Status {
                status: 503,
                body: "indexer unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl EventIndex for FakeIndex {
    async fn created_by_creator(
        &self,
        creator: Address,
        first: u32,
        skip: u32,
    ) -> SubgraphResult<Vec<CreatedEvent>> {
        self.hit()?;
        Ok(self
            .created_events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.creator == creator)
            .skip(skip as usize)
            .take(first as usize)
            .cloned()
            .collect())
    }

    async fn claimed_by_claimer(
        &self,
        claimer: Address,
        first: u32,
        skip: u32,
    ) -> SubgraphResult<Vec<ClaimedEvent>> {
        self.hit()?;
        Ok(self
            .claimed_events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.claimer == claimer)
            .skip(skip as usize)
            .take(first as usize)
            .cloned()
            .collect())
    }

    async fn packet_status(&self, packet_id: U256) -> SubgraphResult<Option<PacketStatus>> {
        self.hit()?;
        Ok(self.status.lock().unwrap().get(&packet_id).copied())
    }

    async fn user_claim(
        &self,
        packet_id: U256,
        claimer: Address,
    ) -> SubgraphResult<Option<UserClaim>> {
        self.hit()?;
        Ok(self
            .claims
            .lock()
            .unwrap()
            .get(&(packet_id, normalize_address(&claimer)))
            .cloned())
    }
}

// ---- prompt ----

/// Answers every confirmation with a fixed reply and records what was shown.
pub struct ScriptedPrompt {
    answer: bool,
    notices: Mutex<Vec<String>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            notices: Mutex::new(Vec::new()),
            questions: Mutex::new(Vec::new()),
        }
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

#[async_trait]
impl Prompt for ScriptedPrompt {
    async fn notify(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }

    async fn confirm(&self, message: &str) -> bool {
        self.questions.lock().unwrap().push(message.to_string());
        self.answer
    }
}
