//! Debounced packet lookup.
//!
//! Every trigger bumps a counter and restarts the quiet period; once the
//! period elapses, the ID *currently* in the input is read from the chain.
//! Nothing is cached: repeated lookups of the same ID each issue a fresh
//! read.

use alloy::primitives::U256;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

use crate::blockchain::contract::{PacketInfo, PacketReader};
use crate::packets::input::{parse_packet_id, InputError};
use crate::scheduling::Debouncer;

/// What the lookup currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupState {
    /// No successful query yet.
    NotLoaded,
    Loading { id: U256 },
    Loaded(PacketInfo),
    Failed(String),
}

impl LookupState {
    pub fn packet(&self) -> Option<&PacketInfo> {
        match self {
            LookupState::Loaded(packet) => Some(packet),
            _ => None,
        }
    }

    /// A read has finished, one way or the other.
    pub fn is_settled(&self) -> bool {
        matches!(self, LookupState::Loaded(_) | LookupState::Failed(_))
    }
}

struct Shared {
    reader: Arc<dyn PacketReader>,
    input: Mutex<String>,
    triggers: AtomicU64,
    state: watch::Sender<LookupState>,
}

impl Shared {
    fn current_input(&self) -> String {
        self.input
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn fire(&self) {
        if self.triggers.load(Ordering::SeqCst) == 0 {
            return;
        }
        let raw = self.current_input();
        if raw.trim().is_empty() {
            return;
        }

        let id = match parse_packet_id(&raw) {
            Ok(id) => id,
            Err(e) => {
                self.state.send_replace(LookupState::Failed(e.to_string()));
                return;
            }
        };

        self.state.send_replace(LookupState::Loading { id });
        tracing::debug!(packet_id = %id, "Reading packet");

        let next = match self.reader.get_packet(id).await {
            Ok(packet) => LookupState::Loaded(packet),
            Err(e) => {
                tracing::warn!(packet_id = %id, error = %e, "Packet read failed");
                LookupState::Failed(e.to_string())
            }
        };
        self.state.send_replace(next);
    }
}

/// Packet lookup with a debounced authoritative read.
///
/// Scheduling spawns onto the current Tokio runtime, so [`set_input`],
/// [`trigger`] and [`requery`] must be called from within one.
///
/// [`set_input`]: Self::set_input
/// [`trigger`]: Self::trigger
/// [`requery`]: Self::requery
pub struct PacketLookup {
    shared: Arc<Shared>,
    debouncer: Debouncer,
}

impl PacketLookup {
    pub fn new(reader: Arc<dyn PacketReader>, debounce: Duration) -> Self {
        let (state, _) = watch::channel(LookupState::NotLoaded);
        Self {
            shared: Arc::new(Shared {
                reader,
                input: Mutex::new(String::new()),
                triggers: AtomicU64::new(0),
                state,
            }),
            debouncer: Debouncer::new(debounce),
        }
    }

    /// Replace the ID input. Once a query has been requested, edits also
    /// restart the quiet period so the newest ID is what gets read.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn set_input(&self, raw: impl Into<String>) {
        *self
            .shared
            .input
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = raw.into();
        if self.trigger_count() > 0 {
            self.schedule();
        }
    }

    pub fn input(&self) -> String {
        self.shared.current_input()
    }

    /// The explicit "query" action. An empty input is rejected and nothing
    /// is scheduled.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn trigger(&self) -> Result<u64, InputError> {
        if self.input().trim().is_empty() {
            return Err(InputError::EmptyPacketId);
        }
        Ok(self.requery())
    }

    /// Bump the trigger counter and restart the quiet period without
    /// validating input; a blank input at fire time is a no-op.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn requery(&self) -> u64 {
        let count = self.shared.triggers.fetch_add(1, Ordering::SeqCst) + 1;
        self.schedule();
        count
    }

    pub fn trigger_count(&self) -> u64 {
        self.shared.triggers.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> LookupState {
        self.shared.state.borrow().clone()
    }

    pub fn packet(&self) -> Option<PacketInfo> {
        self.shared.state.borrow().packet().cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<LookupState> {
        self.shared.state.subscribe()
    }

    /// Wait for the next read to finish and return its result.
    pub async fn next_result(&self) -> LookupState {
        let mut rx = self.subscribe();
        loop {
            if rx.changed().await.is_err() {
                return self.state();
            }
            let state = rx.borrow_and_update().clone();
            if state.is_settled() {
                return state;
            }
        }
    }

    /// True while a read is scheduled but has not finished.
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    fn schedule(&self) {
        let shared = self.shared.clone();
        self.debouncer.schedule(async move {
            shared.fire().await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::types::{BlockchainError, BlockchainResult};
    use alloy::primitives::Address;
    use async_trait::async_trait;
    use tokio::time::sleep;

    #[derive(Default)]
    struct CountingReader {
        reads: Mutex<Vec<U256>>,
    }

    impl CountingReader {
        fn reads(&self) -> Vec<U256> {
            self.reads.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PacketReader for CountingReader {
        async fn get_packet(&self, id: U256) -> BlockchainResult<PacketInfo> {
            let n = {
                let mut reads = self.reads.lock().unwrap();
                reads.push(id);
                reads.len() as u32
            };
            if id == U256::from(404u64) {
                return Err(BlockchainError::Rpc("boom".to_string()));
            }
            Ok(PacketInfo {
                id,
                creator: Address::repeat_byte(0x11),
                count: 10,
                claimed: n,
                is_random: false,
                total: U256::from(100u64),
                remain: U256::from(100u64 - u64::from(n)),
            })
        }
    }

    fn lookup(reader: Arc<CountingReader>) -> PacketLookup {
        PacketLookup::new(reader, Duration::from_millis(600))
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_triggers_reads_once() {
        let reader = Arc::new(CountingReader::default());
        let lookup = lookup(reader.clone());
        lookup.set_input("42");

        for _ in 0..5 {
            lookup.trigger().unwrap();
            sleep(Duration::from_millis(100)).await;
        }
        sleep(Duration::from_millis(700)).await;

        assert_eq!(reader.reads(), vec![U256::from(42u64)]);
        assert_eq!(lookup.packet().unwrap().id, U256::from(42u64));
        assert_eq!(lookup.trigger_count(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reads_input_current_when_window_elapses() {
        let reader = Arc::new(CountingReader::default());
        let lookup = lookup(reader.clone());

        lookup.set_input("1");
        lookup.trigger().unwrap();
        sleep(Duration::from_millis(200)).await;
        lookup.set_input("2");
        lookup.trigger().unwrap();
        sleep(Duration::from_millis(200)).await;
        lookup.set_input("3");
        sleep(Duration::from_millis(700)).await;

        assert_eq!(reader.reads(), vec![U256::from(3u64)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_lookups_are_fresh() {
        let reader = Arc::new(CountingReader::default());
        let lookup = lookup(reader.clone());
        lookup.set_input("7");

        lookup.trigger().unwrap();
        sleep(Duration::from_millis(700)).await;
        assert_eq!(lookup.packet().unwrap().claimed, 1);

        lookup.trigger().unwrap();
        sleep(Duration::from_millis(700)).await;
        assert_eq!(lookup.packet().unwrap().claimed, 2);
        assert_eq!(reader.reads().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_input_is_rejected_and_not_read() {
        let reader = Arc::new(CountingReader::default());
        let lookup = lookup(reader.clone());

        assert_eq!(lookup.trigger(), Err(InputError::EmptyPacketId));
        lookup.set_input("   ");
        assert_eq!(lookup.trigger(), Err(InputError::EmptyPacketId));
        sleep(Duration::from_millis(1000)).await;

        assert!(reader.reads().is_empty());
        assert_eq!(lookup.state(), LookupState::NotLoaded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_edits_before_first_query_do_not_read() {
        let reader = Arc::new(CountingReader::default());
        let lookup = lookup(reader.clone());
        lookup.set_input("5");
        lookup.set_input("55");
        sleep(Duration::from_millis(1000)).await;
        assert!(reader.reads().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_id_and_read_failure() {
        let reader = Arc::new(CountingReader::default());
        let lookup = lookup(reader.clone());

        lookup.set_input("abc");
        lookup.trigger().unwrap();
        sleep(Duration::from_millis(700)).await;
        assert!(matches!(lookup.state(), LookupState::Failed(_)));
        assert!(reader.reads().is_empty());

        lookup.set_input("404");
        let result = lookup.next_result().await;
        assert!(matches!(result, LookupState::Failed(ref msg) if msg.contains("boom")));
        assert!(lookup.packet().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_cancels_pending_read() {
        let reader = Arc::new(CountingReader::default());
        let lookup = lookup(reader.clone());
        lookup.set_input("9");
        lookup.trigger().unwrap();
        assert!(lookup.is_pending());
        drop(lookup);

        sleep(Duration::from_millis(1000)).await;
        assert!(reader.reads().is_empty());
    }
}
