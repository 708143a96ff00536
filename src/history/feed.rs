//! Per-account event history from the indexing service.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

use crate::blockchain::context::WalletContext;
use crate::scheduling::Debouncer;
use crate::subgraph::{ClaimedEvent, CreatedEvent, EventIndex};

/// An indexed event plus a link to its transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry<T> {
    pub event: T,
    pub explorer_url: String,
}

/// What the history view shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistorySnapshot {
    /// `false` shows the "connect wallet" state.
    pub connected: bool,
    pub loading: bool,
    pub created: Vec<HistoryEntry<CreatedEvent>>,
    pub claimed: Vec<HistoryEntry<ClaimedEvent>>,
    /// Last fetch error; both lists are empty when set.
    pub error: Option<String>,
}

struct Shared {
    index: Arc<dyn EventIndex>,
    page_size: u32,
    ctx: Mutex<WalletContext>,
    state: watch::Sender<HistorySnapshot>,
}

impl Shared {
    fn context(&self) -> WalletContext {
        *self.ctx.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn fetch(&self) {
        let ctx = self.context();
        let Some(account) = ctx.account() else {
            self.state.send_replace(HistorySnapshot::default());
            return;
        };

        self.state.send_modify(|s| {
            s.connected = true;
            s.loading = true;
        });

        let result = tokio::try_join!(
            self.index.created_by_creator(account, self.page_size, 0),
            self.index.claimed_by_claimer(account, self.page_size, 0),
        );

        // The wallet moved on while we were waiting
        if self.context() != ctx {
            return;
        }

        let next = match result {
            Ok((created, claimed)) => {
                tracing::debug!(
                    account = %account,
                    created = created.len(),
                    claimed = claimed.len(),
                    "History loaded"
                );
                HistorySnapshot {
                    connected: true,
                    loading: false,
                    created: created
                        .into_iter()
                        .map(|event| HistoryEntry {
                            explorer_url: ctx.explorer_url(&event.transaction_hash),
                            event,
                        })
                        .collect(),
                    claimed: claimed
                        .into_iter()
                        .map(|event| HistoryEntry {
                            explorer_url: ctx.explorer_url(&event.transaction_hash),
                            event,
                        })
                        .collect(),
                    error: None,
                }
            }
            Err(e) => {
                tracing::error!(account = %account, error = %e, "Failed to load history");
                HistorySnapshot {
                    connected: true,
                    error: Some(e.to_string()),
                    ..HistorySnapshot::default()
                }
            }
        };
        self.state.send_replace(next);
    }
}

/// Created and claimed events for the connected account, newest first.
pub struct HistoryFeed {
    shared: Arc<Shared>,
    debouncer: Debouncer,
}

impl HistoryFeed {
    /// Nothing is fetched until [`set_context`](Self::set_context) or
    /// [`refresh`](Self::refresh) is called.
    pub fn new(
        index: Arc<dyn EventIndex>,
        ctx: WalletContext,
        page_size: u32,
        debounce: Duration,
    ) -> Self {
        let (state, _) = watch::channel(HistorySnapshot {
            connected: ctx.account().is_some(),
            ..HistorySnapshot::default()
        });
        Self {
            shared: Arc::new(Shared {
                index,
                page_size,
                ctx: Mutex::new(ctx),
                state,
            }),
            debouncer: Debouncer::new(debounce),
        }
    }

    pub fn context(&self) -> WalletContext {
        self.shared.context()
    }

    /// Account or chain changed. Disconnecting clears the lists at once;
    /// any other change refetches after the quiet period.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn set_context(&self, ctx: WalletContext) {
        {
            let mut current = self.shared.ctx.lock().unwrap_or_else(PoisonError::into_inner);
            if *current == ctx {
                return;
            }
            *current = ctx;
        }

        if ctx.account().is_none() {
            self.debouncer.cancel();
            self.shared.state.send_replace(HistorySnapshot::default());
            return;
        }

        let shared = self.shared.clone();
        self.debouncer.schedule(async move {
            shared.fetch().await;
        });
    }

    /// Refetch now, dropping any pending debounced fetch.
    pub async fn refresh(&self) {
        self.debouncer.cancel();
        self.shared.fetch().await;
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<HistorySnapshot> {
        self.shared.state.subscribe()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}
