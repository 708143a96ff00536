//! Advisory claim pre-check against the indexing service.
//!
//! The index lags the chain, so a `Proceed` verdict guarantees nothing; the
//! contract remains the final judge. The check only avoids sending
//! transactions that are obviously going to revert.

use alloy::primitives::{utils::format_ether, Address, U256};

use crate::observability::metrics;
use crate::subgraph::{EventIndex, SubgraphError};

/// Outcome of the pre-check.
#[derive(Debug)]
pub enum PreflightVerdict {
    /// Nothing indexed argues against claiming.
    Proceed,
    /// Every share is already taken.
    FullyClaimed {
        total: u32,
        claimed: usize,
        created_at: u64,
    },
    /// This address already holds a share.
    AlreadyClaimed {
        amount: U256,
        claimed_at: u64,
        transaction_hash: String,
    },
    /// The index could not be queried; the caller decides whether to go on.
    Inconclusive(SubgraphError),
}

impl PreflightVerdict {
    /// Blocking verdicts stop the claim outright.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            PreflightVerdict::FullyClaimed { .. } | PreflightVerdict::AlreadyClaimed { .. }
        )
    }

    fn outcome(&self) -> &'static str {
        match self {
            PreflightVerdict::Proceed => "proceed",
            PreflightVerdict::FullyClaimed { .. } => "fully_claimed",
            PreflightVerdict::AlreadyClaimed { .. } => "already_claimed",
            PreflightVerdict::Inconclusive(_) => "inconclusive",
        }
    }

    /// User-facing report for a blocking verdict.
    pub fn report(&self) -> Option<String> {
        match self {
            PreflightVerdict::FullyClaimed {
                total,
                claimed,
                created_at,
            } => Some(format!(
                "This red packet has been fully claimed!\nTotal shares: {}\nClaimed: {}\nCreated at: {} (unix)",
                total, claimed, created_at
            )),
            PreflightVerdict::AlreadyClaimed {
                amount,
                claimed_at,
                ..
            } => Some(format!(
                "You have already claimed this red packet!\nAmount: {} ETH\nClaimed at: {} (unix)",
                format_ether(*amount),
                claimed_at
            )),
            _ => None,
        }
    }
}

/// Run the exhaustion check, then the duplicate check.
///
/// A missing creation record skips the exhaustion check. Any query error
/// makes the verdict [`PreflightVerdict::Inconclusive`].
pub async fn check_claim(index: &dyn EventIndex, id: U256, claimer: Address) -> PreflightVerdict {
    let verdict = run_checks(index, id, claimer).await;

    match &verdict {
        PreflightVerdict::Inconclusive(e) => {
            tracing::error!(packet_id = %id, error = %e, "Claim records unavailable");
        }
        v => {
            tracing::info!(packet_id = %id, outcome = v.outcome(), "Claim pre-check finished");
        }
    }
    metrics::record_preflight(verdict.outcome());
    verdict
}

async fn run_checks(index: &dyn EventIndex, id: U256, claimer: Address) -> PreflightVerdict {
    match index.packet_status(id).await {
        Ok(Some(status)) if status.is_exhausted() => {
            return PreflightVerdict::FullyClaimed {
                total: status.total_count,
                claimed: status.claimed_count,
                created_at: status.created_at,
            };
        }
        Ok(_) => {}
        Err(e) => return PreflightVerdict::Inconclusive(e),
    }

    match index.user_claim(id, claimer).await {
        Ok(Some(prior)) => PreflightVerdict::AlreadyClaimed {
            amount: prior.amount,
            claimed_at: prior.block_timestamp,
            transaction_hash: prior.transaction_hash,
        },
        Ok(None) => PreflightVerdict::Proceed,
        Err(e) => PreflightVerdict::Inconclusive(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subgraph::{ClaimedEvent, CreatedEvent, PacketStatus, SubgraphResult, UserClaim};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubIndex {
        status: Option<PacketStatus>,
        prior: Option<UserClaim>,
        status_down: bool,
        claims_down: bool,
        calls: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl EventIndex for StubIndex {
        async fn created_by_creator(&self, _: Address, _: u32, _: u32) -> SubgraphResult<Vec<CreatedEvent>> {
            Ok(Vec::new())
        }

        async fn claimed_by_claimer(&self, _: Address, _: u32, _: u32) -> SubgraphResult<Vec<ClaimedEvent>> {
            Ok(Vec::new())
        }

        async fn packet_status(&self, _: U256) -> SubgraphResult<Option<PacketStatus>> {
            self.calls.lock().unwrap().push("status");
            if self.status_down {
                return Err(SubgraphError::MissingData);
            }
            Ok(self.status)
        }

        async fn user_claim(&self, _: U256, _: Address) -> SubgraphResult<Option<UserClaim>> {
            self.calls.lock().unwrap().push("user_claim");
            if self.claims_down {
                return Err(SubgraphError::GraphQl("indexer offline".to_string()));
            }
            Ok(self.prior.clone())
        }
    }

    fn status(total: u32, claimed: usize) -> Option<PacketStatus> {
        Some(PacketStatus {
            total_count: total,
            claimed_count: claimed,
            created_at: 1_700_000_000,
        })
    }

    #[tokio::test]
    async fn test_exhausted_packet_stops_before_duplicate_check() {
        let index = StubIndex {
            status: status(5, 5),
            ..Default::default()
        };
        let verdict = check_claim(&index, U256::from(42u64), Address::ZERO).await;

        assert!(matches!(
            verdict,
            PreflightVerdict::FullyClaimed { total: 5, claimed: 5, .. }
        ));
        assert!(verdict.is_blocking());
        assert!(verdict.report().unwrap().contains("fully claimed"));
        assert_eq!(*index.calls.lock().unwrap(), vec!["status"]);
    }

    #[tokio::test]
    async fn test_prior_claim_blocks() {
        let index = StubIndex {
            status: status(5, 2),
            prior: Some(UserClaim {
                entity_id: "c1".to_string(),
                amount: U256::from(200_000_000_000_000_000u64),
                block_timestamp: 1_700_000_100,
                transaction_hash: "0xabc".to_string(),
            }),
            ..Default::default()
        };
        let verdict = check_claim(&index, U256::from(1u64), Address::ZERO).await;

        let report = verdict.report().unwrap();
        assert!(report.contains("already claimed"));
        assert!(report.contains("0.200000000000000000 ETH"));
    }

    #[tokio::test]
    async fn test_unindexed_packet_proceeds() {
        let index = StubIndex::default();
        let verdict = check_claim(&index, U256::from(1u64), Address::ZERO).await;
        assert!(matches!(verdict, PreflightVerdict::Proceed));
        assert!(verdict.report().is_none());
        assert_eq!(*index.calls.lock().unwrap(), vec!["status", "user_claim"]);
    }

    #[tokio::test]
    async fn test_query_failures_are_inconclusive() {
        let index = StubIndex {
            status_down: true,
            ..Default::default()
        };
        let verdict = check_claim(&index, U256::from(1u64), Address::ZERO).await;
        assert!(matches!(verdict, PreflightVerdict::Inconclusive(_)));
        assert!(!verdict.is_blocking());

        let index = StubIndex {
            status: status(5, 1),
            claims_down: true,
            ..Default::default()
        };
        let verdict = check_claim(&index, U256::from(1u64), Address::ZERO).await;
        assert!(matches!(verdict, PreflightVerdict::Inconclusive(SubgraphError::GraphQl(_))));
    }
}
