//! HTTP client for the indexing service.
//!
//! # Responsibilities
//! - Resolve the GraphQL endpoint for the active chain
//! - POST fixed query documents with typed variables
//! - Map transport, HTTP and GraphQL failures into `SubgraphError`

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

use crate::blockchain::types::ChainId;
use crate::config::SubgraphConfig;
use crate::observability::metrics;
use crate::subgraph::queries;
use crate::subgraph::types::{
    ClaimedEvent, ClaimedEventsData, CreatedEvent, CreatedEventsData, GraphQlResponse,
    PacketStatus, PacketStatusData, SubgraphError, SubgraphResult, UserClaim, UserClaimData,
};

/// Read access to indexed red packet events.
#[async_trait]
pub trait EventIndex: Send + Sync {
    /// Packets created by `creator`, newest first.
    async fn created_by_creator(
        &self,
        creator: Address,
        first: u32,
        skip: u32,
    ) -> SubgraphResult<Vec<CreatedEvent>>;

    /// Claims made by `claimer`, newest first.
    async fn claimed_by_claimer(
        &self,
        claimer: Address,
        first: u32,
        skip: u32,
    ) -> SubgraphResult<Vec<ClaimedEvent>>;

    /// Declared count and indexed claim count for a packet.
    async fn packet_status(&self, packet_id: U256) -> SubgraphResult<Option<PacketStatus>>;

    /// The first indexed claim of `packet_id` by `claimer`, if any.
    async fn user_claim(&self, packet_id: U256, claimer: Address)
        -> SubgraphResult<Option<UserClaim>>;
}

/// Lower-case hex, the form the indexer stores `Bytes` in.
pub fn normalize_address(address: &Address) -> String {
    address.to_string().to_lowercase()
}

/// GraphQL-over-HTTP client bound to one chain's endpoint.
#[derive(Clone, Debug)]
pub struct SubgraphClient {
    http: reqwest::Client,
    endpoint: Option<url::Url>,
}

impl SubgraphClient {
    /// Build a client for `chain_id`, falling back to the Sepolia endpoint
    /// for unrecognized chains.
    ///
    /// A missing endpoint is not an error: every query then fails with
    /// [`SubgraphError::NotConfigured`].
    pub fn new(config: &SubgraphConfig, chain_id: Option<ChainId>) -> SubgraphResult<Self> {
        let chain = chain_id.map(u64::from).unwrap_or_default();
        let endpoint = match config.url_for(chain) {
            Some(raw) => Some(
                raw.parse::<url::Url>()
                    .map_err(|_| SubgraphError::InvalidUrl(raw.to_string()))?,
            ),
            None => {
                tracing::warn!(chain_id = chain, "Subgraph URL not set; history feature disabled");
                None
            }
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, endpoint })
    }

    /// Client pointed at an explicit endpoint.
    pub fn with_endpoint(endpoint: url::Url, timeout: Duration) -> SubgraphResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: Some(endpoint),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    async fn request<T: DeserializeOwned>(
        &self,
        name: &'static str,
        query: &str,
        variables: Value,
    ) -> SubgraphResult<T> {
        let result = self.send(query, variables).await;
        metrics::record_subgraph(name, result.is_ok());
        if let Err(e) = &result {
            tracing::debug!(query = name, error = %e, "Subgraph query failed");
        }
        result
    }

    async fn send<T: DeserializeOwned>(&self, query: &str, variables: Value) -> SubgraphResult<T> {
        let endpoint = self.endpoint.clone().ok_or(SubgraphError::NotConfigured)?;

        let res = self
            .http
            .post(endpoint)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(SubgraphError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: GraphQlResponse<T> = res.json().await?;
        if let Some(errors) = envelope.errors.filter(|e| !e.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(SubgraphError::GraphQl(messages.join("; ")));
        }
        envelope.data.ok_or(SubgraphError::MissingData)
    }
}

#[async_trait]
impl EventIndex for SubgraphClient {
    async fn created_by_creator(
        &self,
        creator: Address,
        first: u32,
        skip: u32,
    ) -> SubgraphResult<Vec<CreatedEvent>> {
        let data: CreatedEventsData = self
            .request(
                "created_by_creator",
                queries::CREATED_BY_CREATOR,
                json!({ "creator": normalize_address(&creator), "first": first, "skip": skip }),
            )
            .await?;
        Ok(data.createds)
    }

    async fn claimed_by_claimer(
        &self,
        claimer: Address,
        first: u32,
        skip: u32,
    ) -> SubgraphResult<Vec<ClaimedEvent>> {
        let data: ClaimedEventsData = self
            .request(
                "claimed_by_claimer",
                queries::CLAIMED_BY_CLAIMER,
                json!({ "claimer": normalize_address(&claimer), "first": first, "skip": skip }),
            )
            .await?;
        Ok(data.claimeds)
    }

    async fn packet_status(&self, packet_id: U256) -> SubgraphResult<Option<PacketStatus>> {
        let data: PacketStatusData = self
            .request(
                "packet_status",
                queries::PACKET_STATUS,
                json!({ "packetId": packet_id.to_string() }),
            )
            .await?;
        Ok(data.into_status())
    }

    async fn user_claim(
        &self,
        packet_id: U256,
        claimer: Address,
    ) -> SubgraphResult<Option<UserClaim>> {
        let data: UserClaimData = self
            .request(
                "user_claim",
                queries::USER_CLAIM,
                json!({
                    "packetId": packet_id.to_string(),
                    "userAddress": normalize_address(&claimer),
                }),
            )
            .await?;
        Ok(data.claimeds.into_iter().next())
    }
}
