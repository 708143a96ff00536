//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, page size > 0)
//! - Validate endpoint URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - A missing indexing endpoint is not an error; it only disables history

use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("wallet.project_id is required")]
    MissingProjectId,

    #[error("{field} is not a valid URL: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Validate a loaded configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.wallet.project_id.trim().is_empty() {
        errors.push(ValidationError::MissingProjectId);
    }

    check_url(&mut errors, "chain.rpc_url", &config.chain.rpc_url);
    for url in &config.chain.failover_urls {
        check_url(&mut errors, "chain.failover_urls", url);
    }
    for (field, url) in [
        ("subgraph.mainnet_url", &config.subgraph.mainnet_url),
        ("subgraph.sepolia_url", &config.subgraph.sepolia_url),
    ] {
        if !url.trim().is_empty() {
            check_url(&mut errors, field, url);
        }
    }

    for (field, value) in [
        ("chain.rpc_timeout_secs", config.chain.rpc_timeout_secs),
        ("chain.receipt_poll_ms", config.chain.receipt_poll_ms),
        ("chain.confirmation_timeout_secs", config.chain.confirmation_timeout_secs),
        ("subgraph.timeout_secs", config.subgraph.timeout_secs),
        ("subgraph.page_size", u64::from(config.subgraph.page_size)),
    ] {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if url::Url::parse(value.trim()).is_err() {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
}
