//! User input parsing and user-input errors.

use alloy::primitives::{utils::parse_ether, U256};
use thiserror::Error;

/// Problems with what the user typed or with the wallet connection.
/// Always recoverable by correcting the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Please enter a red packet ID")]
    EmptyPacketId,

    #[error("Red packet ID must be a non-negative integer, got '{0}'")]
    InvalidPacketId(String),

    #[error("Please connect your wallet first")]
    WalletNotConnected,

    #[error("Please fill in all fields")]
    MissingFields,

    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),

    #[error("Invalid count '{0}': must be an integer between 1 and 4294967295")]
    InvalidCount(String),
}

/// Parse a free-text packet ID.
pub fn parse_packet_id(raw: &str) -> Result<U256, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InputError::EmptyPacketId);
    }
    if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InputError::InvalidPacketId(trimmed.to_string()));
    }
    U256::from_str_radix(trimmed, 10).map_err(|_| InputError::InvalidPacketId(trimmed.to_string()))
}

/// Parse a decimal native-token amount into wei. Must be positive.
pub fn parse_amount(raw: &str) -> Result<U256, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InputError::MissingFields);
    }
    let wei = parse_ether(trimmed).map_err(|_| InputError::InvalidAmount(trimmed.to_string()))?;
    if wei.is_zero() {
        return Err(InputError::InvalidAmount(trimmed.to_string()));
    }
    Ok(wei)
}

/// Parse a packet share count (at least one).
pub fn parse_count(raw: &str) -> Result<u32, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InputError::MissingFields);
    }
    match trimmed.parse::<u32>() {
        Ok(0) | Err(_) => Err(InputError::InvalidCount(trimmed.to_string())),
        Ok(n) => Ok(n),
    }
}
