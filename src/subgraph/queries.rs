//! GraphQL documents sent to the indexing service.
//!
//! Variable types follow the subgraph schema: packet IDs are `BigInt`
//! (decimal strings), addresses are `Bytes` (lower-case hex).

/// Packets created by an address, newest first.
pub const CREATED_BY_CREATOR: &str = r#"
query CreatedByCreator($creator: Bytes!, $first: Int!, $skip: Int!) {
  createds(
    where: { creator: $creator }
    first: $first
    skip: $skip
    orderBy: blockTimestamp
    orderDirection: desc
  ) {
    id
    internal_id
    creator
    amount
    count
    isRandom
    blockNumber
    blockTimestamp
    transactionHash
  }
}
"#;

/// Claims made by an address, newest first.
pub const CLAIMED_BY_CLAIMER: &str = r#"
query ClaimedByClaimer($claimer: Bytes!, $first: Int!, $skip: Int!) {
  claimeds(
    where: { claimer: $claimer }
    first: $first
    skip: $skip
    orderBy: blockTimestamp
    orderDirection: desc
  ) {
    id
    internal_id
    claimer
    amount
    creator
    total
    blockNumber
    blockTimestamp
    transactionHash
  }
}
"#;

/// Declared count of a packet plus every claim recorded against it.
pub const PACKET_STATUS: &str = r#"
query PacketStatus($packetId: BigInt!) {
  createds(where: { internal_id: $packetId }) {
    id
    internal_id
    count
    blockTimestamp
  }
  claimeds(where: { internal_id: $packetId }) {
    id
  }
}
"#;

/// Claim records for one packet by one address.
pub const USER_CLAIM: &str = r#"
query UserClaim($packetId: BigInt!, $userAddress: Bytes!) {
  claimeds(where: { internal_id: $packetId, claimer: $userAddress }) {
    id
    amount
    blockTimestamp
    transactionHash
  }
}
"#;
