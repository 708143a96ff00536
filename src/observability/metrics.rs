//! Metrics collection.
//!
//! # Metrics
//! - `redpacket_preflight_total` (counter): claim pre-check verdicts by outcome
//! - `redpacket_tx_total` (counter): transaction phase transitions by action, phase
//! - `redpacket_subgraph_requests_total` (counter): indexing queries by query, status
//! - `redpacket_packet_reads_total` (counter): authoritative `getPacket` reads

pub fn record_preflight(outcome: &'static str) {
    ::metrics::counter!("redpacket_preflight_total", "outcome" => outcome).increment(1);
}

pub fn record_tx(action: &'static str, phase: &'static str) {
    ::metrics::counter!("redpacket_tx_total", "action" => action, "phase" => phase).increment(1);
}

pub fn record_subgraph(query: &'static str, ok: bool) {
    let status = if ok { "ok" } else { "error" };
    ::metrics::counter!("redpacket_subgraph_requests_total", "query" => query, "status" => status)
        .increment(1);
}

pub fn record_packet_read() {
    ::metrics::counter!("redpacket_packet_reads_total").increment(1);
}
