//! Metrics collection and exposition.
//!
//! # Metrics
//! - `domain_resolutions_total` (counter): resolutions by match type
//! - `domain_mutations_total` (counter): registry writes by operation
//! - `domain_invalidation_failures_total` (counter): failed cache invalidations
//! - `domain_probe_total` (counter): response probes by outcome
//! - `domain_records` (gauge): records in the registry

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::domain::MatchType;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_resolution(match_type: MatchType) {
    metrics::counter!("domain_resolutions_total", "match_type" => match_type.as_str()).increment(1);
}

pub fn record_mutation(op: &'static str) {
    metrics::counter!("domain_mutations_total", "op" => op).increment(1);
}

pub fn record_invalidation_failure() {
    metrics::counter!("domain_invalidation_failures_total").increment(1);
}

pub fn record_probe(outcome: &'static str) {
    metrics::counter!("domain_probe_total", "outcome" => outcome).increment(1);
}

pub fn record_domain_count(count: usize) {
    metrics::gauge!("domain_records").set(count as f64);
}
