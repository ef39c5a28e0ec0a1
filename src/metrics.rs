//! Pipeline counters and the optional Prometheus exporter.
//!
//! Recording is a no-op until a recorder is installed, so library users and
//! tests can call these freely.

use metrics::{counter, histogram};
use std::net::SocketAddr;
use std::sync::Once;
use tracing::{info, warn};

use crate::types::DiagnosticKind;

static INIT: Once = Once::new();

pub const ROWS_LOADED: &str = "lumina_rows_loaded_total";
pub const ROWS_REJECTED: &str = "lumina_rows_rejected_total";
pub const RECORDS_UNMAPPED: &str = "lumina_records_unmapped_total";
pub const PIPELINE_RUNS: &str = "lumina_pipeline_runs_total";
pub const PIPELINE_DURATION: &str = "lumina_pipeline_duration_seconds";

/// Install the Prometheus exporter on `addr`. Idempotent.
pub fn init_metrics(addr: SocketAddr) {
    INIT.call_once(|| {
        let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
        match builder.install() {
            Ok(()) => info!("Prometheus exporter listening on http://{}/metrics", addr),
            Err(e) => warn!("Prometheus exporter install failed: {}", e),
        }
    });
}

pub fn record_loaded(rows: usize) {
    counter!(ROWS_LOADED).increment(rows as u64);
}

pub fn record_rejected(kind: DiagnosticKind) {
    counter!(ROWS_REJECTED, "kind" => kind.as_str()).increment(1);
}

pub fn record_unmapped(kind: DiagnosticKind) {
    counter!(RECORDS_UNMAPPED, "kind" => kind.as_str()).increment(1);
}

pub fn record_run(duration_secs: f64) {
    counter!(PIPELINE_RUNS).increment(1);
    histogram!(PIPELINE_DURATION).record(duration_secs);
}
