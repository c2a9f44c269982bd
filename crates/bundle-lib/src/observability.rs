//! Observability infrastructure for bundle inspection
//!
//! Provides:
//! - Prometheus metrics (archive open latency, member reads, resolver
//!   substitutions, log parsing outcomes, request latency)
//! - Structured JSON logging with tracing

use prometheus::{register_histogram, register_int_counter, Histogram, IntCounter};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<BundleMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct BundleMetricsInner {
    archive_open_latency_seconds: Histogram,
    request_latency_seconds: Histogram,
    member_reads: IntCounter,
    type_substitutions: IntCounter,
    data_inconsistencies: IntCounter,
    log_lines_unparsed: IntCounter,
    log_records_emitted: IntCounter,
}

impl BundleMetricsInner {
    fn new() -> Self {
        Self {
            archive_open_latency_seconds: register_histogram!(
                "bundle_archive_open_latency_seconds",
                "Time spent decompressing and indexing a support bundle",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register archive_open_latency_seconds"),

            request_latency_seconds: register_histogram!(
                "bundle_request_latency_seconds",
                "Time spent serving one bundle query end to end",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register request_latency_seconds"),

            member_reads: register_int_counter!(
                "bundle_member_reads_total",
                "Total number of archive members read"
            )
            .expect("Failed to register member_reads"),

            type_substitutions: register_int_counter!(
                "bundle_resource_type_substitutions_total",
                "Total number of resource type tokens resolved by fuzzy match"
            )
            .expect("Failed to register type_substitutions"),

            data_inconsistencies: register_int_counter!(
                "bundle_data_inconsistencies_total",
                "Total number of cross-artifact inconsistencies detected"
            )
            .expect("Failed to register data_inconsistencies"),

            log_lines_unparsed: register_int_counter!(
                "bundle_log_lines_unparsed_total",
                "Total number of log lines passed through without structure"
            )
            .expect("Failed to register log_lines_unparsed"),

            log_records_emitted: register_int_counter!(
                "bundle_log_records_emitted_total",
                "Total number of structured log records emitted after filtering"
            )
            .expect("Failed to register log_records_emitted"),
        }
    }
}

/// Bundle metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct BundleMetrics {
    _private: (),
}

impl Default for BundleMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl BundleMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(BundleMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &BundleMetricsInner {
        GLOBAL_METRICS.get_or_init(BundleMetricsInner::new)
    }

    pub fn observe_archive_open_latency(&self, duration_secs: f64) {
        self.inner()
            .archive_open_latency_seconds
            .observe(duration_secs);
    }

    pub fn observe_request_latency(&self, duration_secs: f64) {
        self.inner().request_latency_seconds.observe(duration_secs);
    }

    pub fn inc_member_reads(&self) {
        self.inner().member_reads.inc();
    }

    pub fn inc_type_substitutions(&self) {
        self.inner().type_substitutions.inc();
    }

    pub fn inc_data_inconsistencies(&self) {
        self.inner().data_inconsistencies.inc();
    }

    pub fn inc_log_lines_unparsed(&self) {
        self.inner().log_lines_unparsed.inc();
    }

    pub fn add_log_records_emitted(&self, count: u64) {
        self.inner().log_records_emitted.inc_by(count);
    }
}

/// Structured logger for service events
///
/// Provides consistent JSON-formatted logging for requests and lifecycle
/// events of the processes that embed this crate.
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str, upload_dir: &str) {
        info!(
            event = "service_started",
            service = %self.service,
            version = %version,
            upload_dir = %upload_dir,
            "Bundle inspector started"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service,
            reason = %reason,
            "Bundle inspector shutting down"
        );
    }

    /// Log a completed query against a bundle
    pub fn log_request(&self, operation: &str, archive: &str, elapsed_ms: u64) {
        info!(
            event = "request_completed",
            service = %self.service,
            operation = %operation,
            archive = %archive,
            elapsed_ms = elapsed_ms,
            "Bundle query completed"
        );
    }

    /// Log a query that surfaced an error to the caller
    pub fn log_request_failure(&self, operation: &str, archive: &str, error: &str) {
        warn!(
            event = "request_failed",
            service = %self.service,
            operation = %operation,
            archive = %archive,
            error = %error,
            "Bundle query failed"
        );
    }
}
