//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes the counters/gauges relevant to record stores: loads, sorts,
//!   published events and the size of the most recently touched record set.

use std::convert::TryFrom;
use std::sync::Arc;
use std::time::Duration;

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{Result, TelemetryError};

/// Prometheus-backed metrics registry shared by every store in a host.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    events_emitted_total: IntCounterVec,
    sorts_total: IntCounterVec,
    loads_total: IntCounter,
    load_failures_total: IntCounter,
    records: IntGauge,
    sort_latency_ms: IntGauge,
}

/// Snapshot of selected gauges and counters for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Successful loads across all stores.
    pub loads_total: u64,
    /// Loads rejected because the payload could not be decoded.
    pub load_failures_total: u64,
    /// Record count of the store that last reported.
    pub records: i64,
    /// Latest sort latency in milliseconds.
    pub sort_latency_ms: i64,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// built or registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let events_emitted_total = IntCounterVec::new(
            Opts::new("store_events_total", "Store events published by type"),
            &["type"],
        )
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "store_events_total",
            source,
        })?;
        let sorts_total = IntCounterVec::new(
            Opts::new("store_sorts_total", "Completed sorts by algorithm"),
            &["algorithm"],
        )
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "store_sorts_total",
            source,
        })?;
        let loads_total = IntCounter::with_opts(Opts::new(
            "store_loads_total",
            "Record sets loaded successfully",
        ))
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "store_loads_total",
            source,
        })?;
        let load_failures_total = IntCounter::with_opts(Opts::new(
            "store_load_failures_total",
            "Load payloads that failed to decode",
        ))
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "store_load_failures_total",
            source,
        })?;
        let records = IntGauge::with_opts(Opts::new(
            "store_records",
            "Record count reported by the most recent store operation",
        ))
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "store_records",
            source,
        })?;
        let sort_latency_ms = IntGauge::with_opts(Opts::new(
            "store_sort_latency_ms",
            "Time taken by the most recent sort (ms)",
        ))
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "store_sort_latency_ms",
            source,
        })?;

        register(&registry, "store_events_total", &events_emitted_total)?;
        register(&registry, "store_sorts_total", &sorts_total)?;
        register(&registry, "store_loads_total", &loads_total)?;
        register(&registry, "store_load_failures_total", &load_failures_total)?;
        register(&registry, "store_records", &records)?;
        register(&registry, "store_sort_latency_ms", &sort_latency_ms)?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                events_emitted_total,
                sorts_total,
                loads_total,
                load_failures_total,
                records,
                sort_latency_ms,
            }),
        })
    }

    /// Increment the emitted event counter for the specific event type.
    pub fn inc_event(&self, event_type: &str) {
        self.inner
            .events_emitted_total
            .with_label_values(&[event_type])
            .inc();
    }

    /// Record a successful load.
    pub fn inc_load(&self) {
        self.inner.loads_total.inc();
    }

    /// Record a load whose payload failed to decode.
    pub fn inc_load_failure(&self) {
        self.inner.load_failures_total.inc();
    }

    /// Record a completed sort and its latency.
    pub fn observe_sort(&self, algorithm: &str, duration: Duration) {
        self.inner.sorts_total.with_label_values(&[algorithm]).inc();
        self.inner
            .sort_latency_ms
            .set(Self::duration_to_ms(duration));
    }

    /// Set the record count gauge.
    pub fn set_records(&self, count: usize) {
        self.inner
            .records
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Render the metrics registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or if the encoded
    /// buffer is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|source| TelemetryError::MetricsEncode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsUtf8 { source })
    }

    /// Take a point-in-time snapshot of the most relevant gauges and counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            loads_total: self.inner.loads_total.get(),
            load_failures_total: self.inner.load_failures_total.get(),
            records: self.inner.records.get(),
            sort_latency_ms: self.inner.sort_latency_ms.get(),
        }
    }

    /// Convert a duration to milliseconds saturating at `i64::MAX`.
    pub(crate) fn duration_to_ms(duration: Duration) -> i64 {
        i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
    }
}

fn register<C>(registry: &Registry, name: &'static str, collector: &C) -> Result<()>
where
    C: prometheus::core::Collector + Clone + 'static,
{
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::MetricsRegister { name, source })
}
