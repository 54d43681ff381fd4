#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(
    missing_docs,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]

//! Telemetry primitives shared across the Tabula workspace.
//!
//! This crate centralises logging setup and the Prometheus collectors that
//! record store activity, so hosts embedding several stores get one
//! consistent observability story.
//!
//! Layout: `init.rs` (tracing subscriber + build SHA), `metrics.rs`
//! (`Metrics` registry and snapshots), `error.rs` (`TelemetryError`).

pub mod error;
pub mod init;
pub mod metrics;

pub use error::{Result, TelemetryError};
pub use init::{
    DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, STORE_TARGET, build_sha, init_logging,
    log_format_from_config,
};
pub use metrics::{Metrics, MetricsSnapshot};
