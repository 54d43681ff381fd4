#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(
    missing_docs,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]

//! Per-instance event hub for Tabula stores.
//!
//! Each store owns one hub; there is no global bus. Publishing is
//! synchronous: every matching handler runs, in subscription order, before
//! `publish` returns. Envelopes carry a sequential identifier and a
//! timestamp, and a bounded replay ring lets late subscribers (for example a
//! widget mounted after the first load) catch up via `backlog_since`.
//!
//! Layout: `payloads.rs` (envelopes, ids, the `Topic` trait), `routing.rs`
//! (`EventHub`), `topics.rs` (kind filtering), `error.rs` (hub errors).

pub mod error;
pub mod payloads;
pub mod routing;
pub mod topics;

pub use error::{EventHubError, EventHubResult};
pub use payloads::{
    DEFAULT_REPLAY_CAPACITY, Delivery, EventEnvelope, EventId, Flow, SubscriptionId, Topic,
};
pub use routing::EventHub;
pub use topics::{KindFilter, event_kind};
