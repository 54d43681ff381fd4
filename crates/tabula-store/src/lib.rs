#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(
    missing_docs,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

//! In-memory record store backing Tabula's data widgets.
//!
//! A [`RecordStore`] owns an ordered record set, a cursor, typed column
//! metadata and per-record dirty flags. Widgets load data into it, walk the
//! cursor, read and write cells, and ask for grouped multi-column sorts; the
//! store reports every lifecycle step through its own event hub.
//!
//! Layout: `column.rs` (column descriptors + resolution), `record.rs`
//! (records and load payloads), `compare.rs` (per-type comparisons),
//! `sort/` (sorting strategies), `options.rs` + `validate.rs`
//! (construction options), `events.rs` (store events), `store/` (the store
//! itself), `error.rs` (`StoreError`).

pub mod column;
pub mod compare;
pub mod error;
pub mod events;
pub mod options;
pub mod record;
pub mod sort;
pub mod store;
pub mod validate;

pub use column::{Column, ColumnRef, ColumnType};
pub use compare::{CompareMode, Comparator};
pub use error::{PayloadError, StoreError, StoreResult};
pub use events::{StoreEvent, StoreSnapshot};
pub use options::StoreOptions;
pub use record::{DIRTY_KEY, Fields, LoadPayload, Record};
pub use serde_json::Value;
pub use sort::{SortAlgorithm, SortDirection, SortSpec, Sorter, sort_records};
pub use store::{LoadOutcome, RecordStore};
