//! Lifecycle events published by a store.
//!
//! # Design
//! - Handlers receive owned snapshots, never the store itself.
//! - `kind()` strings double as subscription filters and metric labels.
//! - Load events share one [`Arc`] of the raw payload with the load itself,
//!   so publishing them never copies the input.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabula_events::Topic;

use crate::column::Column;
use crate::record::LoadPayload;

/// Point-in-time view of a store carried by events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Store identifier, if configured.
    pub id: Option<String>,
    /// Cursor position; `None` while unloaded.
    pub position: Option<usize>,
    /// Record count; `None` while unloaded.
    pub count: Option<usize>,
}

/// Store lifecycle event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    /// A load is about to start. Vetoable.
    Preload {
        /// Store before the load.
        store: StoreSnapshot,
        /// Raw input.
        payload: Arc<LoadPayload>,
    },
    /// A load replaced the record set.
    LoadFinished {
        /// Store after the load.
        store: StoreSnapshot,
    },
    /// A payload could not be decoded; the record set is unchanged.
    LoadError {
        /// Store after the failed load.
        store: StoreSnapshot,
        /// Raw input.
        payload: Arc<LoadPayload>,
        /// Decode failure message.
        reason: String,
    },
    /// The cursor was moved.
    StoreMove {
        /// Store after the move.
        store: StoreSnapshot,
    },
    /// A cell of the current record was written.
    ColumnChanged {
        /// Cursor position of the written record.
        position: usize,
        /// Column that was written.
        column: Column,
        /// Value before the write.
        old_value: Option<Value>,
        /// Value after the write.
        new_value: Value,
    },
    /// A record was appended and became current.
    NewRow {
        /// Store after the append.
        store: StoreSnapshot,
    },
    /// A sort request was received.
    SortStart {
        /// Store before the sort.
        store: StoreSnapshot,
    },
    /// A sort completed.
    SortFinished {
        /// Store after the sort.
        store: StoreSnapshot,
    },
}

impl StoreEvent {
    /// Kind of [`StoreEvent::Preload`].
    pub const PRELOAD: &'static str = "preload";
    /// Kind of [`StoreEvent::LoadFinished`].
    pub const LOAD_FINISHED: &'static str = "load_finished";
    /// Kind of [`StoreEvent::LoadError`].
    pub const LOAD_ERROR: &'static str = "load_error";
    /// Kind of [`StoreEvent::StoreMove`].
    pub const STORE_MOVE: &'static str = "store_move";
    /// Kind of [`StoreEvent::ColumnChanged`].
    pub const COLUMN_CHANGED: &'static str = "column_changed";
    /// Kind of [`StoreEvent::NewRow`].
    pub const NEW_ROW: &'static str = "new_row";
    /// Kind of [`StoreEvent::SortStart`].
    pub const SORT_START: &'static str = "sort_start";
    /// Kind of [`StoreEvent::SortFinished`].
    pub const SORT_FINISHED: &'static str = "sort_finished";

    /// Store snapshot carried by the event, if any.
    #[must_use]
    pub const fn store(&self) -> Option<&StoreSnapshot> {
        match self {
            Self::Preload { store, .. }
            | Self::LoadFinished { store }
            | Self::LoadError { store, .. }
            | Self::StoreMove { store }
            | Self::NewRow { store }
            | Self::SortStart { store }
            | Self::SortFinished { store } => Some(store),
            Self::ColumnChanged { .. } => None,
        }
    }
}

impl Topic for StoreEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::Preload { .. } => Self::PRELOAD,
            Self::LoadFinished { .. } => Self::LOAD_FINISHED,
            Self::LoadError { .. } => Self::LOAD_ERROR,
            Self::StoreMove { .. } => Self::STORE_MOVE,
            Self::ColumnChanged { .. } => Self::COLUMN_CHANGED,
            Self::NewRow { .. } => Self::NEW_ROW,
            Self::SortStart { .. } => Self::SORT_START,
            Self::SortFinished { .. } => Self::SORT_FINISHED,
        }
    }
}
