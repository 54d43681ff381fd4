//! The record store.
//!
//! # Design
//! - `records` is `None` until the first load or new row; every read,
//!   write and navigation call on such a store returns
//!   [`StoreError::Unloaded`].
//! - Events are published through a per-store [`EventHub`]. Handlers get
//!   owned [`StoreEvent`] values and cannot reach back into the store while
//!   an operation is in flight.
//! - A load decodes its payload before touching the record set, so a failed
//!   load leaves the previous records in place.
//! - Replay is off unless [`StoreOptions::replay_capacity`] asks for it; a
//!   payload outlives its load only while a handler still holds it.

mod cells;
mod cursor;
mod sorting;

use std::sync::Arc;

use once_cell::unsync::OnceCell;
use tabula_events::{
    Delivery, EventEnvelope, EventHub, EventHubResult, EventId, Flow, KindFilter, SubscriptionId,
    Topic,
};
use tabula_telemetry::Metrics;
use tracing::{debug, warn};

use crate::column::{Column, ColumnRef, resolve};
use crate::compare::{CompareMode, Comparator};
use crate::error::{StoreError, StoreResult};
use crate::events::{StoreEvent, StoreSnapshot};
use crate::options::StoreOptions;
use crate::record::{Fields, LoadPayload, Record};
use crate::sort::SortAlgorithm;

/// Result of a `load` or `refresh` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The record set was replaced.
    Loaded {
        /// Records now held.
        count: usize,
    },
    /// The payload could not be decoded; `load_error` was published.
    Failed {
        /// Decode failure message.
        reason: String,
    },
    /// A `preload` handler vetoed the load.
    Vetoed,
    /// No payload was supplied.
    Skipped,
}

impl LoadOutcome {
    /// Whether the record set was replaced.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }
}

/// In-memory record set with a cursor, typed columns and dirty tracking.
#[derive(Debug)]
pub struct RecordStore {
    id: Option<String>,
    columns: Vec<Column>,
    default_sort: SortAlgorithm,
    separator: String,
    compare_mode: CompareMode,
    sort_columns: Vec<String>,
    records: Option<Vec<Record>>,
    cursor: usize,
    comparator: OnceCell<Comparator>,
    events: EventHub<StoreEvent>,
    metrics: Option<Metrics>,
}

impl RecordStore {
    /// Build an unloaded store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidOptions`] when the options fail
    /// validation.
    pub fn new(options: StoreOptions) -> StoreResult<Self> {
        options.validate()?;
        let StoreOptions {
            id,
            columns,
            default_sort,
            separator,
            compare_mode,
            sort_columns,
            replay_capacity,
        } = options;
        Ok(Self {
            id,
            columns,
            default_sort,
            separator,
            compare_mode,
            sort_columns,
            records: None,
            cursor: 0,
            comparator: OnceCell::new(),
            events: EventHub::with_capacity(replay_capacity),
            metrics: None,
        })
    }

    /// Report loads, sorts and events to a shared metrics registry.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Store identifier.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Declared columns in display order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Active sort columns, primary first.
    #[must_use]
    pub fn sort_columns(&self) -> &[String] {
        &self.sort_columns
    }

    /// Algorithm used when a sort request names none.
    #[must_use]
    pub const fn default_sort(&self) -> SortAlgorithm {
        self.default_sort
    }

    /// Records in store order, or `None` while unloaded.
    #[must_use]
    pub fn records(&self) -> Option<&[Record]> {
        self.records.as_deref()
    }

    /// Record under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&Record> {
        self.records.as_ref()?.get(self.cursor)
    }

    /// Resolve a column index or name to its descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownColumn`] for an out-of-range index or an
    /// undeclared name.
    pub fn resolve_col(&self, column: impl Into<ColumnRef>) -> StoreResult<&Column> {
        resolve(&self.columns, &column.into())
    }

    /// Comparator built from the store's separator and mode on first use.
    pub fn comparator(&self) -> &Comparator {
        self.comparator
            .get_or_init(|| Comparator::new(self.separator.clone(), self.compare_mode))
    }

    /// Current position and size as carried by events.
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            id: self.id.clone(),
            position: self.records.as_ref().map(|_| self.cursor),
            count: self.records.as_ref().map(Vec::len),
        }
    }

    /// Replace the record set. `None` is a no-op.
    ///
    /// Publishes `preload`, then `load_finished` or `load_error`.
    pub fn load(&mut self, payload: impl Into<Option<LoadPayload>>) -> LoadOutcome {
        self.process(payload.into(), false)
    }

    /// Replace the record set and optionally move the cursor back to the
    /// first record. `None` is a no-op.
    pub fn refresh(
        &mut self,
        payload: impl Into<Option<LoadPayload>>,
        reset_cursor: bool,
    ) -> LoadOutcome {
        self.process(payload.into(), reset_cursor)
    }

    fn process(&mut self, payload: Option<LoadPayload>, reset_cursor: bool) -> LoadOutcome {
        let Some(payload) = payload else {
            return LoadOutcome::Skipped;
        };

        let payload = Arc::new(payload);
        let preload = self.publish(StoreEvent::Preload {
            store: self.snapshot(),
            payload: Arc::clone(&payload),
        });
        if preload.vetoed {
            debug!(store = ?self.id, "load vetoed by preload handler");
            return LoadOutcome::Vetoed;
        }

        let decoded = match Arc::try_unwrap(payload) {
            Ok(owned) => owned
                .into_records()
                .map_err(|(error, payload)| (error, Arc::new(payload))),
            Err(shared) => match shared.decode() {
                Ok(records) => Ok(records),
                Err(error) => Err((error, shared)),
            },
        };
        match decoded {
            Ok(records) => {
                let count = records.len();
                self.records = Some(records);
                self.cursor = if reset_cursor {
                    0
                } else {
                    self.cursor.min(count.saturating_sub(1))
                };
                if let Some(metrics) = &self.metrics {
                    metrics.inc_load();
                    metrics.set_records(count);
                }
                debug!(store = ?self.id, count, "records loaded");
                let _ = self.publish(StoreEvent::LoadFinished {
                    store: self.snapshot(),
                });
                LoadOutcome::Loaded { count }
            }
            Err((error, payload)) => {
                warn!(store = ?self.id, error = %error, "failed to decode load payload");
                if let Some(metrics) = &self.metrics {
                    metrics.inc_load_failure();
                }
                let reason = error.to_string();
                let _ = self.publish(StoreEvent::LoadError {
                    store: self.snapshot(),
                    payload,
                    reason: reason.clone(),
                });
                LoadOutcome::Failed { reason }
            }
        }
    }

    /// Records as JSON objects, dirty flag included, ready to be loaded again.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unloaded`] before the first load.
    pub fn export(&self) -> StoreResult<Vec<Fields>> {
        Ok(self.loaded()?.iter().map(Record::to_fields).collect())
    }

    /// [`RecordStore::export`] rendered as JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unloaded`] before the first load and
    /// [`StoreError::Export`] if encoding fails.
    pub fn to_json(&self) -> StoreResult<String> {
        serde_json::to_string(&self.export()?).map_err(|source| StoreError::Export { source })
    }

    /// Clear every record's dirty flag once the caller has persisted them.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unloaded`] before the first load.
    pub fn mark_clean(&mut self) -> StoreResult<()> {
        self.loaded_mut()?
            .iter_mut()
            .for_each(Record::clear_dirty);
        Ok(())
    }

    /// Observe every store event.
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&EventEnvelope<StoreEvent>) + 'static,
    {
        self.events.subscribe(handler)
    }

    /// Observe one event kind, e.g. [`StoreEvent::LOAD_FINISHED`].
    pub fn subscribe_to<F>(&mut self, kind: &'static str, handler: F) -> SubscriptionId
    where
        F: FnMut(&EventEnvelope<StoreEvent>) + 'static,
    {
        self.events.subscribe_to(kind, handler)
    }

    /// Register a handler that can veto `preload`.
    pub fn intercept<F>(&mut self, filter: KindFilter, handler: F) -> SubscriptionId
    where
        F: FnMut(&EventEnvelope<StoreEvent>) -> Flow + 'static,
    {
        self.events.intercept(filter, handler)
    }

    /// Drop a subscription.
    ///
    /// # Errors
    ///
    /// Fails when `id` is not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> EventHubResult<()> {
        self.events.unsubscribe(id)
    }

    /// Events published after `id` that are still buffered.
    #[must_use]
    pub fn backlog_since(&self, id: EventId) -> Vec<EventEnvelope<StoreEvent>> {
        self.events.backlog_since(id)
    }

    fn publish(&mut self, event: StoreEvent) -> Delivery {
        let kind = event.kind();
        if let Some(metrics) = &self.metrics {
            metrics.inc_event(kind);
        }
        let delivery = self.events.publish(event);
        tracing::trace!(
            store = ?self.id,
            kind,
            event_id = delivery.id,
            delivered = delivery.delivered,
            "store event published"
        );
        delivery
    }

    fn loaded(&self) -> StoreResult<&Vec<Record>> {
        self.records.as_ref().ok_or(StoreError::Unloaded)
    }

    fn loaded_mut(&mut self) -> StoreResult<&mut Vec<Record>> {
        self.records.as_mut().ok_or(StoreError::Unloaded)
    }
}
