//! Grouped multi-column sort.
//!
//! The primary column sorts the whole record set. Each later column then
//! sorts only within runs of records that are equal on every earlier column,
//! so earlier orderings are never disturbed.

use std::cmp::Ordering;
use std::time::Instant;

use tracing::debug;

use super::RecordStore;
use crate::column::{Column, ColumnRef};
use crate::compare::Comparator;
use crate::error::{StoreError, StoreResult};
use crate::events::StoreEvent;
use crate::record::Record;
use crate::sort::{SortDirection, SortSpec, Sorter, sort_records};

impl RecordStore {
    /// Sort the record set.
    ///
    /// Columns come from the request, or from the configured sort columns
    /// when the request names none; the resolved list becomes the new
    /// configured list. `sort_start` is published first and `sort_finished`
    /// once the records are in place.
    ///
    /// The first column orders the whole set. Each later column sorts only
    /// within runs that are equal on *every* preceding column, not just the
    /// one before it, so a later key never reorders records an earlier key
    /// already separated.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoSortColumns`] when no columns are available,
    /// [`StoreError::UnknownColumn`] when one does not resolve and
    /// [`StoreError::Unloaded`] before the first load. Nothing is mutated on
    /// error.
    pub fn sort(&mut self, spec: SortSpec) -> StoreResult<()> {
        let _ = self.publish(StoreEvent::SortStart {
            store: self.snapshot(),
        });

        let SortSpec {
            columns,
            algorithm,
            direction,
        } = spec;
        let requested: Vec<ColumnRef> = match columns {
            Some(columns) if !columns.is_empty() => columns,
            _ => self.sort_columns.iter().map(ColumnRef::from).collect(),
        };
        if requested.is_empty() {
            return Err(StoreError::NoSortColumns);
        }
        let keys = requested
            .into_iter()
            .map(|column| self.resolve_col(column).cloned())
            .collect::<StoreResult<Vec<Column>>>()?;
        let algorithm = algorithm.unwrap_or(self.default_sort);

        let started = Instant::now();
        let records = std::mem::take(self.loaded_mut()?);
        let count = records.len();
        let mut sorted = grouped_sort(&algorithm, records, &keys, self.comparator());
        if direction == SortDirection::Descending {
            sorted.reverse();
        }
        self.records = Some(sorted);
        self.sort_columns = keys.into_iter().map(|key| key.name).collect();

        let elapsed = started.elapsed();
        if let Some(metrics) = &self.metrics {
            metrics.observe_sort(algorithm.as_str(), elapsed);
            metrics.set_records(count);
        }
        debug!(
            store = ?self.id,
            algorithm = algorithm.as_str(),
            columns = ?self.sort_columns,
            ?direction,
            count,
            elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
            "records sorted"
        );
        let _ = self.publish(StoreEvent::SortFinished {
            store: self.snapshot(),
        });
        Ok(())
    }
}

/// Sort by `keys[0]`, then sub-sort each run of records equal on all
/// preceding keys by the next key.
fn grouped_sort<S: Sorter>(
    sorter: &S,
    records: Vec<Record>,
    keys: &[Column],
    comparator: &Comparator,
) -> Vec<Record> {
    let Some((primary, rest)) = keys.split_first() else {
        return records;
    };
    let mut sorted = sort_records(
        sorter,
        records,
        &primary.name,
        comparator.for_type(primary.kind),
    );
    for (depth, key) in rest.iter().enumerate() {
        let preceding = &keys[..=depth];
        sorted = split_runs(sorted, preceding, comparator)
            .into_iter()
            .flat_map(|run| {
                if run.len() > 1 {
                    sort_records(sorter, run, &key.name, comparator.for_type(key.kind))
                } else {
                    run
                }
            })
            .collect();
    }
    sorted
}

fn split_runs(records: Vec<Record>, keys: &[Column], comparator: &Comparator) -> Vec<Vec<Record>> {
    let mut runs: Vec<Vec<Record>> = Vec::new();
    for record in records {
        let joins = runs
            .last()
            .and_then(|run| run.last())
            .is_some_and(|last| equal_on(last, &record, keys, comparator));
        match runs.last_mut() {
            Some(run) if joins => run.push(record),
            _ => runs.push(vec![record]),
        }
    }
    runs
}

fn equal_on(left: &Record, right: &Record, keys: &[Column], comparator: &Comparator) -> bool {
    keys.iter().all(|key| {
        comparator.compare(key.kind, left.get(&key.name), right.get(&key.name)) == Ordering::Equal
    })
}
