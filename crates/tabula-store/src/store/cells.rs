//! Cell reads and writes, new rows and dirty tracking.

use serde_json::Value;
use tracing::debug;

use super::RecordStore;
use crate::column::ColumnRef;
use crate::error::{StoreError, StoreResult};
use crate::events::StoreEvent;
use crate::record::Record;

impl RecordStore {
    /// Value of `column` in the current record. `None` when the field is
    /// absent or the store holds no records.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unloaded`] before the first load and
    /// [`StoreError::UnknownColumn`] for an undeclared column.
    pub fn get(&self, column: impl Into<ColumnRef>) -> StoreResult<Option<&Value>> {
        let records = self.loaded()?;
        let column = self.resolve_col(column)?;
        Ok(records
            .get(self.cursor)
            .and_then(|record| record.get(&column.name)))
    }

    /// Write `value` into `column` of the current record, mark the record
    /// dirty and publish `column_changed`. Returns the previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unloaded`] before the first load,
    /// [`StoreError::UnknownColumn`] for an undeclared column and
    /// [`StoreError::NoCurrentRecord`] when the store is empty.
    pub fn set(
        &mut self,
        column: impl Into<ColumnRef>,
        value: impl Into<Value>,
    ) -> StoreResult<Option<Value>> {
        self.loaded()?;
        let column = self.resolve_col(column)?.clone();
        let position = self.cursor;
        let new_value = value.into();

        let record = self
            .loaded_mut()?
            .get_mut(position)
            .ok_or(StoreError::NoCurrentRecord)?;
        let old_value = record.set(&column.name, new_value.clone());

        let _ = self.publish(StoreEvent::ColumnChanged {
            position,
            column,
            old_value: old_value.clone(),
            new_value,
        });
        Ok(old_value)
    }

    /// Append a record, empty or seeded, mark it dirty and make it current.
    /// Returns the new position. Works on an unloaded store.
    pub fn new_row(&mut self, initial: impl Into<Option<Record>>) -> usize {
        let mut record = initial.into().unwrap_or_default();
        record.mark_dirty();

        let records = self.records.get_or_insert_with(Vec::new);
        records.push(record);
        let count = records.len();
        self.cursor = count - 1;

        if let Some(metrics) = &self.metrics {
            metrics.set_records(count);
        }
        debug!(store = ?self.id, position = self.cursor, "row appended");
        let _ = self.publish(StoreEvent::NewRow {
            store: self.snapshot(),
        });
        self.cursor
    }

    /// Whether any record is dirty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unloaded`] before the first load.
    pub fn is_dirty(&self) -> StoreResult<bool> {
        Ok(self.loaded()?.iter().any(Self::is_row_dirty))
    }

    /// Whether a record carries a set dirty flag.
    #[must_use]
    pub const fn is_row_dirty(record: &Record) -> bool {
        record.is_dirty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use crate::column::{Column, ColumnType};
    use crate::error::{StoreError, StoreResult};
    use crate::events::StoreEvent;
    use crate::options::StoreOptions;
    use crate::record::{LoadPayload, Record};
    use crate::store::RecordStore;

    fn store() -> StoreResult<RecordStore> {
        RecordStore::new(
            StoreOptions::new(vec![
                Column::new("name", ColumnType::Alphanumeric),
                Column::new("age", ColumnType::Numeric),
            ])
            .with_replay_capacity(32),
        )
    }

    #[test]
    fn get_resolves_names_and_indices() -> StoreResult<()> {
        let mut store = store()?;
        let _ = store.load(LoadPayload::text(r#"[{"name":"Ada","age":36}]"#));
        assert_eq!(store.get("name")?, Some(&json!("Ada")));
        assert_eq!(store.get(1_usize)?, Some(&json!(36)));
        assert!(matches!(store.get("email"), Err(StoreError::UnknownColumn { .. })));
        Ok(())
    }

    #[test]
    fn get_returns_none_for_absent_fields() -> StoreResult<()> {
        let mut store = store()?;
        let _ = store.load(LoadPayload::text(r#"[{"name":"Ada"}]"#));
        assert_eq!(store.get("age")?, None);
        let _ = store.load(LoadPayload::text("[]"));
        assert_eq!(store.get("name")?, None);
        Ok(())
    }

    #[test]
    fn set_writes_marks_dirty_and_publishes() -> StoreResult<()> {
        let mut store = store()?;
        let _ = store.load(LoadPayload::text(r#"[{"name":"Ada","age":36},{"name":"Bob"}]"#));
        assert!(!store.is_dirty()?);
        let _ = store.last()?;

        let old = store.set("age", 41)?;
        assert_eq!(old, None);
        assert_eq!(store.get("age")?, Some(&json!(41)));
        assert!(store.is_dirty()?);
        assert!(store.current().is_some_and(RecordStore::is_row_dirty));

        let last = store.backlog_since(0).pop().map(|envelope| envelope.event);
        assert_eq!(
            last,
            Some(StoreEvent::ColumnChanged {
                position: 1,
                column: Column::new("age", ColumnType::Numeric),
                old_value: None,
                new_value: json!(41),
            })
        );
        Ok(())
    }

    #[test]
    fn set_distinguishes_unloaded_from_empty() -> StoreResult<()> {
        let mut store = store()?;
        assert!(matches!(store.set("name", "x"), Err(StoreError::Unloaded)));
        let _ = store.load(LoadPayload::text("[]"));
        assert!(matches!(store.set("name", "x"), Err(StoreError::NoCurrentRecord)));
        assert!(matches!(store.is_dirty(), Ok(false)));
        Ok(())
    }

    #[test]
    fn new_row_appends_dirty_record_and_moves_cursor() -> StoreResult<()> {
        let mut store = store()?;
        assert_eq!(store.new_row(None), 0);
        assert_eq!(store.count()?, 1);

        let mut seeded = Record::new();
        let _ = seeded.set("name", Value::from("Grace"));
        seeded.clear_dirty();
        assert_eq!(store.new_row(seeded), 1);
        assert_eq!(store.position()?, 1);
        assert_eq!(store.get("name")?, Some(&json!("Grace")));
        assert!(store.is_dirty()?);
        assert!(
            store
                .records()
                .is_some_and(|records| records.iter().all(Record::is_dirty))
        );
        Ok(())
    }
}
