//! Cursor navigation. Moves clamp at either end and never wrap.

use tracing::trace;

use super::RecordStore;
use crate::error::StoreResult;
use crate::events::StoreEvent;

impl RecordStore {
    /// Number of records.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::Unloaded`] before the first load.
    pub fn count(&self) -> StoreResult<usize> {
        Ok(self.loaded()?.len())
    }

    /// Cursor position.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::Unloaded`] before the first load.
    pub fn position(&self) -> StoreResult<usize> {
        self.loaded()?;
        Ok(self.cursor)
    }

    /// Whether a record follows the current one.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::Unloaded`] before the first load.
    pub fn has_next(&self) -> StoreResult<bool> {
        Ok(self.cursor + 1 < self.loaded()?.len())
    }

    /// Whether a record precedes the current one.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::Unloaded`] before the first load.
    pub fn has_previous(&self) -> StoreResult<bool> {
        self.loaded()?;
        Ok(self.cursor > 0)
    }

    /// Whether a record exists under the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::Unloaded`] before the first load.
    pub fn valid(&self) -> StoreResult<bool> {
        Ok(self.cursor < self.loaded()?.len())
    }

    /// Step forward, stopping at the last record. Returns the new position.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::Unloaded`] before the first load.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> StoreResult<usize> {
        let last = self.last_index()?;
        let target = self.cursor.saturating_add(1).min(last);
        Ok(self.move_cursor(target))
    }

    /// Step back, stopping at the first record. Returns the new position.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::Unloaded`] before the first load.
    pub fn previous(&mut self) -> StoreResult<usize> {
        self.loaded()?;
        let target = self.cursor.saturating_sub(1);
        Ok(self.move_cursor(target))
    }

    /// Jump to the first record.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::Unloaded`] before the first load.
    pub fn first(&mut self) -> StoreResult<usize> {
        self.loaded()?;
        Ok(self.move_cursor(0))
    }

    /// Jump to the last record.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::Unloaded`] before the first load.
    pub fn last(&mut self) -> StoreResult<usize> {
        let last = self.last_index()?;
        Ok(self.move_cursor(last))
    }

    /// Jump to `index`. Returns `Ok(false)` and leaves the cursor alone when
    /// the index is out of range.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::Unloaded`] before the first load.
    pub fn move_to(&mut self, index: usize) -> StoreResult<bool> {
        if index >= self.loaded()?.len() {
            trace!(store = ?self.id, index, "move out of range");
            return Ok(false);
        }
        let _ = self.move_cursor(index);
        Ok(true)
    }

    fn last_index(&self) -> StoreResult<usize> {
        Ok(self.loaded()?.len().saturating_sub(1))
    }

    fn move_cursor(&mut self, target: usize) -> usize {
        self.cursor = target;
        trace!(store = ?self.id, position = target, "cursor moved");
        let _ = self.publish(StoreEvent::StoreMove {
            store: self.snapshot(),
        });
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use crate::column::{Column, ColumnType};
    use crate::error::{StoreError, StoreResult};
    use crate::options::StoreOptions;
    use crate::record::LoadPayload;
    use crate::store::RecordStore;
    use tabula_events::Topic;

    fn loaded(rows: usize) -> StoreResult<RecordStore> {
        let mut store = RecordStore::new(
            StoreOptions::new(vec![Column::new("n", ColumnType::Numeric)]).with_replay_capacity(32),
        )?;
        let text = format!(
            "[{}]",
            (0..rows)
                .map(|n| format!(r#"{{"n":{n}}}"#))
                .collect::<Vec<_>>()
                .join(",")
        );
        let _ = store.load(LoadPayload::text(text));
        Ok(store)
    }

    #[test]
    fn unloaded_store_reports_unloaded_everywhere() -> StoreResult<()> {
        let mut store = RecordStore::new(StoreOptions::default())?;
        assert!(matches!(store.count(), Err(StoreError::Unloaded)));
        assert!(matches!(store.position(), Err(StoreError::Unloaded)));
        assert!(matches!(store.has_next(), Err(StoreError::Unloaded)));
        assert!(matches!(store.has_previous(), Err(StoreError::Unloaded)));
        assert!(matches!(store.valid(), Err(StoreError::Unloaded)));
        assert!(matches!(store.next(), Err(StoreError::Unloaded)));
        assert!(matches!(store.previous(), Err(StoreError::Unloaded)));
        assert!(matches!(store.first(), Err(StoreError::Unloaded)));
        assert!(matches!(store.last(), Err(StoreError::Unloaded)));
        assert!(matches!(store.move_to(0), Err(StoreError::Unloaded)));
        assert!(store.backlog_since(0).is_empty());
        Ok(())
    }

    #[test]
    fn next_and_previous_clamp() -> StoreResult<()> {
        let mut store = loaded(3)?;
        assert!(store.has_next()?);
        assert!(!store.has_previous()?);
        for _ in 0..5 {
            let _ = store.next()?;
        }
        assert_eq!(store.position()?, 2);
        assert!(!store.has_next()?);
        for _ in 0..5 {
            let _ = store.previous()?;
        }
        assert_eq!(store.position()?, 0);
        assert!(store.valid()?);
        Ok(())
    }

    #[test]
    fn first_last_and_move_to() -> StoreResult<()> {
        let mut store = loaded(3)?;
        assert_eq!(store.last()?, 2);
        assert_eq!(store.first()?, 0);
        assert!(store.move_to(1)?);
        assert!(!store.move_to(5)?);
        assert_eq!(store.position()?, 1);
        Ok(())
    }

    #[test]
    fn every_move_publishes_store_move() -> StoreResult<()> {
        let mut store = loaded(2)?;
        let after_load = store.backlog_since(0).len();
        let _ = store.next()?;
        let _ = store.next()?;
        let _ = store.move_to(9)?;
        let _ = store.first()?;
        let moves: Vec<_> = store.backlog_since(0)[after_load..]
            .iter()
            .map(|envelope| envelope.event.kind())
            .collect();
        assert_eq!(moves, vec!["store_move"; 3]);
        Ok(())
    }

    #[test]
    fn empty_store_keeps_cursor_at_zero() -> StoreResult<()> {
        let mut store = loaded(0)?;
        assert_eq!(store.count()?, 0);
        assert_eq!(store.last()?, 0);
        assert_eq!(store.next()?, 0);
        assert!(!store.valid()?);
        assert!(!store.move_to(0)?);
        Ok(())
    }
}
