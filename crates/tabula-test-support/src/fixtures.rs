//! Sample data and store builders.

use anyhow::{Result, anyhow};
use serde_json::Value;
use tabula_store::{Column, ColumnType, Fields, LoadPayload, RecordStore, StoreOptions};

/// Turn a JSON object literal into a field map.
///
/// # Errors
///
/// Fails when `value` is not an object.
pub fn object(value: Value) -> Result<Fields> {
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(anyhow!("expected a JSON object, found {other}")),
    }
}

/// Turn a JSON array literal of objects into rows.
///
/// # Errors
///
/// Fails when `value` is not an array of objects.
pub fn rows(value: Value) -> Result<Vec<Fields>> {
    match value {
        Value::Array(items) => items.into_iter().map(object).collect(),
        other => Err(anyhow!("expected a JSON array, found {other}")),
    }
}

/// Columns of the people fixture.
#[must_use]
pub fn people_columns() -> Vec<Column> {
    vec![
        Column::new("last", ColumnType::Alphanumeric),
        Column::new("first", ColumnType::Alphanumeric),
        Column::new("age", ColumnType::Numeric),
        Column::new("joined", ColumnType::Date),
        Column::new("salary", ColumnType::Currency),
    ]
}

/// Rows of the people fixture, in load order.
///
/// # Errors
///
/// Never fails for the built-in literal; the signature follows [`rows`].
pub fn people_rows() -> Result<Vec<Fields>> {
    rows(serde_json::json!([
        {"last": "Hopper", "first": "Grace", "age": 85, "joined": "1943-12-01", "salary": "$2,100.00"},
        {"last": "Lovelace", "first": "Ada", "age": 36, "joined": "12/10/1842", "salary": "$950.50"},
        {"last": "Hopper", "first": "Amy", "age": 41, "joined": "2001-05-17", "salary": "$3,000"},
        {"last": "Turing", "first": "Alan", "age": 41, "joined": "1936-11-12", "salary": "($15.00)"},
        {"last": "Lovelace", "first": "Byron", "age": 36, "joined": "1815-01-02", "salary": "$0.99"}
    ]))
}

/// An unloaded people store with the given options applied.
///
/// # Errors
///
/// Propagates option validation failures.
pub fn people_store(options: impl FnOnce(StoreOptions) -> StoreOptions) -> Result<RecordStore> {
    let options = options(StoreOptions::new(people_columns()).with_id("people"));
    Ok(RecordStore::new(options)?)
}

/// A people store loaded with [`people_rows`].
///
/// # Errors
///
/// Propagates option validation or load failures.
pub fn loaded_people() -> Result<RecordStore> {
    let mut store = people_store(|options| options)?;
    let outcome = store.load(LoadPayload::from(people_rows()?));
    if !outcome.is_loaded() {
        return Err(anyhow!("people fixture failed to load: {outcome:?}"));
    }
    Ok(store)
}
