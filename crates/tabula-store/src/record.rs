//! Records and the payload shapes a store can be loaded from.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PayloadError;

/// Insertion-ordered field map backing a record.
pub type Fields = serde_json::Map<String, Value>;

/// Reserved key carrying the dirty flag in load payloads and exports.
pub const DIRTY_KEY: &str = "dirty";

/// One row of data plus its dirty flag.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Fields,
    dirty: bool,
}

impl Record {
    /// Empty, clean record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from raw fields. A boolean `dirty` key is lifted into
    /// the flag; any other value under that key is dropped.
    #[must_use]
    pub fn from_fields(mut fields: Fields) -> Self {
        let dirty = matches!(fields.shift_remove(DIRTY_KEY), Some(Value::Bool(true)));
        Self { fields, dirty }
    }

    /// Field value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Write a field and mark the record dirty, returning the previous value.
    pub fn set(&mut self, name: &str, value: Value) -> Option<Value> {
        self.dirty = true;
        self.fields.insert(name.to_string(), value)
    }

    /// Whether the record changed since it was last marked clean.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flag the record as changed.
    pub const fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clear the dirty flag, typically after the caller persisted the record.
    pub const fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Borrow the field map.
    #[must_use]
    pub const fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Number of fields, excluding the dirty flag.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record holds no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field map with the dirty flag re-emitted under [`DIRTY_KEY`] when set.
    #[must_use]
    pub fn to_fields(&self) -> Fields {
        let mut fields = self.fields.clone();
        if self.dirty {
            fields.insert(DIRTY_KEY.to_string(), Value::Bool(true));
        }
        fields
    }
}

impl From<Fields> for Record {
    fn from(fields: Fields) -> Self {
        Self::from_fields(fields)
    }
}

/// Raw input accepted by `load` and `refresh`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LoadPayload {
    /// One record per object.
    Rows(Vec<Fields>),
    /// A single record.
    Row(Fields),
    /// JSON text expected to decode to one of the shapes above.
    Text(String),
}

impl LoadPayload {
    /// Wrap JSON text.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Turn the payload into records without consuming it.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError`] when text does not decode, or decodes to a
    /// shape other than an object or an array of objects.
    pub fn decode(&self) -> Result<Vec<Record>, PayloadError> {
        match self {
            Self::Rows(rows) => Ok(rows.iter().cloned().map(Record::from_fields).collect()),
            Self::Row(row) => Ok(vec![Record::from_fields(row.clone())]),
            Self::Text(text) => Self::decode_text(text),
        }
    }

    /// Turn the payload into records, moving rows instead of copying them.
    /// On failure the payload is handed back alongside the error.
    ///
    /// # Errors
    ///
    /// As [`LoadPayload::decode`].
    pub fn into_records(self) -> Result<Vec<Record>, (PayloadError, Self)> {
        match self {
            Self::Rows(rows) => Ok(rows.into_iter().map(Record::from_fields).collect()),
            Self::Row(row) => Ok(vec![Record::from_fields(row)]),
            Self::Text(text) => match Self::decode_text(&text) {
                Ok(records) => Ok(records),
                Err(error) => Err((error, Self::Text(text))),
            },
        }
    }

    fn decode_text(text: &str) -> Result<Vec<Record>, PayloadError> {
        let value: Value =
            serde_json::from_str(text).map_err(|source| PayloadError::Decode { source })?;
        records_from_value(value)
    }
}

impl From<Vec<Fields>> for LoadPayload {
    fn from(rows: Vec<Fields>) -> Self {
        Self::Rows(rows)
    }
}

impl From<Fields> for LoadPayload {
    fn from(row: Fields) -> Self {
        Self::Row(row)
    }
}

impl From<String> for LoadPayload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for LoadPayload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl TryFrom<Value> for LoadPayload {
    type Error = PayloadError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(text) => Ok(Self::Text(text)),
            Value::Object(row) => Ok(Self::Row(row)),
            Value::Array(items) => rows_from_array(items).map(Self::Rows),
            other => Err(PayloadError::Shape {
                found: json_kind(&other),
            }),
        }
    }
}

fn records_from_value(value: Value) -> Result<Vec<Record>, PayloadError> {
    match value {
        Value::Object(row) => Ok(vec![Record::from_fields(row)]),
        Value::Array(items) => Ok(rows_from_array(items)?
            .into_iter()
            .map(Record::from_fields)
            .collect()),
        other => Err(PayloadError::Shape {
            found: json_kind(&other),
        }),
    }
}

fn rows_from_array(items: Vec<Value>) -> Result<Vec<Fields>, PayloadError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(row) => Ok(row),
            other => Err(PayloadError::RowShape {
                index,
                found: json_kind(&other),
            }),
        })
        .collect()
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
