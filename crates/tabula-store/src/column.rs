//! Column descriptors and column reference resolution.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Value type declared for a column. Selects the comparison used when the
/// column takes part in a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Text compared ordinally, optionally segment by segment.
    Alphanumeric,
    /// Numbers or numeric strings.
    Numeric,
    /// Dates and timestamps.
    Date,
    /// Formatted money amounts such as `$1,250.00`.
    Currency,
}

impl ColumnType {
    /// Render the type as its lowercase configuration name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alphanumeric => "alphanumeric",
            Self::Numeric => "numeric",
            Self::Date => "date",
            Self::Currency => "currency",
        }
    }
}

impl FromStr for ColumnType {
    type Err = StoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "alphanumeric" => Ok(Self::Alphanumeric),
            "numeric" => Ok(Self::Numeric),
            "date" => Ok(Self::Date),
            "currency" => Ok(Self::Currency),
            _ => Err(StoreError::InvalidOptions {
                field: "columns.type",
                value: Some(value.to_string()),
                reason: "unknown column type",
            }),
        }
    }
}

/// Named, typed field descriptor declared when the store is configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Field name used as the record key.
    pub name: String,
    /// Declared value type.
    #[serde(rename = "type")]
    pub kind: ColumnType,
}

impl Column {
    /// Build a column descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ColumnType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Caller-side reference to a column: zero-based position or name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnRef {
    /// Position in the store's column list.
    Index(usize),
    /// Column name.
    Name(String),
}

impl From<usize> for ColumnRef {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for ColumnRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for ColumnRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&String> for ColumnRef {
    fn from(name: &String) -> Self {
        Self::Name(name.clone())
    }
}

impl From<&Column> for ColumnRef {
    fn from(column: &Column) -> Self {
        Self::Name(column.name.clone())
    }
}

impl Display for ColumnRef {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(formatter, "#{index}"),
            Self::Name(name) => write!(formatter, "'{name}'"),
        }
    }
}

/// Resolve a reference against a column list. Names match the first column
/// declared with that name.
///
/// # Errors
///
/// Returns [`StoreError::UnknownColumn`] when the index is out of range or
/// no column carries the name.
pub fn resolve<'a>(columns: &'a [Column], column: &ColumnRef) -> StoreResult<&'a Column> {
    let found = match column {
        ColumnRef::Index(index) => columns.get(*index),
        ColumnRef::Name(name) => columns.iter().find(|candidate| candidate.name == *name),
    };
    found.ok_or_else(|| StoreError::UnknownColumn {
        column: column.clone(),
    })
}
