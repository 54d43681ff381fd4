//! Error types for store operations.

use thiserror::Error;

use crate::column::ColumnRef;

/// Primary error type for store operations.
///
/// The first three variants mirror the outcomes widgets must tell apart:
/// a store that was never loaded, a loaded store without a current record,
/// and a column reference that does not name a declared column.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Navigation, read or write attempted before any load or new row.
    #[error("store has not been loaded")]
    Unloaded,
    /// Write attempted on a loaded store that holds no records.
    #[error("store has no current record")]
    NoCurrentRecord,
    /// Column index or name does not match a declared column.
    #[error("unknown column {column}")]
    UnknownColumn {
        /// Reference supplied by the caller.
        column: ColumnRef,
    },
    /// Sort requested without columns and none configured.
    #[error("no sort columns configured")]
    NoSortColumns,
    /// Sort algorithm name was not recognised.
    #[error("unknown sort algorithm '{value}'")]
    UnknownAlgorithm {
        /// Name supplied by the caller.
        value: String,
    },
    /// Sort direction name was not recognised.
    #[error("unknown sort direction '{value}'")]
    UnknownDirection {
        /// Name supplied by the caller.
        value: String,
    },
    /// Store options failed validation.
    #[error("invalid store option '{field}': {reason}")]
    InvalidOptions {
        /// Option that failed validation.
        field: &'static str,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// Store options could not be decoded.
    #[error("failed to decode store options")]
    Options {
        /// Source JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// Record set could not be serialised.
    #[error("failed to encode records")]
    Export {
        /// Source JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Reasons a load payload could not become a record set.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Text payload was not valid JSON.
    #[error("payload is not valid json")]
    Decode {
        /// Source JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// Payload decoded to something other than an object or array.
    #[error("payload must be an object or an array of objects, found {found}")]
    Shape {
        /// JSON kind that was found instead.
        found: &'static str,
    },
    /// An array payload held a non-object element.
    #[error("row {index} must be an object, found {found}")]
    RowShape {
        /// Position of the offending element.
        index: usize,
        /// JSON kind that was found instead.
        found: &'static str,
    },
}

/// Convenience alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;
