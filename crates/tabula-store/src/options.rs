//! Store construction options.
//!
//! # Design
//! - Options deserialize from JSON with serde defaults for every field but
//!   `columns`, and reject unknown keys.
//! - Validation lives in [`crate::validate`] and runs both from
//!   [`StoreOptions::from_json`] and from [`crate::RecordStore::new`].

use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::compare::CompareMode;
use crate::error::{StoreError, StoreResult};
use crate::sort::SortAlgorithm;
use crate::validate::validate_options;

/// Default hierarchical separator for segmented comparisons.
pub const DEFAULT_SEPARATOR: &str = ".";

/// Everything needed to build a [`crate::RecordStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreOptions {
    /// Identifier carried in every event snapshot.
    pub id: Option<String>,
    /// Column descriptors in display order.
    pub columns: Vec<Column>,
    /// Algorithm used when a sort request does not name one.
    pub default_sort: SortAlgorithm,
    /// Separator for segmented alphanumeric comparison.
    pub separator: String,
    /// Alphanumeric comparison mode.
    pub compare_mode: CompareMode,
    /// Initial sort columns, primary first.
    pub sort_columns: Vec<String>,
    /// Events kept for [`crate::RecordStore::backlog_since`]. Zero keeps
    /// none, so load payloads are released once handlers return.
    pub replay_capacity: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            id: None,
            columns: Vec::new(),
            default_sort: SortAlgorithm::default(),
            separator: DEFAULT_SEPARATOR.to_string(),
            compare_mode: CompareMode::default(),
            sort_columns: Vec::new(),
            replay_capacity: 0,
        }
    }
}

impl StoreOptions {
    /// Options with the given columns and defaults everywhere else.
    #[must_use]
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    /// Set the store identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the default algorithm.
    #[must_use]
    pub const fn with_default_sort(mut self, algorithm: SortAlgorithm) -> Self {
        self.default_sort = algorithm;
        self
    }

    /// Set the comparison separator.
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Set the alphanumeric comparison mode.
    #[must_use]
    pub const fn with_compare_mode(mut self, mode: CompareMode) -> Self {
        self.compare_mode = mode;
        self
    }

    /// Set the initial sort columns.
    #[must_use]
    pub fn with_sort_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sort_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Keep the last `capacity` events for replay.
    #[must_use]
    pub const fn with_replay_capacity(mut self, capacity: usize) -> Self {
        self.replay_capacity = capacity;
        self
    }

    /// Decode and validate options from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Options`] when the text does not decode and
    /// [`StoreError::InvalidOptions`] when validation fails.
    pub fn from_json(text: &str) -> StoreResult<Self> {
        let options: Self =
            serde_json::from_str(text).map_err(|source| StoreError::Options { source })?;
        options.validate()?;
        Ok(options)
    }

    /// Validate the options.
    ///
    /// # Errors
    ///
    /// See [`validate_options`].
    pub fn validate(&self) -> StoreResult<()> {
        validate_options(self)
    }
}
