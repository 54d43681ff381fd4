//! Validation of store construction options.

use std::collections::HashSet;

use crate::compare::CompareMode;
use crate::error::{StoreError, StoreResult};
use crate::options::StoreOptions;
use crate::record::DIRTY_KEY;

/// Check options before a store is built from them.
///
/// # Errors
///
/// Returns [`StoreError::InvalidOptions`] naming the first offending field.
pub fn validate_options(options: &StoreOptions) -> StoreResult<()> {
    let mut seen = HashSet::new();
    for column in &options.columns {
        if column.name.trim().is_empty() {
            return Err(invalid("columns.name", None, "must not be empty"));
        }
        if column.name == DIRTY_KEY {
            return Err(invalid(
                "columns.name",
                Some(&column.name),
                "is reserved for the dirty flag",
            ));
        }
        if !seen.insert(column.name.as_str()) {
            return Err(invalid("columns.name", Some(&column.name), "is declared twice"));
        }
    }

    if options.compare_mode == CompareMode::Segmented && options.separator.is_empty() {
        return Err(invalid(
            "separator",
            None,
            "must not be empty in segmented compare mode",
        ));
    }

    if let Some(unknown) = options
        .sort_columns
        .iter()
        .find(|name| !seen.contains(name.as_str()))
    {
        return Err(invalid(
            "sort_columns",
            Some(unknown),
            "must name a declared column",
        ));
    }

    Ok(())
}

fn invalid(field: &'static str, value: Option<&str>, reason: &'static str) -> StoreError {
    StoreError::InvalidOptions {
        field,
        value: value.map(str::to_string),
        reason,
    }
}
