//! Sorting strategies and sort requests.
//!
//! # Design
//! - [`SortAlgorithm`] is the strategy family; it implements [`Sorter`] so
//!   the store never looks algorithms up by free-form name.
//! - Strategies take ownership of the sequence and hand back the ordered
//!   sequence, matching the store's wholesale replacement of its records.
//! - Merge, heap and native are stable. Quick is not.

mod heap;
mod merge;
mod quick;

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::column::ColumnRef;
use crate::error::StoreError;
use crate::record::Record;

/// Ordering capability shared by every sorting strategy.
pub trait Sorter {
    /// Return `items` in non-decreasing `compare` order.
    fn sort_by<T, F>(&self, items: Vec<T>, compare: F) -> Vec<T>
    where
        F: FnMut(&T, &T) -> Ordering;
}

/// Built-in sorting strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortAlgorithm {
    /// Three-way quicksort. Equal keys may be reordered.
    Quick,
    /// Top-down merge sort.
    #[default]
    Merge,
    /// Heapsort with an input-position tie-break.
    Heap,
    /// The standard library's stable sort.
    Native,
}

impl SortAlgorithm {
    /// Every strategy, in declaration order.
    pub const ALL: [Self; 4] = [Self::Quick, Self::Merge, Self::Heap, Self::Native];

    /// Configuration name of the strategy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Merge => "merge",
            Self::Heap => "heap",
            Self::Native => "native",
        }
    }

    /// Whether equal keys keep their input order.
    #[must_use]
    pub const fn is_stable(self) -> bool {
        !matches!(self, Self::Quick)
    }
}

impl Sorter for SortAlgorithm {
    fn sort_by<T, F>(&self, mut items: Vec<T>, mut compare: F) -> Vec<T>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        match self {
            Self::Quick => {
                quick::sort_by(&mut items, &mut compare);
                items
            }
            Self::Merge => merge::sort_by(items, &mut compare),
            Self::Heap => heap::sort_by(items, &mut compare),
            Self::Native => {
                items.sort_by(compare);
                items
            }
        }
    }
}

impl Display for SortAlgorithm {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for SortAlgorithm {
    type Err = StoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str() == value)
            .ok_or_else(|| StoreError::UnknownAlgorithm {
                value: value.to_string(),
            })
    }
}

/// Direction applied after the grouped sort completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Non-decreasing order.
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    /// The ascending result reversed as a whole.
    #[serde(rename = "desc")]
    Descending,
}

impl FromStr for SortDirection {
    type Err = StoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "asc" => Ok(Self::Ascending),
            "desc" => Ok(Self::Descending),
            _ => Err(StoreError::UnknownDirection {
                value: value.to_string(),
            }),
        }
    }
}

/// A sort request.
///
/// The default request re-sorts by the store's configured sort columns with
/// its default algorithm, ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    /// Columns to sort by, primary first. `None` uses the configured list.
    pub columns: Option<Vec<ColumnRef>>,
    /// Strategy override. `None` uses the store default.
    pub algorithm: Option<SortAlgorithm>,
    /// Final direction.
    pub direction: SortDirection,
}

impl SortSpec {
    /// Sort by several columns, primary first.
    #[must_use]
    pub fn by<I, C>(columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ColumnRef>,
    {
        Self {
            columns: Some(columns.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Sort by a single column.
    #[must_use]
    pub fn column(column: impl Into<ColumnRef>) -> Self {
        Self {
            columns: Some(vec![column.into()]),
            ..Self::default()
        }
    }

    /// Override the algorithm.
    #[must_use]
    pub const fn using(mut self, algorithm: SortAlgorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    /// Set the direction.
    #[must_use]
    pub const fn direction(mut self, direction: SortDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Reverse the final order.
    #[must_use]
    pub const fn descending(self) -> Self {
        self.direction(SortDirection::Descending)
    }
}

/// Sort records by one column's values.
pub fn sort_records<S, C>(sorter: &S, records: Vec<Record>, column: &str, compare: C) -> Vec<Record>
where
    S: Sorter,
    C: Fn(Option<&Value>, Option<&Value>) -> Ordering,
{
    sorter.sort_by(records, |left: &Record, right: &Record| {
        compare(left.get(column), right.get(column))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shuffled() -> Vec<(u8, usize)> {
        // (key, input position)
        [4_u8, 1, 3, 1, 0, 4, 2, 3, 1, 0, 2, 4]
            .into_iter()
            .enumerate()
            .map(|(position, key)| (key, position))
            .collect()
    }

    #[test]
    fn every_algorithm_orders_the_same_multiset() {
        let mut expected: Vec<u8> = shuffled().into_iter().map(|(key, _)| key).collect();
        expected.sort_unstable();
        for algorithm in SortAlgorithm::ALL {
            let sorted: Vec<u8> = algorithm
                .sort_by(shuffled(), |a, b| a.0.cmp(&b.0))
                .into_iter()
                .map(|(key, _)| key)
                .collect();
            assert_eq!(sorted, expected, "{algorithm}");
        }
    }

    #[test]
    fn stable_algorithms_keep_tie_order() {
        for algorithm in SortAlgorithm::ALL.into_iter().filter(|a| a.is_stable()) {
            let sorted = algorithm.sort_by(shuffled(), |a, b| a.0.cmp(&b.0));
            for pair in sorted.windows(2) {
                if pair[0].0 == pair[1].0 {
                    assert!(pair[0].1 < pair[1].1, "{algorithm} reordered ties");
                }
            }
        }
        assert!(!SortAlgorithm::Quick.is_stable());
    }

    #[test]
    fn algorithm_names_round_trip() {
        for algorithm in SortAlgorithm::ALL {
            assert_eq!(algorithm.as_str().parse::<SortAlgorithm>().unwrap(), algorithm);
        }
        assert!(matches!(
            "bogo".parse::<SortAlgorithm>(),
            Err(StoreError::UnknownAlgorithm { value }) if value == "bogo"
        ));
        assert_eq!(SortAlgorithm::default(), SortAlgorithm::Merge);
        assert_eq!(
            serde_json::from_str::<SortAlgorithm>("\"heap\"").unwrap(),
            SortAlgorithm::Heap
        );
    }

    #[test]
    fn direction_parses_asc_and_desc() {
        assert_eq!("asc".parse::<SortDirection>().unwrap(), SortDirection::Ascending);
        assert_eq!("desc".parse::<SortDirection>().unwrap(), SortDirection::Descending);
        assert!("down".parse::<SortDirection>().is_err());
        assert_eq!(
            serde_json::to_string(&SortDirection::Descending).unwrap(),
            "\"desc\""
        );
    }

    #[test]
    fn spec_builders_compose() {
        let spec = SortSpec::by(["last", "first"])
            .using(SortAlgorithm::Heap)
            .descending();
        assert_eq!(
            spec.columns,
            Some(vec![ColumnRef::from("last"), ColumnRef::from("first")])
        );
        assert_eq!(spec.algorithm, Some(SortAlgorithm::Heap));
        assert_eq!(spec.direction, SortDirection::Descending);
        assert_eq!(SortSpec::column(1_usize).columns, Some(vec![ColumnRef::Index(1)]));
        assert!(SortSpec::default().columns.is_none());
    }

    #[test]
    fn sort_records_reads_the_named_field() {
        let records: Vec<Record> = [3, 1, 2]
            .into_iter()
            .map(|n| {
                let mut record = Record::new();
                let _ = record.set("n", json!(n));
                record
            })
            .collect();
        let sorted = sort_records(&SortAlgorithm::Native, records, "n", |l, r| {
            l.and_then(Value::as_i64).cmp(&r.and_then(Value::as_i64))
        });
        let keys: Vec<_> = sorted.iter().map(|r| r.get("n").cloned()).collect();
        assert_eq!(keys, vec![Some(json!(1)), Some(json!(2)), Some(json!(3))]);
    }
}
