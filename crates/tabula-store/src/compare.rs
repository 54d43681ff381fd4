//! Per-type value comparisons used by the sort pipeline.
//!
//! # Design
//! - One comparison per [`ColumnType`], selected by `match`, never by name.
//! - Missing, null and unparseable values order first and compare equal to
//!   each other, so every comparison is a total order.
//! - Segments compare in natural order: runs of ASCII digits by value, ahead
//!   of any non-digit run at the same place. Mixing a numeric rule for some
//!   pairs with a string rule for others would not be transitive.
//! - Integers compare exactly; only non-integral values go through `f64`.

use std::borrow::Cow;
use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::column::ColumnType;

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// How alphanumeric values are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareMode {
    /// Split on the separator and compare component by component, each in
    /// natural order (`1.9` < `1.10`, `lib9` < `lib10`).
    #[default]
    Segmented,
    /// Plain ordinal string comparison.
    Lexical,
}

/// Comparison functions for every column type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparator {
    separator: String,
    mode: CompareMode,
}

impl Comparator {
    /// Build a comparator. An empty separator falls back to lexical mode.
    #[must_use]
    pub fn new(separator: impl Into<String>, mode: CompareMode) -> Self {
        let separator = separator.into();
        let mode = if separator.is_empty() {
            CompareMode::Lexical
        } else {
            mode
        };
        Self { separator, mode }
    }

    /// Separator used in segmented mode.
    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Active alphanumeric mode.
    #[must_use]
    pub const fn mode(&self) -> CompareMode {
        self.mode
    }

    /// Two-argument ordering function for a column type.
    pub fn for_type(
        &self,
        kind: ColumnType,
    ) -> impl Fn(Option<&Value>, Option<&Value>) -> Ordering + '_ {
        move |left: Option<&Value>, right: Option<&Value>| self.compare(kind, left, right)
    }

    /// Compare two cell values as the given column type.
    #[must_use]
    pub fn compare(&self, kind: ColumnType, left: Option<&Value>, right: Option<&Value>) -> Ordering {
        match kind {
            ColumnType::Alphanumeric => self.alphanumeric(left, right),
            ColumnType::Numeric => Self::numeric(left, right),
            ColumnType::Date => Self::date(left, right),
            ColumnType::Currency => Self::currency(left, right),
        }
    }

    /// Case-respecting ordinal comparison, segment-aware in segmented mode.
    #[must_use]
    pub fn alphanumeric(&self, left: Option<&Value>, right: Option<&Value>) -> Ordering {
        match (text_of(left), text_of(right)) {
            (Some(left), Some(right)) => match self.mode {
                CompareMode::Lexical => left.cmp(&right),
                CompareMode::Segmented => self.segmented(&left, &right),
            },
            (left, right) => left.is_some().cmp(&right.is_some()),
        }
    }

    /// Comparison by numeric value.
    #[must_use]
    pub fn numeric(left: Option<&Value>, right: Option<&Value>) -> Ordering {
        order_numbers(left.and_then(number_of), right.and_then(number_of))
    }

    /// Chronological comparison after parsing.
    #[must_use]
    pub fn date(left: Option<&Value>, right: Option<&Value>) -> Ordering {
        left.and_then(timestamp_of).cmp(&right.and_then(timestamp_of))
    }

    /// Numeric comparison after stripping currency formatting.
    #[must_use]
    pub fn currency(left: Option<&Value>, right: Option<&Value>) -> Ordering {
        order_numbers(left.and_then(amount_of), right.and_then(amount_of))
    }

    fn segmented(&self, left: &str, right: &str) -> Ordering {
        let mut left_parts = left.split(self.separator.as_str());
        let mut right_parts = right.split(self.separator.as_str());
        loop {
            match (left_parts.next(), right_parts.next()) {
                (None, None) => return Ordering::Equal,
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(l), Some(r)) => {
                    let ordering = compare_segment(l, r);
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
            }
        }
    }
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new(".", CompareMode::default())
    }
}

fn compare_segment(left: &str, right: &str) -> Ordering {
    let mut left_runs = runs(left);
    let mut right_runs = runs(right);
    loop {
        match (left_runs.next(), right_runs.next()) {
            (None, None) => return left.cmp(right),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ordering = compare_run(l, r);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

/// Maximal runs of ASCII digits and of everything else.
fn runs(segment: &str) -> impl Iterator<Item = &str> {
    let mut rest = segment;
    std::iter::from_fn(move || {
        let digits = rest.chars().next()?.is_ascii_digit();
        let end = rest
            .find(|c: char| c.is_ascii_digit() != digits)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(end);
        rest = tail;
        Some(run)
    })
}

fn compare_run(left: &str, right: &str) -> Ordering {
    match (is_digits(left), is_digits(right)) {
        (true, true) => {
            let l = left.trim_start_matches('0');
            let r = right.trim_start_matches('0');
            l.len().cmp(&r.len()).then_with(|| l.cmp(r))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => left.cmp(right),
    }
}

fn is_digits(run: &str) -> bool {
    !run.is_empty() && run.bytes().all(|b| b.is_ascii_digit())
}

/// A parsed numeric cell. Never NaN.
#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i128),
    Float(f64),
}

impl Number {
    fn from_json(number: &serde_json::Number) -> Option<Self> {
        number
            .as_i64()
            .map(|int| Self::Int(int.into()))
            .or_else(|| number.as_u64().map(|int| Self::Int(int.into())))
            .or_else(|| number.as_f64().map(Self::Float))
    }

    fn parse(text: &str) -> Option<Self> {
        if let Ok(int) = text.parse::<i128>() {
            return Some(Self::Int(int));
        }
        text.parse::<f64>()
            .ok()
            .filter(|float| !float.is_nan())
            .map(Self::Float)
    }

    fn compare(self, other: Self) -> Ordering {
        match (self, other) {
            (Self::Int(l), Self::Int(r)) => l.cmp(&r),
            (Self::Float(l), Self::Float(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
            (Self::Int(l), Self::Float(r)) => int_cmp_float(l, r),
            (Self::Float(l), Self::Int(r)) => int_cmp_float(r, l).reverse(),
        }
    }
}

/// Exact comparison of an integer with a non-NaN float.
#[allow(clippy::cast_possible_truncation)]
fn int_cmp_float(int: i128, float: f64) -> Ordering {
    let bound = 2_f64.powi(127);
    if float >= bound {
        return Ordering::Less;
    }
    if float < -bound {
        return Ordering::Greater;
    }
    let whole = float.trunc();
    int.cmp(&(whole as i128))
        .then_with(|| 0_f64.partial_cmp(&(float - whole)).unwrap_or(Ordering::Equal))
}

fn order_numbers(left: Option<Number>, right: Option<Number>) -> Ordering {
    match (left, right) {
        (Some(l), Some(r)) => l.compare(r),
        (l, r) => l.is_some().cmp(&r.is_some()),
    }
}

fn text_of(value: Option<&Value>) -> Option<Cow<'_, str>> {
    match value? {
        Value::Null => None,
        Value::String(text) => Some(Cow::Borrowed(text.as_str())),
        other => Some(Cow::Owned(other.to_string())),
    }
}

fn number_of(value: &Value) -> Option<Number> {
    match value {
        Value::Number(number) => Number::from_json(number),
        Value::String(text) => Number::parse(text.trim()),
        _ => None,
    }
}

fn amount_of(value: &Value) -> Option<Number> {
    match value {
        Value::Number(number) => Number::from_json(number),
        Value::String(text) => {
            let trimmed = text.trim();
            let negative = trimmed.contains('-')
                || (trimmed.starts_with('(') && trimmed.ends_with(')'));
            let digits: String = trimmed
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            let amount = Number::parse(&digits)?;
            Some(match (amount, negative) {
                (Number::Int(int), true) => Number::Int(-int),
                (Number::Float(float), true) => Number::Float(-float),
                (amount, false) => amount,
            })
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn timestamp_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|millis| millis as i64)),
        Value::String(text) => parse_timestamp(text.trim()),
        _ => None,
    }
}

fn parse_timestamp(text: &str) -> Option<i64> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.timestamp_millis());
    }
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed.and_utc().timestamp_millis());
        }
    }
    DATE_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(text, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|midnight| midnight.and_utc().timestamp_millis())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cmp(comparator: &Comparator, kind: ColumnType, left: &Value, right: &Value) -> Ordering {
        comparator.compare(kind, Some(left), Some(right))
    }

    #[test]
    fn alphanumeric_is_case_respecting() {
        let comparator = Comparator::new(".", CompareMode::Lexical);
        assert_eq!(
            cmp(&comparator, ColumnType::Alphanumeric, &json!("B"), &json!("a")),
            Ordering::Less
        );
        assert_eq!(
            cmp(&comparator, ColumnType::Alphanumeric, &json!("1.10"), &json!("1.9")),
            Ordering::Less
        );
    }

    #[test]
    fn segmented_mode_orders_components() {
        let comparator = Comparator::default();
        let ordered = ["1.2", "1.9", "1.10", "2", "2.0.1", "10.1"];
        for pair in ordered.windows(2) {
            assert_eq!(
                cmp(&comparator, ColumnType::Alphanumeric, &json!(pair[0]), &json!(pair[1])),
                Ordering::Less,
                "{} should sort before {}",
                pair[0],
                pair[1]
            );
        }
        assert_eq!(
            cmp(&comparator, ColumnType::Alphanumeric, &json!("a.b"), &json!("a.b")),
            Ordering::Equal
        );
    }

    #[test]
    fn custom_separator_is_honoured() {
        let comparator = Comparator::new("/", CompareMode::Segmented);
        assert_eq!(
            cmp(&comparator, ColumnType::Alphanumeric, &json!("usr/lib9"), &json!("usr/lib10")),
            Ordering::Less
        );
        assert_eq!(
            cmp(&comparator, ColumnType::Alphanumeric, &json!("v/9"), &json!("v/10")),
            Ordering::Less
        );
    }

    #[test]
    fn segments_compare_digit_runs_by_value_before_text() {
        let comparator = Comparator::default();
        let ordered = [
            "1.n", "1.nx", "1a", "9", "10", "n", "n01", "n1", "n2", "na", "nx",
        ];
        for pair in ordered.windows(2) {
            assert_eq!(
                cmp(&comparator, ColumnType::Alphanumeric, &json!(pair[0]), &json!(pair[1])),
                Ordering::Less,
                "{} should sort before {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn segmented_comparison_is_transitive() {
        let comparator = Comparator::default();
        let values: Vec<Value> = [
            "", "0", "00", "1", "01", "1a", "9", "10", "a", "a9", "a10", "n", "na", "nx", "1.n",
            "1.nx", "1.2", "1.10", "10.1", "n.1", "n.01", "9a", "z", "Z",
        ]
        .into_iter()
        .map(Value::from)
        .collect();
        let compare = comparator.for_type(ColumnType::Alphanumeric);
        for a in &values {
            assert_eq!(compare(Some(a), Some(a)), Ordering::Equal);
            for b in &values {
                assert_eq!(compare(Some(a), Some(b)), compare(Some(b), Some(a)).reverse());
                for c in &values {
                    if compare(Some(a), Some(b)) != Ordering::Greater
                        && compare(Some(b), Some(c)) != Ordering::Greater
                    {
                        assert_ne!(
                            compare(Some(a), Some(c)),
                            Ordering::Greater,
                            "{a} <= {b} <= {c}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn empty_separator_falls_back_to_lexical() {
        let comparator = Comparator::new("", CompareMode::Segmented);
        assert_eq!(comparator.mode(), CompareMode::Lexical);
    }

    #[test]
    fn numeric_accepts_numbers_and_numeric_strings() {
        let comparator = Comparator::default();
        assert_eq!(
            cmp(&comparator, ColumnType::Numeric, &json!(9), &json!("10")),
            Ordering::Less
        );
        assert_eq!(
            cmp(&comparator, ColumnType::Numeric, &json!(-1.5), &json!(-2)),
            Ordering::Greater
        );
    }

    #[test]
    fn integers_compare_exactly() {
        let comparator = Comparator::default();
        let numeric =
            |left: &Value, right: &Value| cmp(&comparator, ColumnType::Numeric, left, right);
        assert_eq!(
            numeric(&json!(9_007_199_254_740_993_i64), &json!(9_007_199_254_740_992_i64)),
            Ordering::Greater
        );
        assert_eq!(numeric(&json!(u64::MAX), &json!(u64::MAX - 1)), Ordering::Greater);
        assert_eq!(numeric(&json!(-1), &json!(u64::MAX)), Ordering::Less);
        assert_eq!(
            numeric(&json!("9007199254740993"), &json!(9_007_199_254_740_992_u64)),
            Ordering::Greater
        );
        assert_eq!(
            numeric(&json!(9_007_199_254_740_993_i64), &json!(9.007_199_254_740_992e15)),
            Ordering::Greater
        );
        assert_eq!(numeric(&json!(2), &json!(2.0)), Ordering::Equal);
        assert_eq!(numeric(&json!(-3), &json!(-2.5)), Ordering::Less);
        assert_eq!(numeric(&json!(0), &json!(-0.0)), Ordering::Equal);
    }

    #[test]
    fn missing_values_order_first() {
        let comparator = Comparator::default();
        let compare = comparator.for_type(ColumnType::Numeric);
        assert_eq!(compare(None, Some(&json!(0))), Ordering::Less);
        assert_eq!(compare(Some(&json!("abc")), Some(&json!(-5))), Ordering::Less);
        assert_eq!(compare(None, Some(&Value::Null)), Ordering::Equal);
        let alpha = comparator.for_type(ColumnType::Alphanumeric);
        assert_eq!(alpha(Some(&json!("")), None), Ordering::Greater);
    }

    #[test]
    fn dates_compare_chronologically_across_formats() {
        let comparator = Comparator::default();
        assert_eq!(
            cmp(&comparator, ColumnType::Date, &json!("12/31/2023"), &json!("2024-01-01")),
            Ordering::Less
        );
        assert_eq!(
            cmp(
                &comparator,
                ColumnType::Date,
                &json!("2024-01-01T10:00:00Z"),
                &json!("2024-01-01 09:00:00")
            ),
            Ordering::Greater
        );
        assert_eq!(
            cmp(&comparator, ColumnType::Date, &json!(0), &json!("1970-01-01")),
            Ordering::Equal
        );
    }

    #[test]
    fn currency_strips_formatting() {
        let comparator = Comparator::default();
        assert_eq!(
            cmp(&comparator, ColumnType::Currency, &json!("$1,250.00"), &json!("$999.99")),
            Ordering::Greater
        );
        assert_eq!(
            cmp(&comparator, ColumnType::Currency, &json!("($5.00)"), &json!("$1.00")),
            Ordering::Less
        );
        assert_eq!(
            cmp(&comparator, ColumnType::Currency, &json!("-$3"), &json!(-3)),
            Ordering::Equal
        );
    }
}
