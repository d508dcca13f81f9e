//! Typed row sorting
//!
//! Keys are extracted once per row, converted according to the column's sort
//! type and then stably sorted. Keys that fail to parse as numbers or dates
//! sort after every valid key and keep their input order among themselves.
//! Text is ordered with the root locale's collation, lowercase first.

use super::field::{ColumnValue, Field, SortKey, SortType};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use icu_collator::{CaseFirst, Collator, CollatorOptions, Strength};
use serde::Serialize;
use std::cmp::Ordering;

/// Sort rows by a column, returning a new ordering that borrows the input
///
/// # Panics
///
/// A bool sort on a computed column needs a `sort_value`; anything else is a
/// malformed column definition.
pub fn sort_rows<'a, T: Serialize>(rows: &'a [T], field: &Field<T>) -> Vec<&'a T> {
    assert!(
        !(field.sort_type == Some(SortType::Bool)
            && matches!(field.value, ColumnValue::Computed(_))
            && field.sort_value.is_none()),
        "column '{}' sorts as bool but only renders text; provide a sort_value",
        field.label
    );

    let sort_type = field.sort_type.unwrap_or(SortType::String);
    let collator = match sort_type {
        SortType::String => text_collator(),
        _ => None,
    };
    let mut keyed: Vec<(Comparable, &T)> = rows
        .iter()
        .map(|row| (Comparable::new(field.sort_key(row), sort_type), row))
        .collect();

    // sort_by is stable
    keyed.sort_by(|a, b| a.0.compare(&b.0, collator.as_ref()));
    keyed.into_iter().map(|(_, row)| row).collect()
}

/// Root locale collation at tertiary strength, lowercase before uppercase
fn text_collator() -> Option<Collator> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Tertiary);
    options.case_first = Some(CaseFirst::LowerFirst);
    match Collator::try_new(&Default::default(), options) {
        Ok(collator) => Some(collator),
        Err(e) => {
            tracing::warn!("No collation data, ordering text by code point: {}", e);
            None
        }
    }
}

/// Active sort column and direction of an interactive table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSort {
    column: usize,
    reversed: bool,
}

impl TableSort {
    /// Ascending on the default column
    pub fn new(default_column: usize) -> Self {
        Self {
            column: default_column,
            reversed: false,
        }
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub fn set_reversed(&mut self, reversed: bool) {
        self.reversed = reversed;
    }

    /// Handle a click on a column header
    ///
    /// Re-selecting the active column flips the direction, a new column starts
    /// ascending. Returns false for columns that are out of range or not sortable.
    pub fn select<T>(&mut self, fields: &[Field<T>], column: usize) -> bool {
        match fields.get(column) {
            Some(field) if field.is_sortable() => {
                if column == self.column {
                    self.reversed = !self.reversed;
                } else {
                    self.column = column;
                    self.reversed = false;
                }
                true
            }
            _ => false,
        }
    }

    /// Rows in display order
    pub fn apply<'a, T: Serialize>(&self, rows: &'a [T], fields: &[Field<T>]) -> Vec<&'a T> {
        let mut sorted = match fields.get(self.column) {
            Some(field) => sort_rows(rows, field),
            None => rows.iter().collect(),
        };
        if self.reversed {
            sorted.reverse();
        }
        sorted
    }
}

/// A key converted for comparison under one sort type
#[derive(Debug, Clone)]
enum Comparable {
    Number(f64),
    Date(i64),
    Bool(bool),
    Text(String),
    Unparseable,
}

impl Comparable {
    fn new(key: SortKey, sort_type: SortType) -> Self {
        match sort_type {
            SortType::Number => match key {
                SortKey::Number(n) if !n.is_nan() => Comparable::Number(n),
                SortKey::Text(s) => match s.trim().parse::<f64>() {
                    Ok(n) if !n.is_nan() => Comparable::Number(n),
                    _ => Comparable::Unparseable,
                },
                _ => Comparable::Unparseable,
            },
            SortType::Date => match key {
                SortKey::Text(s) => parse_timestamp(&s)
                    .map(Comparable::Date)
                    .unwrap_or(Comparable::Unparseable),
                SortKey::Number(n) if n.is_finite() => Comparable::Date(n as i64),
                _ => Comparable::Unparseable,
            },
            SortType::Bool => match key {
                SortKey::Bool(b) => Comparable::Bool(b),
                SortKey::Text(s) if s == "true" => Comparable::Bool(true),
                SortKey::Text(s) if s == "false" => Comparable::Bool(false),
                _ => Comparable::Unparseable,
            },
            SortType::String => Comparable::Text(key.as_text()),
        }
    }

    /// Total order over keys of one column
    ///
    /// Collation-equal text falls back to code point order so distinct
    /// strings never tie.
    fn compare(&self, other: &Self, collator: Option<&Collator>) -> Ordering {
        match (self, other) {
            (Comparable::Number(a), Comparable::Number(b)) => a.total_cmp(b),
            (Comparable::Date(a), Comparable::Date(b)) => a.cmp(b),
            (Comparable::Bool(a), Comparable::Bool(b)) => a.cmp(b),
            (Comparable::Text(a), Comparable::Text(b)) => collator
                .map_or(Ordering::Equal, |c| c.compare(a, b))
                .then_with(|| a.cmp(b)),
            (Comparable::Unparseable, Comparable::Unparseable) => Ordering::Equal,
            (Comparable::Unparseable, _) => Ordering::Greater,
            (_, Comparable::Unparseable) => Ordering::Less,
            // Keys of one column share a sort type
            _ => Ordering::Equal,
        }
    }
}

/// Milliseconds since the epoch for the date formats the API and users produce
fn parse_timestamp(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.timestamp_millis());
    }
    if let Ok(t) = DateTime::parse_from_rfc2822(s) {
        return Some(t.timestamp_millis());
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(t.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc().timestamp_millis())
}
