//! Delay reports.
//!
//! A report is an ordered list of observations, sorted by date and then by
//! station pair, holding at most one row per (date, departure, arrival).
//! The engine only ever scans a report forward, replaces a row in place,
//! inserts a row or appends one; it never reorders or rewrites it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Observation, observation_order};

/// An ordered, scannable store of report rows.
///
/// Implementations may be backed by memory or by an external document.
/// Writers must be serialized by the caller; taking `&mut self` for every
/// write keeps a single writer per sink.
pub trait ReportSink {
    /// Number of rows.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row at `index`, if any.
    fn get(&self, index: usize) -> Option<&Observation>;

    /// Replace the row at `index`, returning the previous row.
    fn replace(&mut self, index: usize, observation: Observation) -> Option<Observation>;

    /// Insert a row before `index`.
    fn insert(&mut self, index: usize, observation: Observation);

    /// Add a row at the end.
    fn append(&mut self, observation: Observation);
}

/// Which side of a date to keep when splitting a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSplit {
    /// Rows strictly before the threshold date
    Before,
    /// Rows on or after the threshold date
    OnOrAfter,
}

/// In-memory report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report {
    rows: Vec<Observation>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap existing rows, kept in the given order.
    pub fn from_rows(rows: Vec<Observation>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Observation> {
        self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.rows.iter()
    }

    /// Returns true if the rows are in report order.
    pub fn is_sorted(&self) -> bool {
        self.rows
            .windows(2)
            .all(|w| observation_order(&w[0], &w[1]).is_le())
    }

    /// A copy of this report without cancelled rows.
    pub fn without_cancelled(&self) -> Report {
        self.filtered(|row| !row.cancelled)
    }

    /// A copy of this report keeping only the rows on one side of `threshold`.
    ///
    /// # Examples
    ///
    /// ```
    /// use delay_engine::report::{DateSplit, Report};
    /// use chrono::NaiveDate;
    ///
    /// let report = Report::new();
    /// let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    /// assert!(report.split_by_date(date, DateSplit::Before).rows().is_empty());
    /// ```
    pub fn split_by_date(&self, threshold: NaiveDate, split: DateSplit) -> Report {
        self.filtered(|row| match split {
            DateSplit::Before => row.date < threshold,
            DateSplit::OnOrAfter => row.date >= threshold,
        })
    }

    /// Rows delayed by at least `min_delay_mins` minutes.
    pub fn long_delays(&self, min_delay_mins: i64) -> Vec<&Observation> {
        self.rows
            .iter()
            .filter(|row| row.delay_mins >= min_delay_mins)
            .collect()
    }

    fn filtered(&self, keep: impl Fn(&Observation) -> bool) -> Report {
        Report {
            rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
        }
    }

    /// Serialize the report as a JSON array of rows.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl ReportSink for Report {
    fn len(&self) -> usize {
        self.rows.len()
    }

    fn get(&self, index: usize) -> Option<&Observation> {
        self.rows.get(index)
    }

    fn replace(&mut self, index: usize, observation: Observation) -> Option<Observation> {
        let slot = self.rows.get_mut(index)?;
        Some(std::mem::replace(slot, observation))
    }

    fn insert(&mut self, index: usize, observation: Observation) {
        let index = index.min(self.rows.len());
        self.rows.insert(index, observation);
    }

    fn append(&mut self, observation: Observation) {
        self.rows.push(observation);
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
