//! Timetable file DTOs.
//!
//! These types map directly to the JSON timetable document. Times are
//! `"HH:MM"` strings and are only validated during conversion, so one bad
//! run does not prevent the rest of the file from loading.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A whole timetable document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableFile {
    /// Observed runs: what actually happened on each train/day.
    #[serde(default)]
    pub runs: Vec<RunRecord>,

    /// Planned runs, used to recover missing expected times.
    #[serde(default)]
    pub schedule: Vec<RunRecord>,
}

/// One train on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Train number, e.g. `"IC 466"`.
    pub train: String,

    pub date: NaiveDate,

    /// Stops in travel order.
    pub stops: Vec<StopRecord>,
}

/// One halt of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopRecord {
    pub station: String,

    /// Expected arrival (`"HH:MM"`), absent at the origin or when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival: Option<String>,

    /// Arrival delay in minutes.
    #[serde(default)]
    pub arrival_delay: i64,

    /// Expected departure (`"HH:MM"`), absent at the terminus or when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure: Option<String>,

    /// Departure delay in minutes.
    #[serde(default)]
    pub departure_delay: i64,

    #[serde(default)]
    pub arrival_cancelled: bool,

    #[serde(default)]
    pub departure_cancelled: bool,
}
