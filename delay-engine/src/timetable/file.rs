//! File-backed timetable.
//!
//! Loads observed runs and the planned schedule from a JSON document and
//! serves them to the engine as a [`ScheduleLookup`] and a
//! [`CandidateSource`]. Useful for fixtures, replays and tests.

use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, warn};

use crate::domain::{Station, Stop, StopChain, TrainId, compare_times};
use crate::engine::{CandidateSource, ScheduleLookup};

use super::convert::convert_run;
use super::error::TimetableError;
use super::types::{RunRecord, TimetableFile};

/// Runs and schedule loaded from a timetable document.
#[derive(Debug, Clone, Default)]
pub struct JsonTimetable {
    runs: Vec<StopChain>,
    schedule: Vec<StopChain>,
}

impl JsonTimetable {
    /// Load a timetable from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TimetableError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TimetableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let timetable = Self::from_json(&json)?;
        debug!(
            path = %path.display(),
            runs = timetable.runs.len(),
            schedule = timetable.schedule.len(),
            "loaded timetable"
        );
        Ok(timetable)
    }

    pub fn from_json(json: &str) -> Result<Self, TimetableError> {
        let file: TimetableFile = serde_json::from_str(json)?;
        Ok(Self::from_file(&file))
    }

    /// Convert a parsed document, skipping runs that fail to convert.
    pub fn from_file(file: &TimetableFile) -> Self {
        Self {
            runs: convert_all(&file.runs, "run"),
            schedule: convert_all(&file.schedule, "schedule"),
        }
    }

    /// Observed runs, in document order.
    pub fn runs(&self) -> &[StopChain] {
        &self.runs
    }

    pub fn schedule(&self) -> &[StopChain] {
        &self.schedule
    }

    pub fn into_runs(self) -> Vec<StopChain> {
        self.runs
    }
}

fn convert_all(records: &[RunRecord], kind: &'static str) -> Vec<StopChain> {
    records
        .iter()
        .filter_map(|record| match convert_run(record) {
            Ok(chain) => Some(chain),
            Err(e) => {
                warn!(
                    kind,
                    train = %record.train,
                    date = %record.date,
                    error = %e,
                    "skipping invalid run"
                );
                None
            }
        })
        .collect()
}

impl ScheduleLookup for JsonTimetable {
    /// The first planned, uncancelled stop of `train` at `station`.
    ///
    /// A stop carrying both expected times is preferred over one that only
    /// has one of them.
    fn find_scheduled_stop(&self, train: &TrainId, station: &Station) -> Option<Stop> {
        let mut planned = self
            .schedule
            .iter()
            .filter(|chain| chain.train() == train)
            .flat_map(|chain| chain.stops())
            .filter(|stop| &stop.station == station && !stop.is_cancelled());

        let first = planned.next()?;
        if !first.lacks_expected_time() {
            return Some(first.clone());
        }
        Some(
            planned
                .find(|stop| !stop.lacks_expected_time())
                .unwrap_or(first)
                .clone(),
        )
    }
}

impl CandidateSource for JsonTimetable {
    /// Observed runs calling at `station` on `date` with an expected arrival
    /// strictly after `after`, earliest expected arrival first.
    fn find_chains_arriving_after(
        &self,
        station: &Station,
        date: NaiveDate,
        after: NaiveTime,
    ) -> Vec<StopChain> {
        let mut found: Vec<(NaiveTime, &StopChain)> = self
            .runs
            .iter()
            .filter(|chain| chain.date() == date)
            .filter_map(|chain| {
                let id = chain.position_of(station)?;
                let expected = chain.get(id)?.arrival.expected?;
                (expected > after).then_some((expected, chain))
            })
            .collect();

        found.sort_by(|a, b| compare_times(Some(a.0), Some(b.0)));
        found.into_iter().map(|(_, chain)| chain.clone()).collect()
    }
}
