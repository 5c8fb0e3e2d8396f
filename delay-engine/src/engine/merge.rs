//! Incremental merge of observations into a report.
//!
//! The report keeps at most one row per (date, departure, arrival) key,
//! holding the greatest delay seen for that key. Each incoming observation
//! scans the report forward from the first row:
//!
//! - a row with the same key ends the scan: it is replaced if the incoming
//!   delay is strictly greater, otherwise the incoming observation is dropped;
//! - a row dated after the incoming observation ends the scan: the
//!   observation is inserted before it;
//! - reaching the end appends the observation.
//!
//! Merging the same observation twice is a no-op.

use tracing::{debug, trace};

use crate::domain::Observation;
use crate::report::ReportSink;

/// What a merge did to the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Added at the end, at this index
    Appended(usize),
    /// Inserted before a later-dated row, at this index
    Inserted(usize),
    /// Replaced the row with the same key, at this index
    Replaced(usize),
    /// The row with the same key, at this index, already had an equal or greater delay
    Discarded(usize),
}

impl MergeOutcome {
    /// Returns true if the report changed.
    pub fn changed(&self) -> bool {
        !matches!(self, MergeOutcome::Discarded(_))
    }
}

/// Counts of merge outcomes over a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub appended: usize,
    pub inserted: usize,
    pub replaced: usize,
    pub discarded: usize,
}

impl MergeStats {
    fn record(&mut self, outcome: MergeOutcome) {
        match outcome {
            MergeOutcome::Appended(_) => self.appended += 1,
            MergeOutcome::Inserted(_) => self.inserted += 1,
            MergeOutcome::Replaced(_) => self.replaced += 1,
            MergeOutcome::Discarded(_) => self.discarded += 1,
        }
    }

    /// Number of merges that changed the report.
    pub fn changed(&self) -> usize {
        self.appended + self.inserted + self.replaced
    }
}

/// Merges observations into a report sink.
///
/// Holds the only mutable borrow of the sink for its lifetime.
pub struct IncrementalMerger<'a, S: ReportSink> {
    sink: &'a mut S,
}

impl<'a, S: ReportSink> IncrementalMerger<'a, S> {
    pub fn new(sink: &'a mut S) -> Self {
        Self { sink }
    }

    /// Merge one observation.
    pub fn merge(&mut self, observation: Observation) -> MergeOutcome {
        for index in 0..self.sink.len() {
            let Some(existing) = self.sink.get(index) else {
                break;
            };

            if existing.same_key(&observation) {
                if observation.delay_mins > existing.delay_mins {
                    debug!(
                        index,
                        old = existing.delay_mins,
                        new = observation.delay_mins,
                        "replacing row with greater delay"
                    );
                    self.sink.replace(index, observation);
                    return MergeOutcome::Replaced(index);
                }
                trace!(index, %observation, "row already holds an equal or greater delay");
                return MergeOutcome::Discarded(index);
            }

            if existing.date > observation.date {
                debug!(index, %observation, "inserting row");
                self.sink.insert(index, observation);
                return MergeOutcome::Inserted(index);
            }
        }

        let index = self.sink.len();
        debug!(index, %observation, "appending row");
        self.sink.append(observation);
        MergeOutcome::Appended(index)
    }

    /// Merge a batch of observations in order.
    pub fn merge_all(&mut self, observations: impl IntoIterator<Item = Observation>) -> MergeStats {
        let mut stats = MergeStats::default();
        for observation in observations {
            stats.record(self.merge(observation));
        }
        stats
    }
}
