//! Batch processing of stop chains into a report.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::domain::{Observation, StopChain, StopKey, TrainId};
use crate::error::EngineError;
use crate::report::ReportSink;

use super::alternative::{AlternativeTrainSearch, CandidateSource};
use super::backfill::{ScheduleBackfill, ScheduleLookup};
use super::config::EngineConfig;
use super::extract::DirectionalExtractor;
use super::merge::{IncrementalMerger, MergeStats};

/// A chain that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFailure {
    pub train: TrainId,
    pub date: NaiveDate,
    pub error: EngineError,
}

/// What one pipeline run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Chains fully processed
    pub chains: usize,
    /// Stops removed by the backfill
    pub dropped_stops: Vec<StopKey>,
    /// Observations extracted before merging
    pub observations: usize,
    /// Observations replaced by a faster alternative train
    pub alternatives: usize,
    pub merge: MergeStats,
    /// Chains aborted on an invariant violation
    pub failures: Vec<UnitFailure>,
}

/// Runs backfill, extraction, alternative search and merge over chains.
pub struct DelayPipeline<'a, L: ScheduleLookup, C: CandidateSource> {
    config: &'a EngineConfig,
    backfill: ScheduleBackfill<'a, L>,
    search: AlternativeTrainSearch<'a, C>,
}

impl<'a, L: ScheduleLookup, C: CandidateSource> DelayPipeline<'a, L, C> {
    pub fn new(config: &'a EngineConfig, schedule: &'a L, candidates: &'a C) -> Self {
        Self {
            config,
            backfill: ScheduleBackfill::new(schedule),
            search: AlternativeTrainSearch::new(candidates),
        }
    }

    /// Turn one chain into the observations to merge.
    ///
    /// Returns the observations along with the stops the backfill dropped.
    pub fn process_chain(
        &self,
        chain: &StopChain,
    ) -> Result<(Vec<Observation>, Vec<StopKey>), EngineError> {
        let extractor = DirectionalExtractor::new(self.config);
        let anchor = extractor
            .anchors(chain)
            .first()
            .copied()
            .unwrap_or_else(|| chain.first());

        let backfilled = self.backfill.backfill(chain, anchor)?;
        let Some(completed) = backfilled.chain else {
            debug!(train = %chain.train(), "no stop left after backfill");
            return Ok((Vec::new(), backfilled.dropped));
        };

        let mut observations = extractor.extract_all(&completed)?;
        if self.config.search_alternatives {
            for observation in &mut observations {
                *observation = self.search.search(observation);
            }
        }

        Ok((observations, backfilled.dropped))
    }

    /// Process every chain and merge the results into `sink`.
    ///
    /// A chain failing on an invariant violation is recorded in the summary
    /// and skipped.
    pub fn run<S: ReportSink>(
        &self,
        chains: impl IntoIterator<Item = StopChain>,
        sink: &mut S,
    ) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut merger = IncrementalMerger::new(sink);

        for chain in chains {
            match self.process_chain(&chain) {
                Ok((observations, dropped)) => {
                    summary.chains += 1;
                    summary.dropped_stops.extend(dropped);
                    summary.observations += observations.len();
                    summary.alternatives += observations
                        .iter()
                        .filter(|o| o.effective_train != o.expected_train)
                        .count();

                    let stats = merger.merge_all(observations);
                    summary.merge.appended += stats.appended;
                    summary.merge.inserted += stats.inserted;
                    summary.merge.replaced += stats.replaced;
                    summary.merge.discarded += stats.discarded;
                }
                Err(error) => {
                    warn!(
                        train = %chain.train(),
                        date = %chain.date(),
                        %error,
                        "skipping chain"
                    );
                    summary.failures.push(UnitFailure {
                        train: chain.train().clone(),
                        date: chain.date(),
                        error,
                    });
                }
            }
        }

        info!(
            chains = summary.chains,
            observations = summary.observations,
            alternatives = summary.alternatives,
            changed = summary.merge.changed(),
            failed = summary.failures.len(),
            "pipeline run complete"
        );
        summary
    }
}
