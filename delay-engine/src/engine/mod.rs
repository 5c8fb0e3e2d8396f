//! The delay-resolution engine.
//!
//! Chains flow through four stages: [`ScheduleBackfill`] completes missing
//! expected times, [`DirectionalExtractor`] turns a chain into directional
//! observations, [`AlternativeTrainSearch`] optionally swaps in a faster
//! train and [`IncrementalMerger`] folds the result into a report.
//! [`DelayPipeline`] runs the stages over a batch of chains.

mod alternative;
mod backfill;
mod config;
mod extract;
mod merge;
mod pipeline;

pub use alternative::{AlternativeTrainSearch, CandidateSource};
pub use backfill::{Backfilled, ScheduleBackfill, ScheduleLookup};
pub use config::{
    ConfigError, ENV_LONG_DELAY, ENV_MIN_DELAY, ENV_STATION_A, ENV_STATION_B, EngineConfig,
};
pub use extract::{DirectionalExtractor, ExtractError};
pub use merge::{IncrementalMerger, MergeOutcome, MergeStats};
pub use pipeline::{DelayPipeline, RunSummary, UnitFailure};
