//! Domain types for the delay engine.
//!
//! This module contains the core domain model: stations, trains, stop
//! times, stop chains and the observations derived from them. Identifiers
//! and chains enforce their invariants at construction time, so code that
//! receives these types can trust their validity.

mod chain;
mod observation;
mod station;
mod stop;
mod time;
mod train;

pub use chain::{ChainError, StopChain, StopId, Traversal};
pub use observation::{Direction, Observation, ObservationKey, observation_order};
pub use station::{InvalidStation, Station};
pub use stop::{Stop, StopKey};
pub use time::{
    MAX_DELAY_MINS, MINUTES_PER_DAY, TimeDelay, TimeError, add_minutes, compare_times,
    minutes_between, parse_hhmm,
};
pub use train::{InvalidTrainId, TrainId};
