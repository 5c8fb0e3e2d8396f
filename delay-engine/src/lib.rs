//! Train delay resolution engine.
//!
//! Turns per-train, per-day stop sequences into a report of delayed trips
//! between two stations: missing scheduled times are recovered, each trip
//! is reduced to a directional observation, a faster alternative train is
//! substituted where one existed, and observations are merged into a report
//! that keeps the worst delay per day and direction.

pub mod domain;
pub mod engine;
pub mod error;
pub mod logging;
pub mod report;
pub mod timetable;
