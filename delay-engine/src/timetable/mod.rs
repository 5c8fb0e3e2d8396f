//! JSON timetable source.
//!
//! Provides the observed runs fed to the pipeline and implements the
//! engine's schedule and candidate collaborators on top of them.

mod convert;
mod error;
mod file;
mod types;

pub use convert::{ConversionError, convert_run};
pub use error::TimetableError;
pub use file::JsonTimetable;
pub use types::{RunRecord, StopRecord, TimetableFile};
