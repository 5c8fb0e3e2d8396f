//! Timetable loading errors.

use std::path::PathBuf;

/// Error loading a timetable file.
#[derive(Debug, thiserror::Error)]
pub enum TimetableError {
    /// The file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The document is not a valid timetable
    #[error("invalid timetable JSON: {0}")]
    Json(#[from] serde_json::Error),
}
