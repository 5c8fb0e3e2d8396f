//! Top-level engine errors.

use crate::domain::ChainError;
use crate::engine::ExtractError;

/// Error aborting the processing of one unit of work.
///
/// A failed unit is reported to the caller and skipped; the rest of the
/// batch carries on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid chain: {0}")]
    Chain(#[from] ChainError),

    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Station, TrainId};

    #[test]
    fn error_display() {
        let err = EngineError::from(ChainError::Empty);
        assert_eq!(err.to_string(), format!("invalid chain: {}", ChainError::Empty));

        let err = EngineError::from(ExtractError::DepartureEqualsArrival {
            train: TrainId::parse("466").unwrap(),
            station: Station::parse("Namur").unwrap(),
        });
        assert_eq!(
            err.to_string(),
            "extraction failed: departure and arrival resolve to the same stop: train 466 at Namur"
        );
    }
}
