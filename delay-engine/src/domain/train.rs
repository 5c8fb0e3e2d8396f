//! Train identity type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid train identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid train identifier: {reason}")]
pub struct InvalidTrainId {
    reason: &'static str,
}

/// A train identifier, as printed in the timetable (e.g. "466" or "IC 1715").
///
/// Internal whitespace is collapsed to single spaces so that "IC  1715" and
/// "IC 1715" name the same train.
///
/// # Examples
///
/// ```
/// use delay_engine::domain::TrainId;
///
/// let train = TrainId::parse("IC  1715").unwrap();
/// assert_eq!(train.as_str(), "IC 1715");
///
/// assert!(TrainId::parse("").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrainId(String);

impl TrainId {
    /// Parse a train identifier.
    pub fn parse(s: &str) -> Result<Self, InvalidTrainId> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");

        if normalized.is_empty() {
            return Err(InvalidTrainId {
                reason: "must not be empty",
            });
        }

        if !normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-')
        {
            return Err(InvalidTrainId {
                reason: "must be ASCII letters, digits, spaces or dashes",
            });
        }

        Ok(TrainId(normalized))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TrainId {
    type Error = InvalidTrainId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TrainId::parse(&value)
    }
}

impl From<TrainId> for String {
    fn from(value: TrainId) -> Self {
        value.0
    }
}

impl fmt::Debug for TrainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrainId({})", self.0)
    }
}

impl fmt::Display for TrainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
