//! Station identifier type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid station name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station name: {reason}")]
pub struct InvalidStation {
    reason: &'static str,
}

/// A station, identified by its name as published in the timetable.
///
/// Names are compared exactly (after trimming surrounding whitespace), so
/// "Brussels-Central" and "brussels-central" are different stations. A
/// `Station` is never empty.
///
/// # Examples
///
/// ```
/// use delay_engine::domain::Station;
///
/// let liege = Station::parse(" Liège-Guillemins ").unwrap();
/// assert_eq!(liege.as_str(), "Liège-Guillemins");
///
/// assert!(Station::parse("").is_err());
/// assert!(Station::parse("   ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Station(String);

impl Station {
    /// Parse a station name.
    pub fn parse(s: &str) -> Result<Self, InvalidStation> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(InvalidStation {
                reason: "must not be empty",
            });
        }

        if trimmed.chars().any(char::is_control) {
            return Err(InvalidStation {
                reason: "must not contain control characters",
            });
        }

        Ok(Station(trimmed.to_owned()))
    }

    /// Returns the station name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Station {
    type Error = InvalidStation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Station::parse(&value)
    }
}

impl From<Station> for String {
    fn from(value: Station) -> Self {
        value.0
    }
}

impl fmt::Debug for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Station({})", self.0)
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
