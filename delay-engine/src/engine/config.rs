//! Configuration for the delay engine.

use crate::domain::{InvalidStation, Station};

/// Environment variable naming station A.
pub const ENV_STATION_A: &str = "DELAY_STATION_A";
/// Environment variable naming station B.
pub const ENV_STATION_B: &str = "DELAY_STATION_B";
/// Environment variable overriding the minimum reported delay.
pub const ENV_MIN_DELAY: &str = "DELAY_MIN_MINUTES";
/// Environment variable overriding the long-delay threshold.
pub const ENV_LONG_DELAY: &str = "DELAY_LONG_MINUTES";

/// Error loading the engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("{0} is not set")]
    Missing(&'static str),

    /// A station variable does not hold a valid station name
    #[error("{var}: {source}")]
    InvalidStation {
        var: &'static str,
        source: InvalidStation,
    },

    /// A numeric variable does not hold a non-negative number of minutes
    #[error("{var}: expected a non-negative number of minutes, got {value:?}")]
    InvalidMinutes { var: &'static str, value: String },

    /// Station A and station B are the same station
    #[error("station A and station B must differ (both are {0})")]
    SameStations(Station),
}

/// Parameters of one delay report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// First station of the pair (departure side of the morning trip).
    pub station_a: Station,

    /// Second station of the pair.
    pub station_b: Station,

    /// Minimum arrival delay (minutes) for an observation to be reported.
    pub min_delay_mins: i64,

    /// Delay (minutes) from which an observation counts as a long delay.
    pub long_delay_mins: i64,

    /// Whether to look for a faster alternative train for each observation.
    pub search_alternatives: bool,
}

impl EngineConfig {
    pub const DEFAULT_MIN_DELAY_MINS: i64 = 15;
    pub const DEFAULT_LONG_DELAY_MINS: i64 = 60;

    /// Create a configuration for the given station pair with default thresholds.
    pub fn new(station_a: Station, station_b: Station) -> Self {
        Self {
            station_a,
            station_b,
            min_delay_mins: Self::DEFAULT_MIN_DELAY_MINS,
            long_delay_mins: Self::DEFAULT_LONG_DELAY_MINS,
            search_alternatives: true,
        }
    }

    pub fn with_min_delay(mut self, mins: i64) -> Self {
        self.min_delay_mins = mins;
        self
    }

    pub fn with_long_delay(mut self, mins: i64) -> Self {
        self.long_delay_mins = mins;
        self
    }

    pub fn with_alternatives(mut self, enabled: bool) -> Self {
        self.search_alternatives = enabled;
        self
    }

    /// The two stations, A first.
    pub fn stations(&self) -> [&Station; 2] {
        [&self.station_a, &self.station_b]
    }

    /// Load the configuration from the process environment.
    ///
    /// `DELAY_STATION_A` and `DELAY_STATION_B` are required;
    /// `DELAY_MIN_MINUTES` and `DELAY_LONG_MINUTES` are optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load the configuration from any variable source.
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let station = |var: &'static str| -> Result<Station, ConfigError> {
            let value = get(var).ok_or(ConfigError::Missing(var))?;
            Station::parse(&value).map_err(|source| ConfigError::InvalidStation { var, source })
        };
        let minutes = |var: &'static str, default: i64| -> Result<i64, ConfigError> {
            match get(var) {
                None => Ok(default),
                Some(value) => match value.trim().parse::<i64>() {
                    Ok(mins) if mins >= 0 => Ok(mins),
                    _ => Err(ConfigError::InvalidMinutes { var, value }),
                },
            }
        };

        let station_a = station(ENV_STATION_A)?;
        let station_b = station(ENV_STATION_B)?;
        if station_a == station_b {
            return Err(ConfigError::SameStations(station_a));
        }

        Ok(Self::new(station_a, station_b)
            .with_min_delay(minutes(ENV_MIN_DELAY, Self::DEFAULT_MIN_DELAY_MINS)?)
            .with_long_delay(minutes(ENV_LONG_DELAY, Self::DEFAULT_LONG_DELAY_MINS)?))
    }
}
