//! Stop types.
//!
//! A `Stop` is one halt of one train at one station on one date, with
//! expected arrival/departure times and the delays observed against them.
//! A `StopKey` is the identity of a stop: (train, station, date).

use chrono::{NaiveDate, NaiveTime};

use super::{Station, TimeDelay, TrainId};

/// Identity of a stop. No two stops in a chain share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopKey {
    pub train: TrainId,
    pub station: Station,
    pub date: NaiveDate,
}

impl std::fmt::Display for StopKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "train {} at {} on {}", self.train, self.station, self.date)
    }
}

/// A single halt of a train at a station.
///
/// # Time Semantics
///
/// - For origin stations: usually only the departure is known
/// - For terminus stations: usually only the arrival is known
/// - The effective time is `expected + delay`, and is `None` whenever the
///   expected time is missing, whatever the cancellation flags say
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stop {
    /// Train calling at this stop
    pub train: TrainId,
    /// Station of this stop
    pub station: Station,
    /// Calendar date of the run
    pub date: NaiveDate,
    /// Expected arrival and its delay
    pub arrival: TimeDelay,
    /// Expected departure and its delay
    pub departure: TimeDelay,
    /// Whether the arrival at this stop is cancelled
    pub arrival_cancelled: bool,
    /// Whether the departure from this stop is cancelled
    pub departure_cancelled: bool,
}

impl Stop {
    /// Creates a stop with unknown times, no delay and no cancellation.
    pub fn new(train: TrainId, station: Station, date: NaiveDate) -> Self {
        Self {
            train,
            station,
            date,
            arrival: TimeDelay::unknown(),
            departure: TimeDelay::unknown(),
            arrival_cancelled: false,
            departure_cancelled: false,
        }
    }

    pub fn key(&self) -> StopKey {
        StopKey {
            train: self.train.clone(),
            station: self.station.clone(),
            date: self.date,
        }
    }

    /// Returns expected arrival plus arrival delay.
    ///
    /// # Examples
    ///
    /// ```
    /// use delay_engine::domain::{Station, Stop, TimeDelay, TrainId, parse_hhmm};
    /// use chrono::NaiveDate;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    /// let mut stop = Stop::new(
    ///     TrainId::parse("466").unwrap(),
    ///     Station::parse("Namur").unwrap(),
    ///     date,
    /// );
    ///
    /// assert_eq!(stop.effective_arrival(), None);
    ///
    /// stop.arrival = TimeDelay::new(Some(parse_hhmm("08:30").unwrap()), 20);
    /// assert_eq!(stop.effective_arrival(), Some(parse_hhmm("08:50").unwrap()));
    /// ```
    pub fn effective_arrival(&self) -> Option<NaiveTime> {
        self.arrival.effective()
    }

    /// Returns expected departure plus departure delay.
    pub fn effective_departure(&self) -> Option<NaiveTime> {
        self.departure.effective()
    }

    /// Returns true if either the arrival or the departure is cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.arrival_cancelled || self.departure_cancelled
    }

    /// Returns true if the expected arrival or expected departure is missing.
    pub fn lacks_expected_time(&self) -> bool {
        !self.arrival.is_known() || !self.departure.is_known()
    }

    /// Returns true if this stop is at one of the given stations.
    pub fn is_at_any(&self, stations: &[&Station]) -> bool {
        stations.iter().any(|s| **s == self.station)
    }
}

impl std::fmt::Display for Stop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} [arr {}, dep {}]",
            self.train, self.station, self.arrival, self.departure
        )?;
        if self.is_cancelled() {
            f.write_str(" cancelled")?;
        }
        Ok(())
    }
}
