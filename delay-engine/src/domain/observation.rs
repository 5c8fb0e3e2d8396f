//! Directional delay observations.
//!
//! An `Observation` is one report row: a trip between two named stations on
//! one date, flattened from a departure stop and an arrival stop.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{Station, Stop, TrainId};

/// Direction of travel between the two configured stations A and B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// From station A to station B
    Departure,
    /// From station B back to station A
    Arrival,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Departure => f.write_str("A→B"),
            Direction::Arrival => f.write_str("B→A"),
        }
    }
}

/// Report key: at most one observation per key is kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObservationKey {
    pub date: NaiveDate,
    pub departure_station: Station,
    pub arrival_station: Station,
}

/// A delay observed between a departure stop and an arrival stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub departure_station: Station,
    pub arrival_station: Station,
    pub direction: Direction,
    pub expected_departure: Option<NaiveTime>,
    pub expected_arrival: Option<NaiveTime>,
    pub effective_departure: Option<NaiveTime>,
    pub effective_arrival: Option<NaiveTime>,
    /// Train the traveller planned to take
    pub expected_train: TrainId,
    /// Train the traveller actually arrived with
    pub effective_train: TrainId,
    /// Minutes between expected and effective arrival
    pub delay_mins: i64,
    /// The departure or the arrival of the planned train was cancelled
    #[serde(default)]
    pub cancelled: bool,
}

impl Observation {
    /// Flatten a departure stop and an arrival stop into one observation.
    ///
    /// The delay is the arrival delay recorded at the arrival stop.
    pub fn from_stops(departure: &Stop, arrival: &Stop, direction: Direction) -> Self {
        Self {
            date: departure.date,
            departure_station: departure.station.clone(),
            arrival_station: arrival.station.clone(),
            direction,
            expected_departure: departure.departure.expected,
            expected_arrival: arrival.arrival.expected,
            effective_departure: departure.effective_departure(),
            effective_arrival: arrival.effective_arrival(),
            expected_train: departure.train.clone(),
            effective_train: arrival.train.clone(),
            delay_mins: arrival.arrival.delay_mins,
            cancelled: departure.departure_cancelled || arrival.arrival_cancelled,
        }
    }

    pub fn key(&self) -> ObservationKey {
        ObservationKey {
            date: self.date,
            departure_station: self.departure_station.clone(),
            arrival_station: self.arrival_station.clone(),
        }
    }

    /// Returns true if `other` has the same (date, departure, arrival) key.
    pub fn same_key(&self, other: &Observation) -> bool {
        self.date == other.date
            && self.departure_station == other.departure_station
            && self.arrival_station == other.arrival_station
    }
}

/// Report order: date, then departure station, then arrival station, then
/// expected train.
pub fn observation_order(a: &Observation, b: &Observation) -> Ordering {
    (
        a.date,
        &a.departure_station,
        &a.arrival_station,
        &a.expected_train,
    )
        .cmp(&(
            b.date,
            &b.departure_station,
            &b.arrival_station,
            &b.expected_train,
        ))
}

impl std::fmt::Display for Observation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} → {} train {} ({}) +{} min",
            self.date,
            self.direction,
            self.departure_station,
            self.arrival_station,
            self.expected_train,
            self.effective_train,
            self.delay_mins
        )?;
        if self.cancelled {
            f.write_str(" cancelled")?;
        }
        Ok(())
    }
}
