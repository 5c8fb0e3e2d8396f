//! Conversion from timetable DTOs to domain types.

use crate::domain::{
    ChainError, InvalidStation, InvalidTrainId, MAX_DELAY_MINS, Station, Stop, StopChain,
    TimeDelay, TimeError, TrainId, parse_hhmm,
};

use super::types::{RunRecord, StopRecord};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error(transparent)]
    InvalidTrain(#[from] InvalidTrainId),

    #[error("{station:?}: {source}")]
    InvalidStation {
        station: String,
        source: InvalidStation,
    },

    /// A time field is not "HH:MM"
    #[error("{field} at {station}: {source}")]
    InvalidTime {
        field: &'static str,
        station: Station,
        source: TimeError,
    },

    /// A delay of more than a day either way
    #[error("{field} at {station}: delay of {delay} minutes is out of range")]
    InvalidDelay {
        field: &'static str,
        station: Station,
        delay: i64,
    },

    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Convert one run into a stop chain.
pub fn convert_run(run: &RunRecord) -> Result<StopChain, ConversionError> {
    let train = TrainId::parse(&run.train)?;

    let stops = run
        .stops
        .iter()
        .map(|record| convert_stop(record, &train, run))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(StopChain::new(stops)?)
}

fn convert_stop(
    record: &StopRecord,
    train: &TrainId,
    run: &RunRecord,
) -> Result<Stop, ConversionError> {
    let station =
        Station::parse(&record.station).map_err(|source| ConversionError::InvalidStation {
            station: record.station.clone(),
            source,
        })?;

    let time = |field: &'static str, value: &Option<String>| {
        value
            .as_deref()
            .map(parse_hhmm)
            .transpose()
            .map_err(|source| ConversionError::InvalidTime {
                field,
                station: station.clone(),
                source,
            })
    };
    let delay = |field: &'static str, delay: i64| {
        if (-MAX_DELAY_MINS..=MAX_DELAY_MINS).contains(&delay) {
            Ok(delay)
        } else {
            Err(ConversionError::InvalidDelay {
                field,
                station: station.clone(),
                delay,
            })
        }
    };
    let arrival = time("arrival", &record.arrival)?;
    let departure = time("departure", &record.departure)?;
    let arrival_delay = delay("arrival_delay", record.arrival_delay)?;
    let departure_delay = delay("departure_delay", record.departure_delay)?;

    let mut stop = Stop::new(train.clone(), station, run.date);
    stop.arrival = TimeDelay::new(arrival, arrival_delay);
    stop.departure = TimeDelay::new(departure, departure_delay);
    stop.arrival_cancelled = record.arrival_cancelled;
    stop.departure_cancelled = record.departure_cancelled;
    Ok(stop)
}
