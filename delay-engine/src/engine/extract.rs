//! Directional extraction of observations from a stop chain.
//!
//! Given an anchor stop and the configured station pair (A, B), the nearest
//! stop at A or B before the anchor is the departure and the nearest stop at
//! A or B after it is the arrival. Either side falls back to the anchor
//! itself. The pair of stations then tells the direction of travel.

use tracing::{debug, trace};

use crate::domain::{
    ChainError, Direction, Observation, Station, Stop, StopChain, StopId, Traversal, TrainId,
};

use super::config::EngineConfig;

/// Error extracting an observation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// Departure and arrival resolved to the same stop
    #[error("departure and arrival resolve to the same stop: train {train} at {station}")]
    DepartureEqualsArrival { train: TrainId, station: Station },

    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Extracts directional observations for one station pair.
pub struct DirectionalExtractor<'a> {
    config: &'a EngineConfig,
}

impl<'a> DirectionalExtractor<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    fn is_endpoint(&self, stop: &Stop) -> bool {
        stop.is_at_any(&self.config.stations())
    }

    /// Resolve the (departure, arrival) stops around `anchor`.
    ///
    /// Fails if both resolve to the same stop, which happens when neither
    /// side of the anchor reaches station A or B.
    pub fn resolve(
        &self,
        chain: &StopChain,
        anchor: StopId,
    ) -> Result<(StopId, StopId), ExtractError> {
        let anchor_stop = chain.stop(anchor)?;

        let departure = chain
            .previous(anchor)
            .and_then(|p| chain.find(p, Traversal::Backward, |s| self.is_endpoint(s)))
            .unwrap_or(anchor);
        let arrival = chain
            .next(anchor)
            .and_then(|n| chain.find(n, Traversal::Forward, |s| self.is_endpoint(s)))
            .unwrap_or(anchor);

        trace!(%anchor, %departure, %arrival, "resolved stops");

        if departure == arrival {
            return Err(ExtractError::DepartureEqualsArrival {
                train: anchor_stop.train.clone(),
                station: anchor_stop.station.clone(),
            });
        }

        Ok((departure, arrival))
    }

    /// Direction of a departure/arrival pair, if it links A and B.
    pub fn direction(&self, departure: &Stop, arrival: &Stop) -> Option<Direction> {
        let a = &self.config.station_a;
        let b = &self.config.station_b;

        if &departure.station == a && &arrival.station == b {
            Some(Direction::Departure)
        } else if &departure.station == b && &arrival.station == a {
            Some(Direction::Arrival)
        } else {
            None
        }
    }

    /// Extract the observation around `anchor`.
    ///
    /// Returns `Ok(None)` when the resolved stops do not link A and B, or
    /// when the arrival delay is below the configured minimum.
    pub fn extract(
        &self,
        chain: &StopChain,
        anchor: StopId,
    ) -> Result<Option<Observation>, ExtractError> {
        let (departure, arrival) = self.resolve(chain, anchor)?;
        self.observe(chain, departure, arrival)
    }

    fn observe(
        &self,
        chain: &StopChain,
        departure: StopId,
        arrival: StopId,
    ) -> Result<Option<Observation>, ExtractError> {
        let departure = chain.stop(departure)?;
        let arrival = chain.stop(arrival)?;

        let Some(direction) = self.direction(departure, arrival) else {
            trace!(
                departure = %departure.station,
                arrival = %arrival.station,
                "stops do not link the station pair"
            );
            return Ok(None);
        };

        if arrival.arrival.delay_mins < self.config.min_delay_mins {
            trace!(
                delay = arrival.arrival.delay_mins,
                min = self.config.min_delay_mins,
                "delay below threshold"
            );
            return Ok(None);
        }

        let observation = Observation::from_stops(departure, arrival, direction);
        debug!(%observation, "extracted observation");
        Ok(Some(observation))
    }

    /// Stops of the chain at station A or B, in travel order.
    pub fn anchors(&self, chain: &StopChain) -> Vec<StopId> {
        chain
            .iter()
            .filter(|(_, stop)| self.is_endpoint(stop))
            .map(|(id, _)| id)
            .collect()
    }

    /// Extract an observation for every anchor of the chain.
    ///
    /// Anchors resolving to the same (departure, arrival) pair yield a single
    /// observation. The first anchor that fails to resolve aborts the chain.
    pub fn extract_all(&self, chain: &StopChain) -> Result<Vec<Observation>, ExtractError> {
        let mut seen = Vec::new();
        let mut observations = Vec::new();

        for anchor in self.anchors(chain) {
            let pair = self.resolve(chain, anchor)?;
            if seen.contains(&pair) {
                continue;
            }
            seen.push(pair);

            if let Some(observation) = self.observe(chain, pair.0, pair.1)? {
                observations.push(observation);
            }
        }

        Ok(observations)
    }
}
