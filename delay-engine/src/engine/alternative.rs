//! Search for a faster alternative train.
//!
//! When the train behind an observation was cancelled or ran late, another
//! train serving the same trip may have got the traveller there sooner.
//! Candidates are scanned in the order the source returns them and the
//! first acceptable one wins.

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, trace};

use crate::domain::{
    Observation, Station, Stop, StopChain, Traversal, compare_times, minutes_between,
};

/// Source of candidate chains for the alternative search.
///
/// This trait allows mocking the timetable for testing.
pub trait CandidateSource {
    /// Chains of trains calling at `station` on `date` with an expected
    /// arrival strictly after `after`.
    ///
    /// The returned order is the scan order; it is not re-sorted.
    fn find_chains_arriving_after(
        &self,
        station: &Station,
        date: NaiveDate,
        after: NaiveTime,
    ) -> Vec<StopChain>;
}

impl<C: CandidateSource + ?Sized> CandidateSource for &C {
    fn find_chains_arriving_after(
        &self,
        station: &Station,
        date: NaiveDate,
        after: NaiveTime,
    ) -> Vec<StopChain> {
        (**self).find_chains_arriving_after(station, date, after)
    }
}

/// Looks for a substitute train for delayed or cancelled observations.
pub struct AlternativeTrainSearch<'a, C> {
    source: &'a C,
}

impl<'a, C: CandidateSource> AlternativeTrainSearch<'a, C> {
    pub fn new(source: &'a C) -> Self {
        Self { source }
    }

    /// Return a substitute observation, or the original unchanged if no
    /// candidate beats it.
    pub fn search(&self, original: &Observation) -> Observation {
        let Some(expected_arrival) = original.expected_arrival else {
            trace!(%original, "no expected arrival to search from");
            return original.clone();
        };

        let candidates = self.source.find_chains_arriving_after(
            &original.arrival_station,
            original.date,
            expected_arrival,
        );
        trace!(count = candidates.len(), "candidate chains");

        match self.select(original, &candidates) {
            Some((departure, arrival)) => {
                let substitute = substitute(original, departure, arrival);
                debug!(%original, %substitute, "found alternative train");
                substitute
            }
            None => original.clone(),
        }
    }

    /// The (departure, arrival) stops of the first acceptable candidate.
    ///
    /// Takes the first match in input order, not the earliest arrival. A
    /// missing time on the candidate compares as earlier than any present
    /// time, so it never blocks the departure check and always passes the
    /// arrival check.
    pub fn select<'c>(
        &self,
        original: &Observation,
        candidates: &'c [StopChain],
    ) -> Option<(&'c Stop, &'c Stop)> {
        candidates.iter().find_map(|chain| {
            let (departure, arrival) = resolve(chain, original)?;

            if departure.is_cancelled() || arrival.is_cancelled() {
                trace!(train = %chain.train(), "candidate cancelled");
                return None;
            }
            if original.cancelled {
                return Some((departure, arrival));
            }

            let leaves = departure.effective_departure();
            if compare_times(leaves, original.effective_departure).is_ge() {
                trace!(train = %chain.train(), "candidate leaves later");
                return None;
            }

            compare_times(arrival.arrival.expected, original.effective_arrival)
                .is_lt()
                .then_some((departure, arrival))
        })
    }
}

/// Departure and arrival stops of `chain` for the trip of `original`.
///
/// The arrival is the chain's stop at the destination; the departure is the
/// nearest stop at the origin walking back from it.
fn resolve<'c>(chain: &'c StopChain, original: &Observation) -> Option<(&'c Stop, &'c Stop)> {
    let arrival = chain.position_of(&original.arrival_station)?;
    let departure = chain.find(arrival, Traversal::Backward, |stop| {
        stop.station == original.departure_station
    })?;

    Some((chain.get(departure)?, chain.get(arrival)?))
}

/// The original itinerary travelled with the substitute train.
fn substitute(original: &Observation, departure: &Stop, arrival: &Stop) -> Observation {
    let effective_arrival = arrival.effective_arrival();
    let delay_mins = match (original.expected_arrival, effective_arrival) {
        (Some(expected), Some(effective)) => minutes_between(expected, effective),
        _ => original.delay_mins,
    };

    Observation {
        effective_departure: departure.effective_departure(),
        effective_arrival,
        effective_train: arrival.train.clone(),
        delay_mins,
        cancelled: false,
        ..original.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, TimeDelay, TrainId, parse_hhmm};
    use std::cell::RefCell;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn time(s: &str) -> NaiveTime {
        parse_hhmm(s).unwrap()
    }

    fn station(s: &str) -> Station {
        Station::parse(s).unwrap()
    }

    /// Mock source returning a fixed list and recording queries.
    struct MockSource {
        chains: Vec<StopChain>,
        queries: RefCell<Vec<(Station, NaiveDate, NaiveTime)>>,
    }

    impl MockSource {
        fn new(chains: Vec<StopChain>) -> Self {
            Self {
                chains,
                queries: RefCell::new(Vec::new()),
            }
        }
    }

    impl CandidateSource for MockSource {
        fn find_chains_arriving_after(
            &self,
            station: &Station,
            date: NaiveDate,
            after: NaiveTime,
        ) -> Vec<StopChain> {
            self.queries
                .borrow_mut()
                .push((station.clone(), date, after));
            self.chains.clone()
        }
    }

    /// Candidate train from Liège to Brussels.
    fn candidate(train: &str, dep: &str, dep_delay: i64, arr: &str, arr_delay: i64) -> StopChain {
        let train = TrainId::parse(train).unwrap();
        let mut from = Stop::new(train.clone(), station("Liège"), date());
        from.departure = TimeDelay::new(Some(time(dep)), dep_delay);
        let mut to = Stop::new(train, station("Brussels"), date());
        to.arrival = TimeDelay::new(Some(time(arr)), arr_delay);
        StopChain::new(vec![from, to]).unwrap()
    }

    /// Train 466 planned 15:24 -> 16:04, arriving 20 minutes late at 16:24.
    fn original() -> Observation {
        Observation {
            date: date(),
            departure_station: station("Liège"),
            arrival_station: station("Brussels"),
            direction: Direction::Departure,
            expected_departure: Some(time("15:24")),
            expected_arrival: Some(time("16:04")),
            effective_departure: Some(time("15:30")),
            effective_arrival: Some(time("16:24")),
            expected_train: TrainId::parse("466").unwrap(),
            effective_train: TrainId::parse("466").unwrap(),
            delay_mins: 20,
            cancelled: false,
        }
    }

    #[test]
    fn later_candidates_leave_original_unchanged() {
        let source = MockSource::new(vec![
            candidate("470", "16:20", 0, "17:00", 0),
            candidate("480", "17:20", 0, "18:00", 0),
        ]);
        let search = AlternativeTrainSearch::new(&source);

        assert_eq!(search.search(&original()), original());
    }

    #[test]
    fn queries_destination_after_expected_arrival() {
        let source = MockSource::new(vec![]);
        AlternativeTrainSearch::new(&source).search(&original());

        assert_eq!(
            source.queries.borrow().as_slice(),
            &[(station("Brussels"), date(), time("16:04"))]
        );
    }

    #[test]
    fn earlier_candidate_is_substituted() {
        // Leaves 15:25, planned 16:10, actually arrives 16:12
        let source = MockSource::new(vec![candidate("1520", "15:25", 0, "16:10", 2)]);
        let result = AlternativeTrainSearch::new(&source).search(&original());

        assert_eq!(result.expected_train, TrainId::parse("466").unwrap());
        assert_eq!(result.effective_train, TrainId::parse("1520").unwrap());
        assert_eq!(result.expected_departure, Some(time("15:24")));
        assert_eq!(result.expected_arrival, Some(time("16:04")));
        assert_eq!(result.effective_departure, Some(time("15:25")));
        assert_eq!(result.effective_arrival, Some(time("16:12")));
        assert_eq!(result.delay_mins, 8);
        assert_eq!(result.direction, Direction::Departure);
    }

    #[test]
    fn later_leaving_candidate_is_skipped() {
        // Would arrive earlier, but leaves at the original's effective departure
        let source = MockSource::new(vec![
            candidate("1520", "15:30", 0, "16:10", 0),
            candidate("1521", "15:26", 0, "16:15", 0),
        ]);
        let result = AlternativeTrainSearch::new(&source).search(&original());

        assert_eq!(result.effective_train, TrainId::parse("1521").unwrap());
    }

    #[test]
    fn first_match_wins() {
        let source = MockSource::new(vec![
            candidate("1521", "15:26", 0, "16:20", 0),
            candidate("1520", "15:25", 0, "16:10", 0),
        ]);
        let result = AlternativeTrainSearch::new(&source).search(&original());

        assert_eq!(result.effective_train, TrainId::parse("1521").unwrap());
    }

    #[test]
    fn cancelled_original_takes_any_running_train() {
        let mut cancelled = original();
        cancelled.cancelled = true;

        // Leaves much later and arrives after the original would have
        let source = MockSource::new(vec![candidate("480", "17:20", 5, "18:00", 5)]);
        let result = AlternativeTrainSearch::new(&source).search(&cancelled);

        assert_eq!(result.effective_train, TrainId::parse("480").unwrap());
        assert_eq!(result.effective_arrival, Some(time("18:05")));
        assert_eq!(result.delay_mins, 121);
        assert!(!result.cancelled);
    }

    #[test]
    fn cancelled_candidates_are_never_selected() {
        let mut dep_cancelled = candidate("1520", "15:25", 0, "16:10", 0);
        let mut stops = dep_cancelled.clone().into_stops();
        stops[0].departure_cancelled = true;
        dep_cancelled = StopChain::new(stops).unwrap();

        let mut arr_cancelled = candidate("1521", "15:25", 0, "16:10", 0).into_stops();
        arr_cancelled[1].arrival_cancelled = true;
        let arr_cancelled = StopChain::new(arr_cancelled).unwrap();

        let mut cancelled = original();
        cancelled.cancelled = true;

        let source = MockSource::new(vec![dep_cancelled, arr_cancelled]);
        let search = AlternativeTrainSearch::new(&source);

        assert_eq!(search.search(&original()), original());
        assert_eq!(search.search(&cancelled), cancelled);
    }

    #[test]
    fn candidate_missing_a_station_is_skipped() {
        let train = TrainId::parse("900").unwrap();
        let mut from = Stop::new(train.clone(), station("Namur"), date());
        from.departure = TimeDelay::scheduled(time("15:00"));
        let mut to = Stop::new(train, station("Brussels"), date());
        to.arrival = TimeDelay::scheduled(time("16:00"));
        let elsewhere = StopChain::new(vec![from, to]).unwrap();

        let source = MockSource::new(vec![elsewhere]);
        assert_eq!(AlternativeTrainSearch::new(&source).search(&original()), original());
    }

    #[test]
    fn candidate_running_backwards_is_skipped() {
        // Calls at Brussels before Liège
        let train = TrainId::parse("901").unwrap();
        let mut first = Stop::new(train.clone(), station("Brussels"), date());
        first.arrival = TimeDelay::scheduled(time("15:50"));
        first.departure = TimeDelay::scheduled(time("15:52"));
        let mut second = Stop::new(train, station("Liège"), date());
        second.arrival = TimeDelay::scheduled(time("16:40"));
        let reversed = StopChain::new(vec![first, second]).unwrap();

        let source = MockSource::new(vec![reversed]);
        assert_eq!(AlternativeTrainSearch::new(&source).search(&original()), original());
    }

    #[test]
    fn cancelled_original_takes_train_without_arrival_time() {
        let mut cancelled = original();
        cancelled.cancelled = true;

        let mut untimed = candidate("1520", "15:25", 0, "16:10", 0).into_stops();
        untimed[1].arrival = TimeDelay::new(None, 0);
        let untimed = StopChain::new(untimed).unwrap();

        let source = MockSource::new(vec![untimed]);
        let result = AlternativeTrainSearch::new(&source).search(&cancelled);

        assert_eq!(result.effective_train, TrainId::parse("1520").unwrap());
        assert_eq!(result.effective_departure, Some(time("15:25")));
        assert_eq!(result.effective_arrival, None);
        assert_eq!(result.delay_mins, cancelled.delay_mins);
        assert!(!result.cancelled);
    }

    #[test]
    fn candidate_without_departure_time_counts_as_earlier() {
        let mut untimed = candidate("1520", "15:25", 0, "16:10", 0).into_stops();
        untimed[0].departure = TimeDelay::new(None, 0);
        let untimed = StopChain::new(untimed).unwrap();

        let source = MockSource::new(vec![untimed]);
        let result = AlternativeTrainSearch::new(&source).search(&original());

        assert_eq!(result.effective_train, TrainId::parse("1520").unwrap());
        assert_eq!(result.effective_departure, None);
        assert_eq!(result.effective_arrival, Some(time("16:10")));
        assert_eq!(result.delay_mins, 6);
    }

    #[test]
    fn original_without_expected_arrival_is_returned() {
        let mut unknown = original();
        unknown.expected_arrival = None;

        let source = MockSource::new(vec![candidate("1520", "15:25", 0, "16:10", 0)]);
        let result = AlternativeTrainSearch::new(&source).search(&unknown);

        assert_eq!(result, unknown);
        assert!(source.queries.borrow().is_empty());
    }
}
