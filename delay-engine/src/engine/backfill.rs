//! Recovery of missing expected times from the planned schedule.
//!
//! A stop that was not served (cancelled, skipped) often comes without an
//! expected time. Before a chain can be turned into observations, every
//! stop must be completed from the authoritative schedule or removed.

use tracing::{debug, trace};

use crate::domain::{ChainError, Station, Stop, StopChain, StopId, StopKey, TimeDelay, TrainId};

/// Read access to the planned schedule.
///
/// This abstraction allows the backfill to be tested without a timetable.
pub trait ScheduleLookup {
    /// Find the planned stop of `train` at `station`.
    ///
    /// Returns `None` when the schedule has no such stop, or when the lookup
    /// itself fails. Must not modify the schedule.
    fn find_scheduled_stop(&self, train: &TrainId, station: &Station) -> Option<Stop>;
}

impl<L: ScheduleLookup + ?Sized> ScheduleLookup for &L {
    fn find_scheduled_stop(&self, train: &TrainId, station: &Station) -> Option<Stop> {
        (**self).find_scheduled_stop(train, station)
    }
}

/// Result of backfilling one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backfilled {
    /// The completed chain, or `None` if no stop could be kept.
    pub chain: Option<StopChain>,
    /// Stops removed because their missing times could not be recovered.
    pub dropped: Vec<StopKey>,
}

/// Completes missing expected times on a chain from a [`ScheduleLookup`].
pub struct ScheduleBackfill<'a, L: ScheduleLookup> {
    lookup: &'a L,
}

impl<'a, L: ScheduleLookup> ScheduleBackfill<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        Self { lookup }
    }

    /// Backfill every stop of `chain`.
    ///
    /// The anchor is processed first, then every previous stop walking
    /// backward, then every next stop walking forward. Only missing
    /// expected times are filled in, each with a delay of 0; times already
    /// present keep their observed delay. A stop whose missing time cannot
    /// be looked up is removed from the returned chain.
    ///
    /// The source chain is never modified. Running the backfill on its own
    /// output returns the same chain.
    pub fn backfill(&self, chain: &StopChain, anchor: StopId) -> Result<Backfilled, ChainError> {
        chain.stop(anchor)?;

        let mut order = vec![anchor];
        let mut cursor = chain.previous(anchor);
        while let Some(id) = cursor {
            order.push(id);
            cursor = chain.previous(id);
        }
        let mut cursor = chain.next(anchor);
        while let Some(id) = cursor {
            order.push(id);
            cursor = chain.next(id);
        }

        let mut filled: Vec<Option<Stop>> = vec![None; chain.len()];
        let mut dropped = Vec::new();
        for id in order {
            let stop = chain.stop(id)?;
            match self.fill_stop(stop) {
                Some(completed) => filled[id.0] = Some(completed),
                None => dropped.push(stop.key()),
            }
        }

        let chain = match chain.rebuild(|id, _| filled[id.0].take()) {
            Ok(rebuilt) => Some(rebuilt),
            Err(ChainError::Empty) => {
                debug!(
                    train = %chain.train(),
                    date = %chain.date(),
                    "every stop dropped by backfill"
                );
                None
            }
            Err(e) => return Err(e),
        };

        Ok(Backfilled { chain, dropped })
    }

    /// Complete one stop, or return `None` if it must be dropped.
    pub fn fill_stop(&self, stop: &Stop) -> Option<Stop> {
        if !stop.lacks_expected_time() {
            return Some(stop.clone());
        }

        debug!(stop = %stop, "stop lacks an expected time");

        let Some(scheduled) = self.lookup.find_scheduled_stop(&stop.train, &stop.station) else {
            debug!(stop = %stop, "no scheduled stop found, dropping");
            return None;
        };

        let mut completed = stop.clone();
        if let (None, Some(expected)) = (completed.arrival.expected, scheduled.arrival.expected) {
            completed.arrival = TimeDelay::scheduled(expected);
        }
        if let (None, Some(expected)) = (completed.departure.expected, scheduled.departure.expected)
        {
            completed.departure = TimeDelay::scheduled(expected);
        }

        trace!(before = %stop, after = %completed, "backfilled stop");

        Some(completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parse_hhmm;
    use chrono::{NaiveDate, NaiveTime};
    use std::cell::RefCell;
    use std::collections::HashMap;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn time(s: &str) -> NaiveTime {
        parse_hhmm(s).unwrap()
    }

    fn station(s: &str) -> Station {
        Station::parse(s).unwrap()
    }

    fn train() -> TrainId {
        TrainId::parse("466").unwrap()
    }

    fn make_stop(name: &str, arr: &str, dep: &str) -> Stop {
        let mut stop = Stop::new(train(), station(name), date());
        if !arr.is_empty() {
            stop.arrival = TimeDelay::scheduled(time(arr));
        }
        if !dep.is_empty() {
            stop.departure = TimeDelay::scheduled(time(dep));
        }
        stop
    }

    /// Mock schedule that records every lookup.
    #[derive(Default)]
    struct MockSchedule {
        stops: HashMap<(TrainId, Station), Stop>,
        calls: RefCell<Vec<Station>>,
    }

    impl MockSchedule {
        fn with(mut self, name: &str, arr: &str, dep: &str) -> Self {
            self.stops
                .insert((train(), station(name)), make_stop(name, arr, dep));
            self
        }
    }

    impl ScheduleLookup for MockSchedule {
        fn find_scheduled_stop(&self, train: &TrainId, station: &Station) -> Option<Stop> {
            self.calls.borrow_mut().push(station.clone());
            self.stops.get(&(train.clone(), station.clone())).cloned()
        }
    }

    #[test]
    fn complete_chain_is_untouched() {
        let chain = StopChain::new(vec![
            make_stop("Liège", "07:58", "08:00"),
            make_stop("Namur", "08:30", "08:31"),
        ])
        .unwrap();
        let schedule = MockSchedule::default();

        let result = ScheduleBackfill::new(&schedule)
            .backfill(&chain, StopId(0))
            .unwrap();

        assert_eq!(result.chain, Some(chain));
        assert!(result.dropped.is_empty());
        assert!(schedule.calls.borrow().is_empty());
    }

    #[test]
    fn fills_missing_times_with_zero_delay() {
        let mut namur = make_stop("Namur", "", "");
        namur.arrival.delay_mins = 12;
        namur.arrival_cancelled = true;
        let chain = StopChain::new(vec![make_stop("Liège", "07:58", "08:00"), namur]).unwrap();
        let schedule = MockSchedule::default().with("Namur", "18:20", "18:21");

        let result = ScheduleBackfill::new(&schedule)
            .backfill(&chain, StopId(0))
            .unwrap();
        let filled = result.chain.unwrap();
        let namur = &filled.stops()[1];

        assert_eq!(namur.arrival, TimeDelay::scheduled(time("18:20")));
        assert_eq!(namur.departure, TimeDelay::scheduled(time("18:21")));
        assert!(namur.arrival_cancelled);
    }

    #[test]
    fn keeps_present_time_and_its_delay() {
        let mut namur = make_stop("Namur", "08:30", "");
        namur.arrival.delay_mins = 20;
        let chain = StopChain::new(vec![namur]).unwrap();
        let schedule = MockSchedule::default().with("Namur", "08:29", "08:31");

        let result = ScheduleBackfill::new(&schedule)
            .backfill(&chain, StopId(0))
            .unwrap();
        let chain = result.chain.unwrap();
        let stop = &chain.stops()[0];

        assert_eq!(stop.arrival, TimeDelay::new(Some(time("08:30")), 20));
        assert_eq!(stop.departure, TimeDelay::scheduled(time("08:31")));
    }

    #[test]
    fn backfills_whole_chain_anchor_first() {
        let chain = StopChain::new(vec![
            make_stop("Liège", "", "17:01"),
            make_stop("Huy", "17:20", "17:21"),
            make_stop("Namur", "", ""),
            make_stop("Brussels", "18:30", ""),
        ])
        .unwrap();
        let schedule = MockSchedule::default()
            .with("Liège", "17:00", "17:01")
            .with("Namur", "18:20", "18:21")
            .with("Brussels", "18:30", "18:31");

        let result = ScheduleBackfill::new(&schedule)
            .backfill(&chain, StopId(2))
            .unwrap();

        // Anchor, then backward, then forward
        assert_eq!(
            *schedule.calls.borrow(),
            vec![station("Namur"), station("Liège"), station("Brussels")]
        );

        let filled = result.chain.unwrap();
        assert_eq!(filled.len(), 4);
        assert_eq!(filled.stops()[0].arrival.expected, Some(time("17:00")));
        assert_eq!(filled.stops()[2].arrival.expected, Some(time("18:20")));
        assert_eq!(filled.stops()[2].departure.expected, Some(time("18:21")));
        assert_eq!(filled.stops()[3].departure.expected, Some(time("18:31")));
        assert!(result.dropped.is_empty());
    }

    #[test]
    fn drops_irrecoverable_stop() {
        let chain = StopChain::new(vec![
            make_stop("Liège", "07:58", "08:00"),
            make_stop("Huy", "", ""),
            make_stop("Namur", "08:30", "08:31"),
        ])
        .unwrap();
        let schedule = MockSchedule::default();

        let result = ScheduleBackfill::new(&schedule)
            .backfill(&chain, StopId(0))
            .unwrap();

        assert_eq!(result.dropped.len(), 1);
        assert_eq!(result.dropped[0].station, station("Huy"));

        let filled = result.chain.unwrap();
        assert_eq!(filled.len(), 2);
        assert_eq!(filled.next(StopId(0)), Some(StopId(1)));
        assert_eq!(filled.stops()[1].station, station("Namur"));

        // The source chain is left as it was
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn drops_everything() {
        let chain = StopChain::new(vec![make_stop("Huy", "", "")]).unwrap();
        let schedule = MockSchedule::default();

        let result = ScheduleBackfill::new(&schedule)
            .backfill(&chain, StopId(0))
            .unwrap();

        assert!(result.chain.is_none());
        assert_eq!(result.dropped.len(), 1);
    }

    #[test]
    fn unknown_anchor_is_an_error() {
        let chain = StopChain::new(vec![make_stop("Huy", "10:00", "10:01")]).unwrap();
        let schedule = MockSchedule::default();

        let err = ScheduleBackfill::new(&schedule)
            .backfill(&chain, StopId(3))
            .unwrap_err();
        assert_eq!(err, ChainError::UnknownStop(StopId(3)));
    }

    #[test]
    fn backfill_is_idempotent() {
        let chain = StopChain::new(vec![
            make_stop("Liège", "", "17:01"),
            make_stop("Huy", "", ""),
            make_stop("Namur", "", ""),
        ])
        .unwrap();
        // Liège's planned arrival is unknown too, so it stays incomplete
        let schedule = MockSchedule::default()
            .with("Liège", "", "17:01")
            .with("Namur", "18:20", "18:21");
        let backfill = ScheduleBackfill::new(&schedule);

        let once = backfill.backfill(&chain, StopId(1)).unwrap();
        let once_chain = once.chain.clone().unwrap();
        let twice = backfill.backfill(&once_chain, StopId(0)).unwrap();

        assert_eq!(twice.chain, once.chain);
        assert!(twice.dropped.is_empty());
    }
}
