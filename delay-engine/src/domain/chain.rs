//! Stop chain types.
//!
//! A `StopChain` is the ordered sequence of stops made by one train on one
//! date, in the order the train travels. Stops are addressed by `StopId`,
//! their position in the chain, so previous/next navigation is index
//! arithmetic and a chain can never contain a cycle.

use chrono::NaiveDate;

use super::{Station, Stop, StopKey, TrainId};

/// Position of a stop within its chain.
///
/// # Examples
///
/// ```
/// use delay_engine::domain::StopId;
///
/// let id = StopId(1);
/// assert_eq!(id.next(), StopId(2));
/// assert_eq!(id.prev(), Some(StopId(0)));
/// assert_eq!(StopId(0).prev(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopId(pub usize);

impl StopId {
    /// Returns the next index.
    pub fn next(self) -> Self {
        StopId(self.0 + 1)
    }

    /// Returns the previous index, if any.
    pub fn prev(self) -> Option<Self> {
        self.0.checked_sub(1).map(StopId)
    }
}

impl std::fmt::Display for StopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which way to walk along a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Traversal {
    /// Towards the origin (previous stops)
    Backward,
    /// Towards the terminus (next stops)
    Forward,
}

/// Errors raised while building or addressing a stop chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// A chain needs at least one stop
    #[error("a stop chain must contain at least one stop")]
    Empty,

    /// The same (train, station, date) appears twice
    #[error("duplicate stop: {0}")]
    DuplicateStop(StopKey),

    /// A stop belongs to another train or date than the rest of the chain
    #[error("stop {found} does not belong to train {train} on {date}")]
    MixedChain {
        train: TrainId,
        date: NaiveDate,
        found: StopKey,
    },

    /// A stop id outside the chain
    #[error("stop {0} is out of bounds")]
    UnknownStop(StopId),
}

/// The stops of one train on one date, in travel order.
///
/// Chains are immutable. Modifying a stop means building a new chain with
/// [`StopChain::rebuild`], so a chain never aliases another chain's stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopChain {
    stops: Vec<Stop>,
}

impl StopChain {
    /// Build a chain from stops given in travel order.
    ///
    /// The order is kept as given. Fails if the list is empty, if the stops
    /// belong to more than one train/date, or if a (train, station, date)
    /// key appears twice.
    ///
    /// # Examples
    ///
    /// ```
    /// use delay_engine::domain::{ChainError, Station, Stop, StopChain, TrainId};
    /// use chrono::NaiveDate;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    /// let train = TrainId::parse("466").unwrap();
    /// let stop = |name: &str| Stop::new(train.clone(), Station::parse(name).unwrap(), date);
    ///
    /// let chain = StopChain::new(vec![stop("Liège"), stop("Namur")]).unwrap();
    /// assert_eq!(chain.len(), 2);
    ///
    /// let err = StopChain::new(vec![stop("Liège"), stop("Liège")]).unwrap_err();
    /// assert!(matches!(err, ChainError::DuplicateStop(_)));
    /// ```
    pub fn new(stops: Vec<Stop>) -> Result<Self, ChainError> {
        Self::validate(&stops)?;
        Ok(Self { stops })
    }

    fn validate(stops: &[Stop]) -> Result<(), ChainError> {
        let first = stops.first().ok_or(ChainError::Empty)?;

        let mut seen = std::collections::HashSet::with_capacity(stops.len());
        for stop in stops {
            if stop.train != first.train || stop.date != first.date {
                return Err(ChainError::MixedChain {
                    train: first.train.clone(),
                    date: first.date,
                    found: stop.key(),
                });
            }
            if !seen.insert(&stop.station) {
                return Err(ChainError::DuplicateStop(stop.key()));
            }
        }

        Ok(())
    }

    /// Returns the train running this chain.
    pub fn train(&self) -> &TrainId {
        &self.stops[0].train
    }

    /// Returns the date of this run.
    pub fn date(&self) -> NaiveDate {
        self.stops[0].date
    }

    /// Returns the number of stops.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Always false for a successfully built chain.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Returns the origin stop id.
    pub fn first(&self) -> StopId {
        StopId(0)
    }

    /// Returns the terminus stop id.
    pub fn last(&self) -> StopId {
        StopId(self.stops.len() - 1)
    }

    pub fn get(&self, id: StopId) -> Option<&Stop> {
        self.stops.get(id.0)
    }

    /// Like [`StopChain::get`], but an unknown id is an error.
    pub fn stop(&self, id: StopId) -> Result<&Stop, ChainError> {
        self.get(id).ok_or(ChainError::UnknownStop(id))
    }

    /// Returns the stop before `id`, if any.
    pub fn previous(&self, id: StopId) -> Option<StopId> {
        id.prev().filter(|p| p.0 < self.stops.len())
    }

    /// Returns the stop after `id`, if any.
    pub fn next(&self, id: StopId) -> Option<StopId> {
        let next = id.next();
        (next.0 < self.stops.len()).then_some(next)
    }

    /// Returns the neighbour of `id` in the given direction.
    pub fn step(&self, id: StopId, traversal: Traversal) -> Option<StopId> {
        match traversal {
            Traversal::Backward => self.previous(id),
            Traversal::Forward => self.next(id),
        }
    }

    /// Iterate over all stops in travel order.
    pub fn iter(&self) -> impl Iterator<Item = (StopId, &Stop)> {
        self.stops.iter().enumerate().map(|(i, s)| (StopId(i), s))
    }

    /// Walk from `start` (inclusive) in the given direction and return the
    /// first stop matching `predicate`.
    ///
    /// Returns `None` if `start` is outside the chain or no stop matches
    /// before the chain ends.
    pub fn find(
        &self,
        start: StopId,
        traversal: Traversal,
        mut predicate: impl FnMut(&Stop) -> bool,
    ) -> Option<StopId> {
        let mut cursor = self.get(start).map(|_| start);

        while let Some(id) = cursor {
            if predicate(&self.stops[id.0]) {
                return Some(id);
            }
            cursor = self.step(id, traversal);
        }

        None
    }

    /// Returns the first stop at `station`, walking from the origin.
    pub fn position_of(&self, station: &Station) -> Option<StopId> {
        self.find(self.first(), Traversal::Forward, |s| &s.station == station)
    }

    /// Build a new chain by passing every stop through `f`.
    ///
    /// Stops for which `f` returns `None` are left out and their neighbours
    /// become adjacent. The source chain is untouched. Fails with
    /// [`ChainError::Empty`] if every stop is removed, or with any other
    /// construction error if `f` breaks the chain invariants.
    pub fn rebuild(
        &self,
        mut f: impl FnMut(StopId, &Stop) -> Option<Stop>,
    ) -> Result<StopChain, ChainError> {
        let stops = self.iter().filter_map(|(id, stop)| f(id, stop)).collect();
        StopChain::new(stops)
    }

    /// Returns the stops in travel order.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn into_stops(self) -> Vec<Stop> {
        self.stops
    }
}
