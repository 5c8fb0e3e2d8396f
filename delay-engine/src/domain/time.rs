//! Time-of-day handling for stop times.
//!
//! Every stop time lives on a single local calendar day, so times are plain
//! `NaiveTime` values. A delay is a whole number of minutes added to the
//! expected time; the sum wraps around midnight.

use chrono::{Duration, NaiveTime, Timelike};
use std::cmp::Ordering;
use std::fmt;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Minutes in one service day.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Largest delay, early or late, a stop time may carry.
pub const MAX_DELAY_MINS: i64 = MINUTES_PER_DAY;

/// Parse a time of day from "HH:MM" format.
///
/// # Examples
///
/// ```
/// use delay_engine::domain::parse_hhmm;
///
/// assert!(parse_hhmm("00:00").is_ok());
/// assert!(parse_hhmm("23:59").is_ok());
///
/// assert!(parse_hhmm("1430").is_err());
/// assert!(parse_hhmm("14:3").is_err());
/// assert!(parse_hhmm("25:00").is_err());
/// ```
pub fn parse_hhmm(s: &str) -> Result<NaiveTime, TimeError> {
    let (hh, mm) = s
        .split_once(':')
        .ok_or(TimeError::new("expected HH:MM format"))?;
    let hour = clock_field(hh, 24).ok_or(TimeError::new("hour must be 00-23"))?;
    let minute = clock_field(mm, 60).ok_or(TimeError::new("minute must be 00-59"))?;

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or(TimeError::new("invalid time"))
}

/// A two-digit clock field strictly below `limit`.
fn clock_field(s: &str, limit: u32) -> Option<u32> {
    if s.len() != 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok().filter(|value| *value < limit)
}

/// Add whole minutes to a time of day, wrapping around midnight.
///
/// Any number of minutes is accepted; only its remainder modulo one day
/// moves the clock.
pub fn add_minutes(time: NaiveTime, minutes: i64) -> NaiveTime {
    let minutes = minutes.rem_euclid(MINUTES_PER_DAY);
    time.overflowing_add_signed(Duration::minutes(minutes)).0
}

/// Signed whole minutes from `from` to `to`, both taken on the same day.
pub fn minutes_between(from: NaiveTime, to: NaiveTime) -> i64 {
    to.signed_duration_since(from).num_minutes()
}

/// Order two optional times of day.
///
/// Present times are compared by their signed distance. A missing time
/// orders before any present time on either side, so
/// `compare_times(a, b) == compare_times(b, a).reverse()` always holds.
pub fn compare_times(a: Option<NaiveTime>, b: Option<NaiveTime>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.signed_duration_since(b).cmp(&Duration::zero()),
    }
}

/// An expected time of day together with the delay observed against it.
///
/// The effective time is `expected + delay`, and is undefined when the
/// expected time is unknown.
///
/// # Examples
///
/// ```
/// use delay_engine::domain::{TimeDelay, parse_hhmm};
///
/// let arrival = TimeDelay::new(Some(parse_hhmm("08:30").unwrap()), 20);
/// assert_eq!(arrival.effective(), Some(parse_hhmm("08:50").unwrap()));
/// assert_eq!(arrival.to_string(), "08:30 (+20)");
///
/// assert_eq!(TimeDelay::unknown().effective(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TimeDelay {
    /// Planned time of day
    pub expected: Option<NaiveTime>,
    /// Minutes late against the planned time (negative when early)
    pub delay_mins: i64,
}

impl TimeDelay {
    pub fn new(expected: Option<NaiveTime>, delay_mins: i64) -> Self {
        Self {
            expected,
            delay_mins,
        }
    }

    /// A planned time with no observed delay.
    pub fn scheduled(expected: NaiveTime) -> Self {
        Self::new(Some(expected), 0)
    }

    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_known(&self) -> bool {
        self.expected.is_some()
    }

    /// Returns `expected + delay`, or `None` if the expected time is unknown.
    pub fn effective(&self) -> Option<NaiveTime> {
        self.expected.map(|t| add_minutes(t, self.delay_mins))
    }
}

impl fmt::Display for TimeDelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expected {
            Some(t) => write!(f, "{:02}:{:02}", t.hour(), t.minute())?,
            None => f.write_str("--:--")?,
        }
        if self.delay_mins != 0 {
            write!(f, " ({:+})", self.delay_mins)?;
        }
        Ok(())
    }
}
