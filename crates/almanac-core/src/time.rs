//! Time primitives for the Almanac protocol
//!
//! World time is a single signed counter of seconds since the calendar
//! epoch (the first second of year zero). Dates before year zero are
//! negative counters; all day/second decomposition uses floor division so
//! negative counters resolve to well-formed dates.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// World time - seconds since the calendar epoch
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct WorldTime(pub i64);

impl WorldTime {
    pub const ZERO: WorldTime = WorldTime(0);
    pub const MAX: WorldTime = WorldTime(i64::MAX);
    pub const MIN: WorldTime = WorldTime(i64::MIN);

    #[inline]
    pub fn from_secs(secs: i64) -> Self {
        WorldTime(secs)
    }

    #[inline]
    pub fn as_secs(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn saturating_add_secs(self, secs: i64) -> Self {
        WorldTime(self.0.saturating_add(secs))
    }

    #[inline]
    pub fn checked_add_secs(self, secs: i64) -> Option<Self> {
        self.0.checked_add(secs).map(WorldTime)
    }

    /// Whole days since the epoch, floor-division semantics
    #[inline]
    pub fn day_number(self, seconds_per_day: u32) -> i64 {
        self.0.div_euclid(seconds_per_day.max(1) as i64)
    }

    /// Seconds into the current day, always in `[0, seconds_per_day)`
    #[inline]
    pub fn second_of_day(self, seconds_per_day: u32) -> u32 {
        self.0.rem_euclid(seconds_per_day.max(1) as i64) as u32
    }
}

impl Add<i64> for WorldTime {
    type Output = WorldTime;

    #[inline]
    fn add(self, rhs: i64) -> Self::Output {
        WorldTime(self.0 + rhs)
    }
}

impl Sub<WorldTime> for WorldTime {
    type Output = i64;

    #[inline]
    fn sub(self, rhs: WorldTime) -> Self::Output {
        self.0 - rhs.0
    }
}

impl fmt::Debug for WorldTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorldTime({}s)", self.0)
    }
}

/// Sub-day clock state: seconds into the current day
///
/// INVARIANT: `0 <= seconds < seconds_per_day`. Overflow and underflow are
/// returned to the caller as a signed day-carry, never silently wrapped.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct DayTime {
    pub seconds: u32,
}

impl DayTime {
    pub const MIDNIGHT: DayTime = DayTime { seconds: 0 };

    /// Create from a raw second count, clamped into the valid day range
    #[inline]
    pub fn new(seconds: u32, seconds_per_day: u32) -> Self {
        DayTime {
            seconds: seconds.min(seconds_per_day.saturating_sub(1)),
        }
    }

    /// Apply a signed second delta and return the day-carry
    ///
    /// The carry is negative when the delta underflows past midnight.
    pub fn advance(&mut self, delta: i64, seconds_per_day: u32) -> i64 {
        let spd = seconds_per_day.max(1) as i64;
        let total = self.seconds as i64 + delta;
        let carry = total.div_euclid(spd);
        self.seconds = total.rem_euclid(spd) as u32;
        carry
    }
}
