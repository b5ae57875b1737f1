//! Date/time intervals
//!
//! An interval is a signed delta over any subset of the date/time
//! components. Unset components are zero; each component can be negative.

use serde::{Deserialize, Serialize};

/// Signed delta applied to a date/time
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct Interval {
    #[serde(default)]
    pub year: i64,
    #[serde(default)]
    pub month: i64,
    #[serde(default)]
    pub day: i64,
    #[serde(default)]
    pub hour: i64,
    #[serde(default)]
    pub minute: i64,
    #[serde(default)]
    pub second: i64,
}

impl Interval {
    pub const ZERO: Interval = Interval {
        year: 0,
        month: 0,
        day: 0,
        hour: 0,
        minute: 0,
        second: 0,
    };

    pub fn with_year(mut self, year: i64) -> Self {
        self.year = year;
        self
    }

    pub fn with_month(mut self, month: i64) -> Self {
        self.month = month;
        self
    }

    pub fn with_day(mut self, day: i64) -> Self {
        self.day = day;
        self
    }

    pub fn with_hour(mut self, hour: i64) -> Self {
        self.hour = hour;
        self
    }

    pub fn with_minute(mut self, minute: i64) -> Self {
        self.minute = minute;
        self
    }

    pub fn with_second(mut self, second: i64) -> Self {
        self.second = second;
        self
    }

    /// True when every component is zero
    pub fn is_zero(&self) -> bool {
        *self == Interval::ZERO
    }
}
