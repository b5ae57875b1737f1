//! Date arithmetic engine
//!
//! Pure conversions between the linear world-time counter and structured
//! dates under a given calendar. All functions take the calendar by
//! reference and plain values, so callers can run them against a cloned
//! configuration for previews without touching the canonical instance.
//!
//! Conventions: `month` is a zero-based index into `months[]`; `day` is the
//! 1-based day number within the month. Out-of-range components are clamped
//! to the nearest valid value rather than rejected, because these functions
//! also serve speculative calculations that must always produce some date.

use almanac_core::{Interval, WorldTime};
use serde::{Deserialize, Serialize};

use crate::config::{Calendar, LeapYearRule};

/// A structured date/time under some calendar
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize,
)]
pub struct DateTime {
    pub year: i64,
    /// Month index, zero-based
    pub month: usize,
    /// Day number within the month, 1-based
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl DateTime {
    pub fn new(year: i64, month: usize, day: u32) -> Self {
        DateTime {
            year,
            month,
            day,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }

    pub fn at(mut self, hour: u32, minute: u32, second: u32) -> Self {
        self.hour = hour;
        self.minute = minute;
        self.second = second;
        self
    }
}

/// Clamp a month index into the calendar's month list
#[inline]
pub fn clamp_month(cal: &Calendar, month: usize) -> usize {
    month.min(cal.months.len().saturating_sub(1))
}

/// Wrap a signed month offset around the month list
///
/// Month-change navigation wraps; everything else clamps.
#[inline]
pub fn wrap_month(cal: &Calendar, month: i64) -> usize {
    month.rem_euclid(cal.months.len().max(1) as i64) as usize
}

/// Clamp a 1-based day number into a month of the given length
#[inline]
pub fn clamp_day(day: u32, month_length: u32) -> u32 {
    day.clamp(1, month_length.max(1))
}

/// Day count of one month in one year
pub fn days_in_month(cal: &Calendar, year: i64, month: usize) -> u32 {
    let leap = cal.leap_year.is_leap_year(year);
    cal.months
        .get(month)
        .map(|m| m.length(leap))
        .unwrap_or(0)
}

fn year_length(cal: &Calendar, leap: bool, include_intercalary: bool) -> i64 {
    cal.months
        .iter()
        .filter(|m| include_intercalary || m.counts_toward_totals())
        .map(|m| m.length(leap) as i64)
        .sum()
}

/// Total days of one year, intercalary exclusions applied
pub fn days_in_year(cal: &Calendar, year: i64) -> i64 {
    year_length(cal, cal.leap_year.is_leap_year(year), false)
}

/// Count of years `y` in `[a, b)` with `y ≡ 0 (mod k)`, floor division
#[inline]
fn multiples_in(a: i64, b: i64, k: i64) -> i64 {
    (b - 1).div_euclid(k) - (a - 1).div_euclid(k)
}

/// Count of leap years in `[a, b)` under the calendar's rule
fn leap_years_between(cal: &Calendar, a: i64, b: i64) -> i64 {
    if a >= b {
        return 0;
    }
    match cal.leap_year {
        LeapYearRule::None => 0,
        LeapYearRule::Gregorian => {
            multiples_in(a, b, 4) - multiples_in(a, b, 100) + multiples_in(a, b, 400)
        }
        LeapYearRule::Custom {
            modulus,
            starting_year,
        } => {
            if modulus == 0 {
                0
            } else {
                multiples_in(a - starting_year, b - starting_year, modulus as i64)
            }
        }
    }
}

/// Days from the epoch (first day of year zero) to the first day of `year`
///
/// Closed form: whole-year spans use the leap count between the two years
/// rather than walking year by year, so distant dates stay cheap.
pub fn days_from_epoch(cal: &Calendar, year: i64, include_intercalary: bool) -> i64 {
    let normal = year_length(cal, false, include_intercalary);
    let leap = year_length(cal, true, include_intercalary);
    let extra = leap - normal;

    if year >= cal.year_zero {
        let span = year - cal.year_zero;
        span * normal + leap_years_between(cal, cal.year_zero, year) * extra
    } else {
        let span = cal.year_zero - year;
        -(span * normal + leap_years_between(cal, year, cal.year_zero) * extra)
    }
}

/// Convert a structured date to whole days since the epoch
///
/// Sums whole years (leap-aware), whole months within the target year, and
/// the day offset. Intercalary months are included or excluded from the
/// totals per their configuration unless `include_intercalary` forces them
/// in. `include_current_day` counts the target day itself.
pub fn date_to_days(
    cal: &Calendar,
    year: i64,
    month: usize,
    day: u32,
    include_intercalary: bool,
    include_current_day: bool,
) -> i64 {
    let month = clamp_month(cal, month);
    let leap = cal.leap_year.is_leap_year(year);

    let mut days = days_from_epoch(cal, year, include_intercalary);
    for m in &cal.months[..month] {
        if include_intercalary || m.counts_toward_totals() {
            days += m.length(leap) as i64;
        }
    }

    let month_length = cal.months[month].length(leap);
    days += clamp_day(day, month_length) as i64 - 1;
    if include_current_day {
        days += 1;
    }
    days
}

/// Convert whole days since the epoch back to (year, month, day)
///
/// The year is found by a monotonic search over year start offsets, so the
/// walk terminates in a bounded number of steps even when some months have
/// zero days in a given year. The month walk is a single pass over the
/// month list; a remainder that fits no month clamps to the final one.
pub fn days_to_date(cal: &Calendar, total_days: i64) -> (i64, usize, u32) {
    if year_length(cal, false, false) == 0 && year_length(cal, true, false) == 0 {
        // Every month is excluded from the running totals; no counter value
        // can land anywhere but the epoch.
        return (cal.year_zero, 0, 1);
    }
    let approx = year_length(cal, false, false).max(1);

    // Bracket the year: start of `lo` is at or before the target,
    // start of `hi` is after it.
    let mut lo = cal.year_zero + total_days.div_euclid(approx) - 1;
    let mut step = 1i64;
    while days_from_epoch(cal, lo, false) > total_days {
        lo -= step;
        step = step.saturating_mul(2);
    }
    let mut hi = lo + 1;
    step = 1;
    while days_from_epoch(cal, hi, false) <= total_days {
        hi += step;
        step = step.saturating_mul(2);
    }
    while lo + 1 < hi {
        let mid = lo + (hi - lo) / 2;
        if days_from_epoch(cal, mid, false) <= total_days {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let year = lo;

    let leap = cal.leap_year.is_leap_year(year);
    let mut remainder = total_days - days_from_epoch(cal, year, false);
    let mut last_counting = 0;
    for (idx, m) in cal.months.iter().enumerate() {
        if !m.counts_toward_totals() {
            continue;
        }
        let length = m.length(leap) as i64;
        if length == 0 {
            // This month disappears in the current year
            continue;
        }
        if remainder < length {
            return (year, idx, remainder as u32 + 1);
        }
        remainder -= length;
        last_counting = idx;
    }

    // Misconfigured or zero-length year: clamp to the last real month
    let length = cal.months[last_counting].length(leap);
    (year, last_counting, length.max(1))
}

/// Convert a structured date/time to the linear seconds counter
pub fn date_to_seconds(cal: &Calendar, dt: &DateTime) -> WorldTime {
    let units = cal.time;
    let days = date_to_days(cal, dt.year, dt.month, dt.day, false, false);

    let hour = dt.hour.min(units.hours_per_day.saturating_sub(1));
    let minute = dt.minute.min(units.minutes_per_hour.saturating_sub(1));
    let second = dt.second.min(units.seconds_per_minute.saturating_sub(1));

    let seconds = days * units.seconds_per_day() as i64
        + hour as i64 * units.seconds_per_hour() as i64
        + minute as i64 * units.seconds_per_minute as i64
        + second as i64;
    WorldTime::from_secs(seconds)
}

/// Convert the linear seconds counter to a structured date/time
pub fn seconds_to_date(cal: &Calendar, time: WorldTime) -> DateTime {
    let units = cal.time;
    let spd = units.seconds_per_day();
    let (year, month, day) = days_to_date(cal, time.day_number(spd));
    let second_of_day = time.second_of_day(spd);

    let sph = units.seconds_per_hour();
    DateTime {
        year,
        month,
        day,
        hour: second_of_day / sph,
        minute: (second_of_day % sph) / units.seconds_per_minute,
        second: second_of_day % units.seconds_per_minute,
    }
}

/// Apply an interval to a timestamp
///
/// Year and month components move through the structured date: months wrap
/// around the month list and carry into years, and the day is clamped into
/// the target month. Day, hour, minute, and second components are then
/// applied as raw seconds, so overflow in a smaller unit carries into the
/// next larger one naturally.
pub fn timestamp_plus_interval(cal: &Calendar, time: WorldTime, interval: &Interval) -> WorldTime {
    let units = cal.time;
    let mut dt = seconds_to_date(cal, time);

    if interval.year != 0 || interval.month != 0 {
        dt.year += interval.year;
        let shifted = dt.month as i64 + interval.month;
        dt.year += shifted.div_euclid(cal.months.len().max(1) as i64);
        dt.month = wrap_month(cal, shifted);
        dt.day = clamp_day(dt.day, days_in_month(cal, dt.year, dt.month));
    }

    let base = date_to_seconds(cal, &dt);
    let delta = interval.day * units.seconds_per_day() as i64
        + interval.hour * units.seconds_per_hour() as i64
        + interval.minute * units.seconds_per_minute as i64
        + interval.second;
    base.saturating_add_secs(delta)
}

/// Apply an interval to the canonical counter, returning the net day delta
/// actually applied so callers can re-render day-grained views.
pub fn change_date_time(cal: &Calendar, time: &mut WorldTime, interval: &Interval) -> i64 {
    let spd = cal.time.seconds_per_day();
    let before = time.day_number(spd);
    *time = timestamp_plus_interval(cal, *time, interval);
    time.day_number(spd) - before
}
