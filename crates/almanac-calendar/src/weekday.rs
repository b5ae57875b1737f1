//! Weekday calculator

use crate::config::Calendar;
use crate::math::date_to_days;

/// Weekday index of a date, always in `[0, weekdays.len())`
///
/// Negative day totals (dates before year zero) normalize with
/// floor-division modulo, so the week cycles cleanly across the epoch.
pub fn day_of_week(cal: &Calendar, year: i64, month: usize, day: u32) -> usize {
    if cal.weekdays.is_empty() {
        return 0;
    }
    let days = date_to_days(cal, year, month, day, false, false);
    (days + cal.first_weekday as i64).rem_euclid(cal.weekdays.len() as i64) as usize
}

/// Weekday name of a date, if the calendar has weekdays
pub fn weekday_name(cal: &Calendar, year: i64, month: usize, day: u32) -> Option<&str> {
    cal.weekdays
        .get(day_of_week(cal, year, month, day))
        .map(|w| w.name.as_str())
}

#[cfg(test)]
mod tests {
    use almanac_core::CalendarId;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_epoch_day_is_first_weekday() {
        let cal = Calendar::gregorian(CalendarId::new(1));
        // 1970-01-01 was a Thursday
        assert_eq!(weekday_name(&cal, 1970, 0, 1), Some("Thursday"));
    }

    #[test]
    fn test_known_gregorian_weekdays() {
        let cal = Calendar::gregorian(CalendarId::new(1));
        // 2023-01-01 was a Sunday
        assert_eq!(weekday_name(&cal, 2023, 0, 1), Some("Sunday"));
        // 2000-02-29 was a Tuesday
        assert_eq!(weekday_name(&cal, 2000, 1, 29), Some("Tuesday"));
    }

    #[test]
    fn test_negative_years_stay_in_range() {
        let cal = Calendar::gregorian(CalendarId::new(1));
        // 1969-12-31 was a Wednesday, one weekday before the epoch day
        assert_eq!(weekday_name(&cal, 1969, 11, 31), Some("Wednesday"));
        let index = day_of_week(&cal, -44, 2, 15);
        assert!(index < cal.weekdays.len());
    }

    #[test]
    fn test_no_weekdays_defaults_to_zero() {
        let mut cal = Calendar::gregorian(CalendarId::new(1));
        cal.weekdays.clear();
        cal.show_weekday_headings = false;
        cal.first_weekday = 0;
        assert_eq!(day_of_week(&cal, 2000, 0, 1), 0);
    }

    proptest! {
        #[test]
        fn prop_weekday_always_in_range(
            year in -3000i64..3000,
            month in 0usize..12,
            day in 1u32..=31,
        ) {
            let cal = Calendar::gregorian(CalendarId::new(1));
            let index = day_of_week(&cal, year, month, day);
            prop_assert!(index < cal.weekdays.len());
        }
    }
}
