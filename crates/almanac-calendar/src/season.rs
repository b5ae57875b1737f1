//! Season calculator
//!
//! Seasons are bands over the year keyed by a starting date. Sunrise and
//! sunset shift gradually across a season's span toward the next season's
//! values instead of jumping at the boundary.

use crate::config::{Calendar, Season};
use crate::math::date_to_days;

/// Which edge of the daylight band to compute
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DaylightEdge {
    Sunrise,
    Sunset,
}

/// The season a date falls in
///
/// Linear scan of the start-sorted season list: the last season whose start
/// is at or before the date wins. A date before every start belongs to the
/// final season, wrapped over from the previous year.
pub fn season_at(cal: &Calendar, month: usize, day: u32) -> Option<(usize, &Season)> {
    if cal.seasons.is_empty() {
        return None;
    }
    let mut current = None;
    for (index, season) in cal.seasons.iter().enumerate() {
        if season.start() <= (month, day) {
            current = Some((index, season));
        }
    }
    current.or_else(|| {
        let last = cal.seasons.len() - 1;
        Some((last, &cal.seasons[last]))
    })
}

/// Sunrise or sunset time for a date, seconds into the day
///
/// Interpolates between the current season's value and the next season's,
/// scaled by how far the date sits inside the current season's span. Spans
/// crossing the year boundary are measured on the absolute day line.
pub fn daylight_at(cal: &Calendar, year: i64, month: usize, day: u32, edge: DaylightEdge) -> u32 {
    let Some((index, current)) = season_at(cal, month, day) else {
        return 0;
    };
    let next = &cal.seasons[(index + 1) % cal.seasons.len()];

    let date = date_to_days(cal, year, month, day, false, false);

    // Most recent occurrence of the current season's start at or before the
    // date; a wrapped season started in the previous year.
    let mut start_year = year;
    let mut start =
        date_to_days(cal, start_year, current.starting_month, current.starting_day, false, false);
    if start > date {
        start_year = year - 1;
        start = date_to_days(
            cal,
            start_year,
            current.starting_month,
            current.starting_day,
            false,
            false,
        );
    }

    // First occurrence of the next season's start after the current one
    let mut end =
        date_to_days(cal, start_year, next.starting_month, next.starting_day, false, false);
    if end <= start {
        end = date_to_days(
            cal,
            start_year + 1,
            next.starting_month,
            next.starting_day,
            false,
            false,
        );
    }

    let span = (end - start).max(1);
    let fraction = (date - start).clamp(0, span) as f64 / span as f64;

    let (from, to) = match edge {
        DaylightEdge::Sunrise => (current.sunrise, next.sunrise),
        DaylightEdge::Sunset => (current.sunset, next.sunset),
    };
    let value = from as f64 + (to as f64 - from as f64) * fraction;
    (value.round() as i64).clamp(0, cal.time.seconds_per_day() as i64 - 1) as u32
}

#[cfg(test)]
mod tests {
    use almanac_core::CalendarId;

    use super::*;

    fn calendar() -> Calendar {
        Calendar::gregorian(CalendarId::new(1))
    }

    #[test]
    fn test_season_lookup() {
        let cal = calendar();
        assert_eq!(season_at(&cal, 3, 10).map(|(_, s)| s.name.as_str()), Some("Spring"));
        assert_eq!(season_at(&cal, 6, 1).map(|(_, s)| s.name.as_str()), Some("Summer"));
        assert_eq!(season_at(&cal, 11, 25).map(|(_, s)| s.name.as_str()), Some("Winter"));
    }

    #[test]
    fn test_season_start_day_matches() {
        let cal = calendar();
        assert_eq!(season_at(&cal, 2, 20).map(|(_, s)| s.name.as_str()), Some("Spring"));
        assert_eq!(season_at(&cal, 2, 19).map(|(_, s)| s.name.as_str()), Some("Winter"));
    }

    #[test]
    fn test_date_before_first_season_wraps_to_last() {
        let cal = calendar();
        // Mid-January precedes every season start: winter wrapped over
        assert_eq!(season_at(&cal, 0, 15).map(|(_, s)| s.name.as_str()), Some("Winter"));
    }

    #[test]
    fn test_no_seasons() {
        let mut cal = calendar();
        cal.seasons.clear();
        assert!(season_at(&cal, 0, 1).is_none());
        assert_eq!(daylight_at(&cal, 2000, 0, 1, DaylightEdge::Sunrise), 0);
    }

    #[test]
    fn test_daylight_at_season_start_is_exact() {
        let cal = calendar();
        assert_eq!(
            daylight_at(&cal, 2001, 2, 20, DaylightEdge::Sunrise),
            6 * 3600
        );
        assert_eq!(
            daylight_at(&cal, 2001, 2, 20, DaylightEdge::Sunset),
            18 * 3600
        );
    }

    #[test]
    fn test_daylight_shifts_gradually() {
        let cal = calendar();
        // Spring runs toward summer's earlier sunrise: strictly between the
        // two endpoint values partway through the span.
        let mid = daylight_at(&cal, 2001, 4, 5, DaylightEdge::Sunrise);
        assert!(mid < 6 * 3600);
        assert!(mid > 5 * 3600);

        // Adjacent days move by at most a few minutes, never a step
        let a = daylight_at(&cal, 2001, 4, 5, DaylightEdge::Sunrise);
        let b = daylight_at(&cal, 2001, 4, 6, DaylightEdge::Sunrise);
        assert!(a.abs_diff(b) < 300);
    }

    #[test]
    fn test_daylight_continuity_at_boundary() {
        let cal = calendar();
        // Last day of spring vs first day of summer
        let before = daylight_at(&cal, 2001, 5, 20, DaylightEdge::Sunrise);
        let at = daylight_at(&cal, 2001, 5, 21, DaylightEdge::Sunrise);
        assert!(before.abs_diff(at) < 300);
    }

    #[test]
    fn test_daylight_wrapped_season_january() {
        let cal = calendar();
        // January sits inside wrapped winter, interpolating toward spring
        let value = daylight_at(&cal, 2001, 0, 15, DaylightEdge::Sunrise);
        assert!(value <= 7 * 3600);
        assert!(value >= 6 * 3600);
    }

    #[test]
    fn test_single_season_is_constant() {
        let mut cal = calendar();
        cal.seasons.truncate(1);
        let a = daylight_at(&cal, 2001, 0, 1, DaylightEdge::Sunset);
        let b = daylight_at(&cal, 2001, 7, 15, DaylightEdge::Sunset);
        assert_eq!(a, 18 * 3600);
        assert_eq!(b, 18 * 3600);
    }
}
