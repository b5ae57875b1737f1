//! Moon phase calculator
//!
//! Every moon is phase-aligned to its first new-moon anchor date. Elapsed
//! days between a date and the anchor reduce modulo the cycle length, then
//! the ordered phase list is walked until the remainder falls inside a
//! phase's span.

use crate::config::{Calendar, Moon, MoonPhase, YearReset};
use crate::math::date_to_days;

/// Effective anchor year for a date under the moon's reset policy
fn anchor_year(moon: &Moon, year: i64) -> i64 {
    let anchor = &moon.first_new_moon;
    match anchor.year_reset {
        YearReset::Never => anchor.year,
        YearReset::EveryYears(every) => {
            if every == 0 {
                return anchor.year;
            }
            let every = every as i64;
            anchor.year + (year - anchor.year).div_euclid(every) * every
        }
    }
}

/// Days into the moon's cycle for a date, in `[0, cycle_length)`
pub fn days_into_cycle(cal: &Calendar, moon: &Moon, year: i64, month: usize, day: u32) -> f64 {
    let anchor = &moon.first_new_moon;
    let anchor_days = date_to_days(
        cal,
        anchor_year(moon, year),
        anchor.month,
        anchor.day,
        true,
        true,
    );
    let date_days = date_to_days(cal, year, month, day, true, true);
    let elapsed = (date_days - anchor_days) as f64 + moon.cycle_day_adjust;
    elapsed.rem_euclid(moon.cycle_length)
}

/// The phase a moon shows on a date
///
/// Walks the ordered phase list accumulating spans; single-day phases span
/// exactly their one day. The final phase absorbs fractional-sum drift, so
/// every day offset resolves to exactly one phase. `None` only for a moon
/// with no phases, which validation rejects.
pub fn phase_at<'a>(
    cal: &Calendar,
    moon: &'a Moon,
    year: i64,
    month: usize,
    day: u32,
) -> Option<&'a MoonPhase> {
    if moon.phases.is_empty() {
        return None;
    }
    let position = days_into_cycle(cal, moon, year, month, day);

    let mut accumulated = 0.0;
    for phase in &moon.phases {
        let span = if phase.single_day { 1.0 } else { phase.length };
        if position < accumulated + span {
            return Some(phase);
        }
        accumulated += span;
    }
    moon.phases.last()
}

/// Every moon's phase for a date
pub fn phases_on_day<'a>(
    cal: &'a Calendar,
    year: i64,
    month: usize,
    day: u32,
) -> Vec<(&'a Moon, &'a MoonPhase)> {
    cal.moons
        .iter()
        .filter_map(|moon| phase_at(cal, moon, year, month, day).map(|phase| (moon, phase)))
        .collect()
}

#[cfg(test)]
mod tests {
    use almanac_core::CalendarId;

    use super::*;
    use crate::config::MoonAnchor;

    fn calendar() -> Calendar {
        Calendar::gregorian(CalendarId::new(1))
    }

    #[test]
    fn test_anchor_day_is_new_moon() {
        let cal = calendar();
        let moon = &cal.moons[0];
        // 2000-01-06 anchors the cycle; adjust of 0.5 keeps it inside the
        // single-day new-moon span.
        let phase = phase_at(&cal, moon, 2000, 0, 6).unwrap();
        assert_eq!(phase.name, "New Moon");
    }

    #[test]
    fn test_full_moon_midway_through_cycle() {
        let cal = calendar();
        let moon = &cal.moons[0];
        // Fifteen days past the anchor lands in the full-moon day
        let phase = phase_at(&cal, moon, 2000, 0, 21).unwrap();
        assert_eq!(phase.name, "Full Moon");
    }

    #[test]
    fn test_phase_before_anchor_wraps_backward() {
        let cal = calendar();
        let moon = &cal.moons[0];
        // Dates before the anchor still resolve: the remainder wraps to the
        // tail of the cycle.
        let phase = phase_at(&cal, moon, 1999, 11, 30).unwrap();
        assert!(!phase.name.is_empty());
        let position = days_into_cycle(&cal, moon, 1999, 11, 30);
        assert!(position >= 0.0 && position < moon.cycle_length);
    }

    #[test]
    fn test_phase_totality_across_cycle() {
        let cal = calendar();
        let moon = &cal.moons[0];
        // Every day of several consecutive cycles matches exactly one phase
        for offset in 0..90 {
            let day = 1 + offset % 28;
            let month = (offset / 28) as usize % 12;
            let phase = phase_at(&cal, moon, 2001, month, day);
            assert!(phase.is_some());
        }
    }

    #[test]
    fn test_year_reset_every_x_years() {
        let mut cal = calendar();
        cal.moons[0].first_new_moon = MoonAnchor {
            year: 2000,
            month: 0,
            day: 6,
            year_reset: YearReset::EveryYears(5),
        };
        let moon = cal.moons[0].clone();

        // Within the first window the anchor stays put
        assert_eq!(anchor_year(&moon, 2003), 2000);
        // The next window re-anchors
        assert_eq!(anchor_year(&moon, 2005), 2005);
        assert_eq!(anchor_year(&moon, 2011), 2010);
        // Floor division keeps windows aligned before the anchor too
        assert_eq!(anchor_year(&moon, 1999), 1995);

        // Re-anchoring makes the same calendar date repeat its phase
        let a = phase_at(&cal, &moon, 2000, 0, 6).unwrap();
        let b = phase_at(&cal, &moon, 2005, 0, 6).unwrap();
        assert_eq!(a.name, b.name);
    }

    #[test]
    fn test_cycle_day_adjust_shifts_phase() {
        let cal = calendar();
        let mut moon = cal.moons[0].clone();
        let base = days_into_cycle(&cal, &moon, 2000, 0, 20);
        moon.cycle_day_adjust += 1.0;
        let shifted = days_into_cycle(&cal, &moon, 2000, 0, 20);
        let expected = (base + 1.0).rem_euclid(moon.cycle_length);
        assert!((shifted - expected).abs() < 1e-9);
    }

    #[test]
    fn test_single_day_phase_spans_one_day() {
        let cal = calendar();
        let moon = &cal.moons[0];
        // The day after the new moon is already waxing
        let phase = phase_at(&cal, moon, 2000, 0, 7).unwrap();
        assert_eq!(phase.name, "Waxing Crescent");
    }

    #[test]
    fn test_moon_without_phases_yields_none() {
        let cal = calendar();
        let mut moon = cal.moons[0].clone();
        moon.phases.clear();
        assert!(phase_at(&cal, &moon, 2000, 0, 6).is_none());
    }
}
