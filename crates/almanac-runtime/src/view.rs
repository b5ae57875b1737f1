//! View-model and renderer seam
//!
//! The runtime never renders anything itself: it assembles a plain data
//! object describing what the user should see and hands it to an injected
//! renderer. Hosts bring their own renderer; tests record the data.

use almanac_calendar::{
    daylight_at, phases_on_day, season_at, seconds_to_date, weekday_name, Calendar, DateTime,
    DaylightEdge,
};
use almanac_core::{ClockStatus, WorldTime};
use almanac_sync::NoteRecord;

/// One moon's appearance on the viewed day
#[derive(Clone, Debug, PartialEq)]
pub struct MoonView {
    pub moon: String,
    pub phase: String,
    pub icon: String,
}

/// Everything a renderer needs for one frame
#[derive(Clone, Debug, PartialEq)]
pub struct ViewData {
    pub calendar: String,
    pub date: DateTime,
    pub display_date: String,
    pub display_time: String,
    pub weekday: Option<String>,
    pub season: Option<String>,
    pub sunrise: u32,
    pub sunset: u32,
    pub moons: Vec<MoonView>,
    pub clock_status: ClockStatus,
    pub is_primary: bool,
    pub notes: Vec<NoteRecord>,
}

impl ViewData {
    /// Assemble the view for a calendar at a point in world time
    pub fn assemble(
        cal: &Calendar,
        time: WorldTime,
        clock_status: ClockStatus,
        is_primary: bool,
        notes: Vec<NoteRecord>,
    ) -> ViewData {
        let date = seconds_to_date(cal, time);
        let month_name = cal
            .months
            .get(date.month)
            .map(|m| m.name.as_str())
            .unwrap_or("?");

        ViewData {
            calendar: cal.name.clone(),
            date,
            display_date: format!("{} {}, {}", month_name, date.day, date.year),
            display_time: format!("{:02}:{:02}:{:02}", date.hour, date.minute, date.second),
            weekday: weekday_name(cal, date.year, date.month, date.day).map(str::to_owned),
            season: season_at(cal, date.month, date.day).map(|(_, s)| s.name.clone()),
            sunrise: daylight_at(cal, date.year, date.month, date.day, DaylightEdge::Sunrise),
            sunset: daylight_at(cal, date.year, date.month, date.day, DaylightEdge::Sunset),
            moons: phases_on_day(cal, date.year, date.month, date.day)
                .into_iter()
                .map(|(moon, phase)| MoonView {
                    moon: moon.name.clone(),
                    phase: phase.name.clone(),
                    icon: phase.icon.clone(),
                })
                .collect(),
            clock_status,
            is_primary,
            notes,
        }
    }
}

/// Consumes assembled view data; injected by the host
pub trait Renderer {
    fn render(&mut self, data: &ViewData);
}

#[cfg(test)]
mod tests {
    use almanac_core::CalendarId;

    use super::*;

    #[test]
    fn test_assemble_gregorian_epoch() {
        let cal = Calendar::gregorian(CalendarId::new(1));
        let data = ViewData::assemble(&cal, WorldTime::ZERO, ClockStatus::Stopped, false, vec![]);

        assert_eq!(data.calendar, "Gregorian");
        assert_eq!(data.display_date, "January 1, 1970");
        assert_eq!(data.display_time, "00:00:00");
        assert_eq!(data.weekday.as_deref(), Some("Thursday"));
        assert_eq!(data.season.as_deref(), Some("Winter"));
        assert_eq!(data.moons.len(), 1);
        assert!(!data.is_primary);
    }

    #[test]
    fn test_assemble_formats_time_of_day() {
        let cal = Calendar::gregorian(CalendarId::new(1));
        let time = WorldTime::from_secs(13 * 3600 + 5 * 60 + 9);
        let data = ViewData::assemble(&cal, time, ClockStatus::Started, true, vec![]);

        assert_eq!(data.display_time, "13:05:09");
        assert_eq!(data.clock_status, ClockStatus::Started);
        assert!(data.is_primary);
    }
}
