//! Calendar configuration model
//!
//! A `Calendar` describes one named calendar of the world: its ordered
//! months, weekdays, leap-year rule, seasons, moons, and time-unit sizes.
//! The canonical instance is replaced wholesale on reconfiguration;
//! speculative calculations work on a `Clone` so the canonical value is
//! never touched by previews.

use almanac_core::{AlmanacError, AlmanacResult, CalendarId};

/// One month of a calendar year
#[derive(Clone, Debug, PartialEq)]
pub struct Month {
    pub name: String,
    /// Display number (months may be numbered out of positional order)
    pub numeric_representation: i64,
    /// Day count in a normal year
    pub days: u32,
    /// Day count in a leap year
    pub leap_days: u32,
    /// Sits outside the normal yearly cycle
    pub intercalary: bool,
    /// When intercalary, whether its days count toward running totals
    pub intercalary_include: bool,
}

impl Month {
    /// A plain month with the same length in every year
    pub fn new(name: impl Into<String>, numeric_representation: i64, days: u32) -> Self {
        Month {
            name: name.into(),
            numeric_representation,
            days,
            leap_days: days,
            intercalary: false,
            intercalary_include: false,
        }
    }

    pub fn with_leap_days(mut self, leap_days: u32) -> Self {
        self.leap_days = leap_days;
        self
    }

    pub fn intercalary(mut self, include_in_totals: bool) -> Self {
        self.intercalary = true;
        self.intercalary_include = include_in_totals;
        self
    }

    /// Day count for a year of the given leapness
    #[inline]
    pub fn length(&self, leap: bool) -> u32 {
        if leap {
            self.leap_days
        } else {
            self.days
        }
    }

    /// Whether this month's days contribute to running day totals
    #[inline]
    pub fn counts_toward_totals(&self) -> bool {
        !self.intercalary || self.intercalary_include
    }
}

/// One weekday of a calendar
#[derive(Clone, Debug, PartialEq)]
pub struct Weekday {
    pub name: String,
    pub abbreviation: String,
}

impl Weekday {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let abbreviation = name.chars().take(2).collect();
        Weekday { name, abbreviation }
    }
}

/// Leap-year policy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeapYearRule {
    /// Never a leap year
    None,
    /// Standard div-4/100/400 rule
    Gregorian,
    /// Every `modulus` years counted from `starting_year`
    Custom { modulus: u32, starting_year: i64 },
}

impl LeapYearRule {
    /// Is the given year a leap year under this rule?
    ///
    /// Negative years use floor-division modulo so the rule is periodic
    /// across year zero.
    pub fn is_leap_year(&self, year: i64) -> bool {
        match *self {
            LeapYearRule::None => false,
            LeapYearRule::Gregorian => {
                year.rem_euclid(4) == 0
                    && (year.rem_euclid(100) != 0 || year.rem_euclid(400) == 0)
            }
            LeapYearRule::Custom {
                modulus,
                starting_year,
            } => {
                if modulus == 0 {
                    // Rejected at validation; guard keeps preview math total
                    return false;
                }
                (year - starting_year).rem_euclid(modulus as i64) == 0
            }
        }
    }
}

/// A named time-of-year band
///
/// Seasons partition the year. The season containing the last day of the
/// year wraps to cover the start of the next year.
#[derive(Clone, Debug, PartialEq)]
pub struct Season {
    pub name: String,
    /// Month index the season starts in
    pub starting_month: usize,
    /// Day number (1-based) the season starts on
    pub starting_day: u32,
    /// Sunrise, seconds into the day
    pub sunrise: u32,
    /// Sunset, seconds into the day
    pub sunset: u32,
    /// Opaque display tag
    pub color: Option<String>,
}

impl Season {
    pub fn new(
        name: impl Into<String>,
        starting_month: usize,
        starting_day: u32,
        sunrise: u32,
        sunset: u32,
    ) -> Self {
        Season {
            name: name.into(),
            starting_month,
            starting_day,
            sunrise,
            sunset,
            color: None,
        }
    }

    #[inline]
    pub fn start(&self) -> (usize, u32) {
        (self.starting_month, self.starting_day)
    }
}

/// Anchor-year reset policy for a moon's first new moon
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum YearReset {
    /// The anchor year never moves
    Never,
    /// The anchor jumps forward every N years
    EveryYears(u32),
}

/// The reference new-moon date that phase-aligns all later calculations
#[derive(Clone, Debug, PartialEq)]
pub struct MoonAnchor {
    pub year: i64,
    pub month: usize,
    /// Day number, 1-based
    pub day: u32,
    pub year_reset: YearReset,
}

/// One phase of a moon's cycle
#[derive(Clone, Debug, PartialEq)]
pub struct MoonPhase {
    pub name: String,
    /// Fractional days this phase spans
    pub length: f64,
    pub icon: String,
    /// Matches only one specific day of the cycle
    pub single_day: bool,
}

impl MoonPhase {
    pub fn new(name: impl Into<String>, length: f64, icon: impl Into<String>) -> Self {
        MoonPhase {
            name: name.into(),
            length,
            icon: icon.into(),
            single_day: false,
        }
    }

    pub fn single_day(mut self) -> Self {
        self.single_day = true;
        self
    }
}

/// A tracked satellite
#[derive(Clone, Debug, PartialEq)]
pub struct Moon {
    pub name: String,
    /// Cycle length in fractional days
    pub cycle_length: f64,
    pub first_new_moon: MoonAnchor,
    /// Offset applied to elapsed days before reduction into the cycle
    pub cycle_day_adjust: f64,
    pub phases: Vec<MoonPhase>,
}

/// Time-unit sizes of a calendar day
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeUnits {
    pub hours_per_day: u32,
    pub minutes_per_hour: u32,
    pub seconds_per_minute: u32,
}

impl Default for TimeUnits {
    fn default() -> Self {
        TimeUnits {
            hours_per_day: 24,
            minutes_per_hour: 60,
            seconds_per_minute: 60,
        }
    }
}

impl TimeUnits {
    #[inline]
    pub fn seconds_per_hour(&self) -> u32 {
        self.seconds_per_minute * self.minutes_per_hour
    }

    #[inline]
    pub fn seconds_per_day(&self) -> u32 {
        self.seconds_per_hour() * self.hours_per_day
    }
}

/// One named calendar of the world
#[derive(Clone, Debug, PartialEq)]
pub struct Calendar {
    pub id: CalendarId,
    pub name: String,
    pub months: Vec<Month>,
    pub weekdays: Vec<Weekday>,
    /// Weekday index of the epoch day (first day of year zero)
    pub first_weekday: usize,
    pub show_weekday_headings: bool,
    /// The year the linear seconds counter is anchored to
    pub year_zero: i64,
    pub leap_year: LeapYearRule,
    /// Kept sorted by start date
    pub seasons: Vec<Season>,
    pub moons: Vec<Moon>,
    pub time: TimeUnits,
}

impl Calendar {
    /// Check the configuration invariants
    ///
    /// Invalid configuration is rejected here, at load time, rather than
    /// letting the arithmetic proceed on a calendar it cannot resolve.
    pub fn validate(&self) -> AlmanacResult<()> {
        if self.months.is_empty() {
            return Err(AlmanacError::InvalidCalendar(
                "calendar has no months".into(),
            ));
        }
        for month in &self.months {
            if !month.intercalary && month.days == 0 && month.leap_days == 0 {
                return Err(AlmanacError::InvalidCalendar(format!(
                    "month '{}' has zero days in every year",
                    month.name
                )));
            }
        }
        if self.time.hours_per_day == 0
            || self.time.minutes_per_hour == 0
            || self.time.seconds_per_minute == 0
        {
            return Err(AlmanacError::InvalidCalendar(
                "time units must all be at least 1".into(),
            ));
        }
        if self.show_weekday_headings && self.weekdays.is_empty() {
            return Err(AlmanacError::InvalidCalendar(
                "weekday headings enabled with no weekdays".into(),
            ));
        }
        if !self.weekdays.is_empty() && self.first_weekday >= self.weekdays.len() {
            return Err(AlmanacError::InvalidCalendar(format!(
                "first weekday {} out of range",
                self.first_weekday
            )));
        }
        if let LeapYearRule::Custom { modulus: 0, .. } = self.leap_year {
            return Err(AlmanacError::InvalidCalendar(
                "custom leap-year modulus must be at least 1".into(),
            ));
        }
        let spd = self.time.seconds_per_day();
        for season in &self.seasons {
            if season.starting_month >= self.months.len() {
                return Err(AlmanacError::InvalidCalendar(format!(
                    "season '{}' starts in month {} of a {}-month calendar",
                    season.name,
                    season.starting_month,
                    self.months.len()
                )));
            }
            if season.starting_day == 0 {
                return Err(AlmanacError::InvalidCalendar(format!(
                    "season '{}' starting day must be at least 1",
                    season.name
                )));
            }
            if season.sunrise >= spd || season.sunset >= spd {
                return Err(AlmanacError::InvalidCalendar(format!(
                    "season '{}' daylight times exceed the day length",
                    season.name
                )));
            }
        }
        if !self.seasons.windows(2).all(|w| w[0].start() <= w[1].start()) {
            return Err(AlmanacError::InvalidCalendar(
                "seasons must be sorted by start date".into(),
            ));
        }
        for moon in &self.moons {
            if moon.cycle_length <= 0.0 {
                return Err(AlmanacError::InvalidCalendar(format!(
                    "moon '{}' cycle length must be positive",
                    moon.name
                )));
            }
            if moon.phases.is_empty() {
                return Err(AlmanacError::InvalidCalendar(format!(
                    "moon '{}' has no phases",
                    moon.name
                )));
            }
            if moon.first_new_moon.month >= self.months.len() {
                return Err(AlmanacError::InvalidCalendar(format!(
                    "moon '{}' anchors in month {} of a {}-month calendar",
                    moon.name,
                    moon.first_new_moon.month,
                    self.months.len()
                )));
            }
        }
        Ok(())
    }

    /// Sort seasons into start-date order
    pub fn sort_seasons(&mut self) {
        self.seasons.sort_by_key(|s| (s.starting_month, s.starting_day));
    }

    /// A standard Earth calendar, useful as a starting configuration
    pub fn gregorian(id: CalendarId) -> Self {
        let months = [
            ("January", 31, 31),
            ("February", 28, 29),
            ("March", 31, 31),
            ("April", 30, 30),
            ("May", 31, 31),
            ("June", 30, 30),
            ("July", 31, 31),
            ("August", 31, 31),
            ("September", 30, 30),
            ("October", 31, 31),
            ("November", 30, 30),
            ("December", 31, 31),
        ]
        .iter()
        .enumerate()
        .map(|(i, &(name, days, leap_days))| {
            Month::new(name, i as i64 + 1, days).with_leap_days(leap_days)
        })
        .collect();

        let weekdays = [
            "Sunday",
            "Monday",
            "Tuesday",
            "Wednesday",
            "Thursday",
            "Friday",
            "Saturday",
        ]
        .into_iter()
        .map(Weekday::new)
        .collect();

        Calendar {
            id,
            name: "Gregorian".into(),
            months,
            weekdays,
            // 1970-01-01 was a Thursday
            first_weekday: 4,
            show_weekday_headings: true,
            year_zero: 1970,
            leap_year: LeapYearRule::Gregorian,
            seasons: vec![
                Season::new("Spring", 2, 20, 6 * 3600, 18 * 3600),
                Season::new("Summer", 5, 21, 5 * 3600, 21 * 3600),
                Season::new("Fall", 8, 22, 6 * 3600, 18 * 3600),
                Season::new("Winter", 11, 21, 7 * 3600, 17 * 3600),
            ],
            moons: vec![Moon {
                name: "Moon".into(),
                cycle_length: 29.53059,
                first_new_moon: MoonAnchor {
                    year: 2000,
                    month: 0,
                    day: 6,
                    year_reset: YearReset::Never,
                },
                cycle_day_adjust: 0.5,
                phases: vec![
                    MoonPhase::new("New Moon", 1.0, "new").single_day(),
                    MoonPhase::new("Waxing Crescent", 6.38265, "waxing-crescent"),
                    MoonPhase::new("First Quarter", 1.0, "first-quarter").single_day(),
                    MoonPhase::new("Waxing Gibbous", 6.38265, "waxing-gibbous"),
                    MoonPhase::new("Full Moon", 1.0, "full").single_day(),
                    MoonPhase::new("Waning Gibbous", 6.38265, "waning-gibbous"),
                    MoonPhase::new("Last Quarter", 1.0, "last-quarter").single_day(),
                    MoonPhase::new("Waning Crescent", 6.38264, "waning-crescent"),
                ],
            }],
            time: TimeUnits::default(),
        }
    }
}
