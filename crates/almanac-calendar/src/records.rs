//! Persisted configuration records
//!
//! Flat, JSON-serializable shapes exchanged with the external settings
//! store: one record per configuration entity, bundled per calendar. Field
//! names stay camelCase on the wire to match the store's existing data.

use almanac_core::{AlmanacError, AlmanacResult, CalendarId};
use serde::{Deserialize, Serialize};

use crate::config::{
    Calendar, LeapYearRule, Month, Moon, MoonAnchor, MoonPhase, Season, TimeUnits, Weekday,
    YearReset,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRecord {
    pub year_zero: i64,
    pub first_weekday: usize,
    pub show_weekday_headings: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthRecord {
    pub name: String,
    pub numeric_representation: i64,
    pub number_of_days: u32,
    pub number_of_leap_year_days: u32,
    pub intercalary: bool,
    pub intercalary_include: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayRecord {
    pub numeric_representation: usize,
    pub name: String,
    pub abbreviation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeapYearRecord {
    /// `none`, `gregorian`, or `custom`
    pub rule: String,
    #[serde(default)]
    pub custom_mod: u32,
    #[serde(default)]
    pub starting_year: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRecord {
    pub hours_in_day: u32,
    pub minutes_in_hour: u32,
    pub seconds_in_minute: u32,
    /// Game seconds advanced per elapsed real second
    pub game_time_ratio: f64,
    /// Pause the game clock alongside the host's own pause state
    pub unify_game_and_clock_pause: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonRecord {
    pub name: String,
    pub starting_month: usize,
    pub starting_day: u32,
    pub sunrise_time: u32,
    pub sunset_time: u32,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstNewMoonRecord {
    /// `none` or `x-years`
    pub year_reset: String,
    pub year: i64,
    #[serde(default)]
    pub year_x: u32,
    pub month: usize,
    pub day: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoonPhaseRecord {
    pub name: String,
    pub length: f64,
    pub icon: String,
    pub single_day: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoonRecord {
    pub name: String,
    pub cycle_length: f64,
    pub first_new_moon: FirstNewMoonRecord,
    #[serde(default)]
    pub cycle_day_adjust: f64,
    pub phases: Vec<MoonPhaseRecord>,
}

/// The full persisted bundle for one calendar
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarRecord {
    pub id: u64,
    pub name: String,
    pub year: YearRecord,
    pub months: Vec<MonthRecord>,
    pub weekdays: Vec<WeekdayRecord>,
    pub leap_year: LeapYearRecord,
    pub time: TimeRecord,
    pub seasons: Vec<SeasonRecord>,
    pub moons: Vec<MoonRecord>,
}

impl Calendar {
    /// Build a validated calendar from its persisted record
    ///
    /// Seasons are sorted into start order before validation; any
    /// configuration problem surfaces here, before arithmetic runs on it.
    pub fn from_record(record: &CalendarRecord) -> AlmanacResult<Calendar> {
        let leap_year = match record.leap_year.rule.as_str() {
            "none" => LeapYearRule::None,
            "gregorian" => LeapYearRule::Gregorian,
            "custom" => LeapYearRule::Custom {
                modulus: record.leap_year.custom_mod,
                starting_year: record.leap_year.starting_year,
            },
            other => {
                return Err(AlmanacError::InvalidCalendar(format!(
                    "unknown leap-year rule '{other}'"
                )))
            }
        };

        let mut calendar = Calendar {
            id: CalendarId::new(record.id),
            name: record.name.clone(),
            months: record
                .months
                .iter()
                .map(|m| Month {
                    name: m.name.clone(),
                    numeric_representation: m.numeric_representation,
                    days: m.number_of_days,
                    leap_days: m.number_of_leap_year_days,
                    intercalary: m.intercalary,
                    intercalary_include: m.intercalary_include,
                })
                .collect(),
            weekdays: record
                .weekdays
                .iter()
                .map(|w| Weekday {
                    name: w.name.clone(),
                    abbreviation: w.abbreviation.clone(),
                })
                .collect(),
            first_weekday: record.year.first_weekday,
            show_weekday_headings: record.year.show_weekday_headings,
            year_zero: record.year.year_zero,
            leap_year,
            seasons: record
                .seasons
                .iter()
                .map(|s| Season {
                    name: s.name.clone(),
                    starting_month: s.starting_month,
                    starting_day: s.starting_day,
                    sunrise: s.sunrise_time,
                    sunset: s.sunset_time,
                    color: s.color.clone(),
                })
                .collect(),
            moons: record
                .moons
                .iter()
                .map(|m| {
                    let reset = match m.first_new_moon.year_reset.as_str() {
                        "x-years" => YearReset::EveryYears(m.first_new_moon.year_x),
                        _ => YearReset::Never,
                    };
                    Moon {
                        name: m.name.clone(),
                        cycle_length: m.cycle_length,
                        first_new_moon: MoonAnchor {
                            year: m.first_new_moon.year,
                            month: m.first_new_moon.month,
                            day: m.first_new_moon.day,
                            year_reset: reset,
                        },
                        cycle_day_adjust: m.cycle_day_adjust,
                        phases: m
                            .phases
                            .iter()
                            .map(|p| MoonPhase {
                                name: p.name.clone(),
                                length: p.length,
                                icon: p.icon.clone(),
                                single_day: p.single_day,
                            })
                            .collect(),
                    }
                })
                .collect(),
            time: TimeUnits {
                hours_per_day: record.time.hours_in_day,
                minutes_per_hour: record.time.minutes_in_hour,
                seconds_per_minute: record.time.seconds_in_minute,
            },
        };

        calendar.sort_seasons();
        calendar.validate()?;
        Ok(calendar)
    }

    /// Flatten this calendar back into its persisted record
    ///
    /// The clock fields of the time record are owned by the clock
    /// configuration; callers merge them in before saving.
    pub fn to_record(&self, game_time_ratio: f64, unify_game_and_clock_pause: bool) -> CalendarRecord {
        CalendarRecord {
            id: self.id.0,
            name: self.name.clone(),
            year: YearRecord {
                year_zero: self.year_zero,
                first_weekday: self.first_weekday,
                show_weekday_headings: self.show_weekday_headings,
            },
            months: self
                .months
                .iter()
                .map(|m| MonthRecord {
                    name: m.name.clone(),
                    numeric_representation: m.numeric_representation,
                    number_of_days: m.days,
                    number_of_leap_year_days: m.leap_days,
                    intercalary: m.intercalary,
                    intercalary_include: m.intercalary_include,
                })
                .collect(),
            weekdays: self
                .weekdays
                .iter()
                .enumerate()
                .map(|(i, w)| WeekdayRecord {
                    numeric_representation: i,
                    name: w.name.clone(),
                    abbreviation: w.abbreviation.clone(),
                })
                .collect(),
            leap_year: match self.leap_year {
                LeapYearRule::None => LeapYearRecord {
                    rule: "none".into(),
                    custom_mod: 0,
                    starting_year: 0,
                },
                LeapYearRule::Gregorian => LeapYearRecord {
                    rule: "gregorian".into(),
                    custom_mod: 0,
                    starting_year: 0,
                },
                LeapYearRule::Custom {
                    modulus,
                    starting_year,
                } => LeapYearRecord {
                    rule: "custom".into(),
                    custom_mod: modulus,
                    starting_year,
                },
            },
            time: TimeRecord {
                hours_in_day: self.time.hours_per_day,
                minutes_in_hour: self.time.minutes_per_hour,
                seconds_in_minute: self.time.seconds_per_minute,
                game_time_ratio,
                unify_game_and_clock_pause,
            },
            seasons: self
                .seasons
                .iter()
                .map(|s| SeasonRecord {
                    name: s.name.clone(),
                    starting_month: s.starting_month,
                    starting_day: s.starting_day,
                    sunrise_time: s.sunrise,
                    sunset_time: s.sunset,
                    color: s.color.clone(),
                })
                .collect(),
            moons: self
                .moons
                .iter()
                .map(|m| MoonRecord {
                    name: m.name.clone(),
                    cycle_length: m.cycle_length,
                    first_new_moon: FirstNewMoonRecord {
                        year_reset: match m.first_new_moon.year_reset {
                            YearReset::Never => "none".into(),
                            YearReset::EveryYears(_) => "x-years".into(),
                        },
                        year: m.first_new_moon.year,
                        year_x: match m.first_new_moon.year_reset {
                            YearReset::EveryYears(x) => x,
                            YearReset::Never => 0,
                        },
                        month: m.first_new_moon.month,
                        day: m.first_new_moon.day,
                    },
                    cycle_day_adjust: m.cycle_day_adjust,
                    phases: m
                        .phases
                        .iter()
                        .map(|p| MoonPhaseRecord {
                            name: p.name.clone(),
                            length: p.length,
                            icon: p.icon.clone(),
                            single_day: p.single_day,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}
