//! Clock status and day presets

use std::fmt;

use serde::{Deserialize, Serialize};

/// Running state of the world clock
///
/// Only one status holds at a time; every transition is broadcast so all
/// connected clients render the same state.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClockStatus {
    #[default]
    Stopped,
    Started,
    Paused,
}

impl ClockStatus {
    /// Is the clock consuming real time?
    #[inline]
    pub fn is_running(self) -> bool {
        self == ClockStatus::Started
    }
}

impl fmt::Display for ClockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockStatus::Stopped => write!(f, "stopped"),
            ClockStatus::Started => write!(f, "started"),
            ClockStatus::Paused => write!(f, "paused"),
        }
    }
}

/// Named time-of-day targets for "advance to" requests
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayPreset {
    Sunrise,
    Midday,
    Sunset,
    Midnight,
}
