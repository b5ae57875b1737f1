//! Almanac Calendar - Calendar model and date arithmetic
//!
//! This crate implements the calendar engine:
//! - Calendar configuration (months, weekdays, leap-year rule, seasons, moons)
//! - Flat persisted-record serialization for the external settings store
//! - Conversion between the linear world-time counter and structured dates
//! - Weekday, season (sunrise/sunset), and moon-phase calculators

pub mod config;
pub mod math;
pub mod moon;
pub mod records;
pub mod season;
pub mod weekday;

pub use config::*;
pub use math::*;
pub use moon::*;
pub use records::*;
pub use season::*;
pub use weekday::*;
