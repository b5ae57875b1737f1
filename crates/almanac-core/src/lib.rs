//! Almanac Core - Fundamental types and primitives
//!
//! This crate defines the core types used throughout the Almanac protocol:
//! - Identifiers (ClientId, CalendarId)
//! - Linear world time and sub-day clock primitives
//! - Date/time intervals and clock status
//! - Protocol errors

pub mod error;
pub mod id;
pub mod interval;
pub mod status;
pub mod time;

pub use error::*;
pub use id::*;
pub use interval::*;
pub use status::*;
pub use time::*;
