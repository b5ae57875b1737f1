//! Almanac Clock - Real-time world clock engine
//!
//! The clock engine advances the world-time counter in real time. It is
//! tick-driven: the host loop calls `tick` and the engine reports how many
//! whole game seconds accrued since the previous call, plus whether the
//! slower persistence cadence is due. Only the time-authority client runs
//! a ticking engine; everyone else mirrors broadcast status.

pub mod engine;

pub use engine::*;
