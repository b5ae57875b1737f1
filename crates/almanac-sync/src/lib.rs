//! Almanac Sync - Time-authority protocol
//!
//! This crate implements the distributed side of the protocol:
//! - The closed broadcast message taxonomy and its JSON envelope
//! - Leader election: which privileged client holds time authority
//! - The guarded dispatch chain that routes incoming messages

pub mod election;
pub mod message;
pub mod router;

pub use election::*;
pub use message::*;
pub use router::*;
