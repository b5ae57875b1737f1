//! Almanac Runtime - The per-client node
//!
//! One `Client` per connected participant: it loads configuration from the
//! settings store, runs the election when privileged, drives the clock
//! engine while it holds authority, routes broadcast messages, and feeds a
//! view-model to an injected renderer. External collaborators (settings,
//! notes, transport, renderer) are explicitly passed handles; the runtime
//! keeps no global state.

pub mod client;
pub mod stores;
pub mod view;

pub use client::*;
pub use stores::*;
pub use view::*;
