//! Identity types for the Almanac protocol
//!
//! All identifiers are 64-bit: small enough to ride in every envelope,
//! unique enough for any realistic table of connected clients.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Client identity - one connected client of the shared world
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ClientId(pub u64);

impl ClientId {
    pub const ZERO: ClientId = ClientId(0);

    #[inline]
    pub fn new(id: u64) -> Self {
        ClientId(id)
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        ClientId(u64::from_le_bytes(bytes))
    }
}

impl fmt::Debug for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Client({:016x})", self.0)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Calendar identity - one configured calendar of the world
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CalendarId(pub u64);

impl CalendarId {
    pub const ZERO: CalendarId = CalendarId(0);

    #[inline]
    pub fn new(id: u64) -> Self {
        CalendarId(id)
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        CalendarId(u64::from_le_bytes(bytes))
    }
}

impl fmt::Debug for CalendarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Calendar({:016x})", self.0)
    }
}

impl fmt::Display for CalendarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_roundtrip() {
        let id = ClientId::new(0xDEADBEEF_CAFEBABE);
        let bytes = id.to_bytes();
        let recovered = ClientId::from_bytes(bytes);
        assert_eq!(id, recovered);
    }

    #[test]
    fn test_calendar_id_display() {
        let id = CalendarId::new(0x42);
        assert_eq!(format!("{}", id), "0000000000000042");
    }
}
