//! Error types for the Almanac protocol

use thiserror::Error;

use crate::{CalendarId, ClientId};

/// Core Almanac errors
#[derive(Error, Debug)]
pub enum AlmanacError {
    // Configuration errors
    #[error("Invalid calendar configuration: {0}")]
    InvalidCalendar(String),

    #[error("Unknown calendar: {0:?}")]
    UnknownCalendar(CalendarId),

    // Authority errors
    #[error("Client {0} is not privileged to change world time")]
    NotPrivileged(ClientId),

    #[error("Client {0} is not the time authority")]
    NotPrimary(ClientId),

    // Envelope errors
    #[error("Unknown message kind: {0}")]
    UnknownMessageKind(String),

    #[error("Malformed message payload: {0}")]
    MalformedPayload(String),

    // Collaborator errors
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Settings store error: {0}")]
    Settings(String),

    #[error("Note store error: {0}")]
    Notes(String),
}

/// Result type for Almanac operations
pub type AlmanacResult<T> = Result<T, AlmanacError>;
