//! Broadcast message taxonomy
//!
//! Every message on the shared channel is a `{type, data}` envelope with a
//! kind from a closed set and a kind-specific payload. The payload union is
//! a proper tagged variant keyed by the envelope's `type` field.

use almanac_core::{
    AlmanacError, AlmanacResult, CalendarId, ClientId, ClockStatus, DayPreset, Interval, WorldTime,
};
use serde::{Deserialize, Serialize};

/// A date/time mutation request or announcement
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
#[serde(tag = "subtype", rename_all = "kebab-case")]
pub enum DateTimeChange {
    /// Advance or rewind by a signed interval
    Delta { interval: Interval },
    /// Set the canonical counter outright; also how the authority announces
    /// the result of an applied change
    Absolute { timestamp: WorldTime },
    /// Jump forward to the next occurrence of a named time of day
    Preset { preset: DayPreset },
}

/// A note persisted against a calendar date
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub year: i64,
    pub month: usize,
    pub day: u32,
    pub author: ClientId,
}

/// The closed set of broadcast message kinds
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum Message {
    /// "Who is primary?" - sent by a privileged client on startup
    PrimaryProbe,
    /// "I am primary" - answers probes and announces self-promotion
    PrimaryResponse,
    /// Clock status transition, mirrored by every client
    ClockStatus(ClockStatus),
    /// Date/time mutation request or canonical announcement
    DateTimeChange(DateTimeChange),
    /// Swap the in-use calendar
    CalendarSwitch(CalendarId),
    /// Trigger a local re-render, optionally for one client only
    AppRefresh { target: Option<ClientId> },
    /// Forward a note to the external note store
    NoteSave(NoteRecord),
}

/// Envelope kinds, in dispatch order
pub const MESSAGE_KINDS: [&str; 7] = [
    "primary-probe",
    "primary-response",
    "clock-status",
    "date-time-change",
    "calendar-switch",
    "app-refresh",
    "note-save",
];

impl Message {
    /// The envelope `type` field for this message
    pub fn kind(&self) -> &'static str {
        match self {
            Message::PrimaryProbe => "primary-probe",
            Message::PrimaryResponse => "primary-response",
            Message::ClockStatus(_) => "clock-status",
            Message::DateTimeChange(_) => "date-time-change",
            Message::CalendarSwitch(_) => "calendar-switch",
            Message::AppRefresh { .. } => "app-refresh",
            Message::NoteSave(_) => "note-save",
        }
    }

    /// Encode to the JSON envelope
    pub fn to_json(&self) -> AlmanacResult<String> {
        serde_json::to_string(self).map_err(|e| AlmanacError::MalformedPayload(e.to_string()))
    }

    /// Decode from the JSON envelope
    ///
    /// An unrecognized `type` is reported by name so the router can log and
    /// drop it; a recognized kind with a bad payload is a malformed message.
    pub fn from_json(json: &str) -> AlmanacResult<Message> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| AlmanacError::MalformedPayload(e.to_string()))?;
        let kind = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| AlmanacError::MalformedPayload("envelope has no type".into()))?;
        if !MESSAGE_KINDS.contains(&kind) {
            return Err(AlmanacError::UnknownMessageKind(kind.to_owned()));
        }
        serde_json::from_value(value).map_err(|e| AlmanacError::MalformedPayload(e.to_string()))
    }
}
