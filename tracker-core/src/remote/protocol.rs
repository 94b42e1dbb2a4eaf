//! Defines the JSON protocol used for communication between the tracker
//! core and provider binaries over stdin/stdout.
//!
//! Raw records mirror what calendar APIs return; they are only turned into
//! [`Event`](crate::event::Event)s by the normalizer.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    ListSources,
    ListEvents,
    GetEvent,
}

/// Request sent from the core to a provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from a provider to the core.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success {
        data: T,
    },
    Error {
        error: String,
        /// HTTP-like status of the upstream failure (e.g. 401 for expired credentials)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<u16>,
    },
}

// ============================================================================
// Raw records
// ============================================================================

/// Start or end of a raw event: exactly one of `date` / `date_time` is
/// expected to be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEventTime {
    /// YYYY-MM-DD for all-day events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// RFC3339 instant for timed events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttendee {
    #[serde(default)]
    pub display_name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub response_status: Option<String>,
}

/// An event as returned by a provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start: Option<RawEventTime>,
    #[serde(default)]
    pub end: Option<RawEventTime>,
    #[serde(default)]
    pub recurrence: Option<Vec<String>>,
    #[serde(default)]
    pub recurring_event_id: Option<String>,
    /// "default", "outOfOffice", "focusTime", ...
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub attendees: Vec<RawAttendee>,
    #[serde(default)]
    pub color_id: Option<String>,
}

/// A calendar as listed by a provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSource {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
    /// "owner", "writer", "reader", "freeBusyReader"
    #[serde(default)]
    pub access_role: Option<String>,
    #[serde(default)]
    pub selected: Option<bool>,
    #[serde(default)]
    pub primary: bool,
}

// ============================================================================
// Commands
// ============================================================================

/// List all calendars of an account.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListSources {
    pub account_identifier: String,
}

impl ProviderCommand for ListSources {
    type Response = Vec<RawSource>;
    fn command() -> Command {
        Command::ListSources
    }
}

/// List expanded event instances of one calendar within a time window.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListEvents {
    pub account_identifier: String,
    pub source_id: String,
    pub from: String,
    pub to: String,
}

impl ProviderCommand for ListEvents {
    type Response = Vec<RawEvent>;
    fn command() -> Command {
        Command::ListEvents
    }
}

/// Fetch a single event by id (used to look up recurring masters).
#[derive(Debug, Serialize, Deserialize)]
pub struct GetEvent {
    pub account_identifier: String,
    pub source_id: String,
    pub event_id: String,
}

impl ProviderCommand for GetEvent {
    type Response = RawEvent;
    fn command() -> Command {
        Command::GetEvent
    }
}
