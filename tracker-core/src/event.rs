//! Canonical event types.
//!
//! Providers return their own record shapes ([`RawEvent`](crate::remote::protocol::RawEvent));
//! the normalizer turns those into [`Event`], and everything downstream
//! (aggregation, recurrence repair, layout) works exclusively with it.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Title given to events that arrive without one.
pub const UNTITLED: &str = "(No title)";

/// A calendar event (provider-neutral)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: EventTime,
    /// Exclusive end. For all-day events this is the day after the last
    /// represented day.
    pub end: EventTime,
    pub all_day: bool,

    // Recurrence fields
    /// RRULE/EXDATE lines, empty when the event does not recur or the
    /// master could not be resolved
    pub recurrence: Vec<String>,
    /// Id of the master event this instance belongs to
    pub recurring_event_id: Option<String>,

    pub event_type: EventType,
    pub attendees: Vec<Attendee>,
    /// Provider color token for this event, if it overrides the source color
    pub color: Option<String>,

    /// Where this event came from
    pub provenance: Provenance,
    /// Originating task for task-derived markers
    pub task_id: Option<String>,
}

impl Event {
    pub fn source_id(&self) -> &str {
        &self.provenance.source_id
    }

    /// Color to render the event with: its own token, else its source's color.
    pub fn display_color(&self) -> Option<&str> {
        self.color
            .as_deref()
            .or(self.provenance.color.as_deref())
    }

    pub fn is_task_marker(&self) -> bool {
        self.event_type == EventType::TaskDerived
    }

    /// Start as an instant; all-day starts resolve to local midnight in `tz`.
    pub fn start_in(&self, tz: &Tz) -> DateTime<Utc> {
        self.start.to_utc_in(tz)
    }

    pub fn end_in(&self, tz: &Tz) -> DateTime<Utc> {
        self.end.to_utc_in(tz)
    }

    /// Whether any part of the event falls on `date` (interpreted in `tz`).
    pub fn occurs_on(&self, date: NaiveDate, tz: &Tz) -> bool {
        if self.all_day {
            let first = self.start.date_in(tz);
            let last_exclusive = self.end.date_in(tz).max(first + Duration::days(1));
            return first <= date && date < last_exclusive;
        }

        let day_start = start_of_day(date, tz);
        let day_end = start_of_day(date + Duration::days(1), tz);
        let start = self.start_in(tz);
        let end = self.end_in(tz);

        if start == end {
            return day_start <= start && start < day_end;
        }
        start < day_end && end > day_start
    }
}

/// An event attendee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    /// Display name
    pub name: Option<String>,
    pub email: String,
    /// Response status: "accepted", "declined", "tentative", "needsAction"
    pub response_status: Option<String>,
}

/// The source an event was fetched from, stamped on by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub source_id: String,
    /// Identifier of the owning account (e.g. an email)
    pub account: String,
    pub source_name: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventType {
    #[default]
    Default,
    OutOfOffice,
    TaskDerived,
}

/// Either an instant (RFC 3339) or a floating date (`YYYY-MM-DD`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventTime {
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

impl EventTime {
    pub fn is_date(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }

    /// Convert to an instant. Dates become local midnight in `tz`.
    pub fn to_utc_in(&self, tz: &Tz) -> DateTime<Utc> {
        match self {
            EventTime::DateTime(dt) => *dt,
            EventTime::Date(d) => start_of_day(*d, tz),
        }
    }

    /// The calendar date this time falls on in `tz`.
    pub fn date_in(&self, tz: &Tz) -> NaiveDate {
        match self {
            EventTime::DateTime(dt) => dt.with_timezone(tz).date_naive(),
            EventTime::Date(d) => *d,
        }
    }
}

/// The first instant of `date` in `tz`.
///
/// On days where local midnight is skipped by a DST transition, the first
/// existing local time after it is used.
pub fn start_of_day(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    match tz.from_local_datetime(&midnight).earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        None => {
            // Gap at midnight: take the first local hour that exists.
            (1..=4)
                .find_map(|h| {
                    tz.from_local_datetime(&(midnight + Duration::hours(h)))
                        .earliest()
                })
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|| midnight.and_utc())
        }
    }
}
