//! Converts provider records into canonical events.
//!
//! Normalization is a pure mapping. A record without a usable start or end
//! is rejected with a [`NormalizeError`]; the caller decides how to report it.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use thiserror::Error;

use crate::event::{Attendee, Event, EventTime, EventType, Provenance, UNTITLED};
use crate::remote::protocol::{RawEvent, RawEventTime};
use crate::source::CalendarSource;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Event has no start time")]
    MissingStart,

    #[error("Event has no end time")]
    MissingEnd,

    #[error("Invalid {field} time '{value}'")]
    InvalidTime { field: &'static str, value: String },

    #[error("Event ends before it starts")]
    EndBeforeStart,
}

/// Map a raw provider event from `source` into an [`Event`].
pub fn normalize_event(raw: RawEvent, source: &CalendarSource) -> Result<Event, NormalizeError> {
    let start = match raw.start.as_ref().and_then(|t| parse_time(t, "start")) {
        Some(parsed) => parsed?,
        None => return Err(NormalizeError::MissingStart),
    };
    let end = match raw.end.as_ref().and_then(|t| parse_time(t, "end")) {
        Some(parsed) => parsed?,
        None => return Err(NormalizeError::MissingEnd),
    };

    // Comparison only; real day boundaries are applied at layout time.
    if end.to_utc_in(&Tz::UTC) < start.to_utc_in(&Tz::UTC) {
        return Err(NormalizeError::EndBeforeStart);
    }

    let event_type = match raw.event_type.as_deref() {
        Some("outOfOffice") => EventType::OutOfOffice,
        _ => EventType::Default,
    };

    let title = raw
        .summary
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());

    let attendees = raw
        .attendees
        .into_iter()
        .map(|a| Attendee {
            name: a.display_name.filter(|n| !n.is_empty()),
            email: a.email,
            response_status: a.response_status,
        })
        .collect();

    Ok(Event {
        id: raw.id,
        title,
        description: raw.description.filter(|s| !s.is_empty()),
        location: raw.location.filter(|s| !s.is_empty()),
        all_day: start.is_date(),
        start,
        end,
        recurrence: raw.recurrence.unwrap_or_default(),
        recurring_event_id: raw.recurring_event_id,
        event_type,
        attendees,
        color: raw.color_id,
        provenance: Provenance {
            source_id: source.id.clone(),
            account: source.account.clone(),
            source_name: source.name.clone(),
            color: source.color.clone(),
        },
        task_id: None,
    })
}

/// Parse a raw start/end. `None` means neither form is present.
fn parse_time(
    time: &RawEventTime,
    field: &'static str,
) -> Option<Result<EventTime, NormalizeError>> {
    if let Some(ref value) = time.date_time {
        return Some(
            DateTime::parse_from_rfc3339(value)
                .map(|dt| EventTime::DateTime(dt.with_timezone(&Utc)))
                .map_err(|_| NormalizeError::InvalidTime {
                    field,
                    value: value.clone(),
                }),
        );
    }

    time.date.as_ref().map(|value| {
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(EventTime::Date)
            .map_err(|_| NormalizeError::InvalidTime {
                field,
                value: value.clone(),
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::AccessRole;
    use chrono::TimeZone;

    fn source() -> CalendarSource {
        CalendarSource {
            id: "work".to_string(),
            account: "me@example.com".to_string(),
            name: Some("Work".to_string()),
            color: Some("#4285f4".to_string()),
            access_role: AccessRole::Owner,
            selected: true,
        }
    }

    fn timed(start: &str, end: &str) -> RawEvent {
        RawEvent {
            id: "evt-1".to_string(),
            start: Some(RawEventTime {
                date_time: Some(start.to_string()),
                ..Default::default()
            }),
            end: Some(RawEventTime {
                date_time: Some(end.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_timed_event_is_stamped_with_provenance() {
        let mut raw = timed("2025-03-20T09:00:00+01:00", "2025-03-20T10:00:00+01:00");
        raw.summary = Some("Planning".to_string());

        let event = normalize_event(raw, &source()).unwrap();
        assert!(!event.all_day);
        assert_eq!(event.title, "Planning");
        assert_eq!(
            event.start,
            EventTime::DateTime(Utc.with_ymd_and_hms(2025, 3, 20, 8, 0, 0).unwrap())
        );
        assert_eq!(event.source_id(), "work");
        assert_eq!(event.provenance.account, "me@example.com");
        assert_eq!(event.provenance.source_name.as_deref(), Some("Work"));
        assert_eq!(event.display_color(), Some("#4285f4"));
        assert_eq!(event.event_type, EventType::Default);
    }

    #[test]
    fn test_date_only_start_is_all_day() {
        let raw = RawEvent {
            id: "holiday".to_string(),
            start: Some(RawEventTime {
                date: Some("2025-03-20".to_string()),
                ..Default::default()
            }),
            end: Some(RawEventTime {
                date: Some("2025-03-21".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let event = normalize_event(raw, &source()).unwrap();
        assert!(event.all_day);
        assert_eq!(event.title, UNTITLED);
    }

    #[test]
    fn test_out_of_office_type_is_kept() {
        let mut raw = timed("2025-03-20T09:00:00Z", "2025-03-20T17:00:00Z");
        raw.event_type = Some("outOfOffice".to_string());
        assert_eq!(
            normalize_event(raw, &source()).unwrap().event_type,
            EventType::OutOfOffice
        );

        let mut raw = timed("2025-03-20T09:00:00Z", "2025-03-20T17:00:00Z");
        raw.event_type = Some("focusTime".to_string());
        assert_eq!(
            normalize_event(raw, &source()).unwrap().event_type,
            EventType::Default
        );
    }

    #[test]
    fn test_missing_or_invalid_times_are_rejected() {
        let mut raw = timed("2025-03-20T09:00:00Z", "2025-03-20T10:00:00Z");
        raw.start = None;
        assert_eq!(
            normalize_event(raw, &source()),
            Err(NormalizeError::MissingStart)
        );

        let mut raw = timed("2025-03-20T09:00:00Z", "2025-03-20T10:00:00Z");
        raw.end = Some(RawEventTime::default());
        assert_eq!(normalize_event(raw, &source()), Err(NormalizeError::MissingEnd));

        let raw = timed("tomorrow-ish", "2025-03-20T10:00:00Z");
        assert!(matches!(
            normalize_event(raw, &source()),
            Err(NormalizeError::InvalidTime { field: "start", .. })
        ));

        let raw = timed("2025-03-20T09:00:00Z", "2025-03-32");
        assert!(matches!(
            normalize_event(raw, &source()),
            Err(NormalizeError::InvalidTime { field: "end", .. })
        ));

        let raw = timed("2025-03-20T10:00:00Z", "2025-03-20T09:00:00Z");
        assert_eq!(
            normalize_event(raw, &source()),
            Err(NormalizeError::EndBeforeStart)
        );
    }

    #[test]
    fn test_blank_title_gets_placeholder() {
        let mut raw = timed("2025-03-20T09:00:00Z", "2025-03-20T10:00:00Z");
        raw.summary = Some("   ".to_string());
        assert_eq!(normalize_event(raw, &source()).unwrap().title, UNTITLED);
    }
}
