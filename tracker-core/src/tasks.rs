//! Task due-dates as calendar markers.
//!
//! Tasks live in an external collaborator; the calendar only needs their due
//! dates. Open tasks with a due date become [`Event`]s of type
//! [`EventType::TaskDerived`], recomputed on every aggregation cycle.

use std::collections::HashMap;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::event::{Event, EventTime, EventType, Provenance, UNTITLED};

/// Duration given to markers of tasks due at a specific time.
pub const TASK_MARKER_MINUTES: i64 = 30;

/// Pseudo-source id all task markers are attributed to.
pub const TASK_SOURCE_ID: &str = "tasks";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Blocked,
    Completed,
    Cancelled,
    Archived,
}

impl TaskStatus {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "todo" => Some(TaskStatus::Todo),
            "in_progress" => Some(TaskStatus::InProgress),
            "blocked" => Some(TaskStatus::Blocked),
            "completed" => Some(TaskStatus::Completed),
            "cancelled" => Some(TaskStatus::Cancelled),
            "archived" => Some(TaskStatus::Archived),
            _ => None,
        }
    }

    /// Terminal tasks never produce markers.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Cancelled | TaskStatus::Archived
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub due: Option<EventTime>,
    pub status: TaskStatus,
}

/// Derive calendar markers for every open task with a due date.
///
/// Tasks due at an instant get a fixed-length timed marker; tasks due on a
/// date get an all-day marker.
pub fn task_markers(tasks: &[Task], colors: &HashMap<TaskStatus, String>) -> Vec<Event> {
    tasks
        .iter()
        .filter(|task| !task.status.is_terminal())
        .filter_map(|task| {
            let due = task.due?;
            let end = match due {
                EventTime::DateTime(dt) => {
                    EventTime::DateTime(dt + Duration::minutes(TASK_MARKER_MINUTES))
                }
                EventTime::Date(d) => EventTime::Date(d + Duration::days(1)),
            };

            Some(Event {
                id: format!("task-{}", task.id),
                title: if task.title.trim().is_empty() {
                    UNTITLED.to_string()
                } else {
                    task.title.clone()
                },
                description: None,
                location: None,
                start: due,
                end,
                all_day: due.is_date(),
                recurrence: vec![],
                recurring_event_id: None,
                event_type: EventType::TaskDerived,
                attendees: vec![],
                color: colors.get(&task.status).cloned(),
                provenance: Provenance {
                    source_id: TASK_SOURCE_ID.to_string(),
                    ..Default::default()
                },
                task_id: Some(task.id.clone()),
            })
        })
        .collect()
}
