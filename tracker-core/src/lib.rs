//! Calendar core for the tracker app.
//!
//! This crate turns raw provider calendar data into something a day/week grid
//! can draw:
//! - `aggregate` fans out fetches across accounts and sources and merges them
//! - `recurrence` backfills recurrence rules onto expanded instances
//! - `layout` packs a day's events into columns and keeps sticky markers in view
//! - `remote` holds the transport boundary and the provider binary protocol

pub mod aggregate;
pub mod config;
pub mod error;
pub mod event;
pub mod layout;
pub mod normalize;
pub mod recurrence;
pub mod remote;
pub mod source;
pub mod tasks;
pub mod time_window;

pub use aggregate::{Aggregation, Aggregator, Generation};
pub use config::TrackerConfig;
pub use error::{TrackerError, TrackerResult};
pub use event::*;
pub use source::{Account, CalendarSource};
pub use time_window::TimeWindow;
