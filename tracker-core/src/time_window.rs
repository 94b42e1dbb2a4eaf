//! Time window for fetching events.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::event::start_of_day;

/// Half-open time window `[from, to)` shared by every fetch of one
/// aggregation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        TimeWindow { from, to }
    }

    /// The window covering `days` consecutive days starting at `date` in `tz`.
    pub fn for_days(date: NaiveDate, days: i64, tz: &Tz) -> Self {
        TimeWindow {
            from: start_of_day(date, tz),
            to: start_of_day(date + Duration::days(days.max(1)), tz),
        }
    }

    pub fn for_day(date: NaiveDate, tz: &Tz) -> Self {
        Self::for_days(date, 1, tz)
    }

    /// The Monday-based week containing `date`.
    pub fn for_week(date: NaiveDate, tz: &Tz) -> Self {
        Self::for_days(week_start(date), 7, tz)
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from <= instant && instant < self.to
    }

    /// Get `from` as RFC3339 string.
    pub fn from_rfc3339(&self) -> String {
        self.from.to_rfc3339()
    }

    /// Get `to` as RFC3339 string.
    pub fn to_rfc3339(&self) -> String {
        self.to.to_rfc3339()
    }
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// The seven dates of the week containing `date`.
pub fn week_dates(date: NaiveDate) -> Vec<NaiveDate> {
    let monday = week_start(date);
    (0..7).map(|i| monday + Duration::days(i)).collect()
}

/// Parse a YYYY-MM-DD argument, defaulting to today in `tz`.
pub fn parse_date_arg(arg: Option<&str>, tz: &Tz) -> Result<NaiveDate, String> {
    match arg {
        None | Some("today") => Ok(Utc::now().with_timezone(tz).date_naive()),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| format!("Invalid date format '{}'. Expected YYYY-MM-DD", s)),
    }
}
