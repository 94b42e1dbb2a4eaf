//! Day grid layout.
//!
//! Timed events of one day are placed vertically by time, then packed into
//! side-by-side columns so that no two events sharing a column overlap.
//! Packing happens per cluster (a maximal run of transitively overlapping
//! events), so a lone event keeps the full width even on a busy day.
//!
//! Overlap is decided on the real (clamped) timestamps. The minimum rendered
//! height only affects `height`, never clustering or column reuse. A
//! zero-length event occupies the second it starts in, so two of them at the
//! same instant sit side by side instead of on top of each other.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::event::{Event, EventType, start_of_day};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Scale and time-zone settings for the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub timezone: Tz,
    pub pixels_per_hour: f64,
    /// Rendered height floor, so zero-length events stay clickable
    pub min_event_minutes: i64,
    /// Local hour splitting top- and bottom-biased sticky markers
    pub sticky_bias_hour: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            timezone: Tz::UTC,
            pixels_per_hour: 48.0,
            min_event_minutes: 15,
            sticky_bias_hour: 12,
        }
    }
}

impl LayoutConfig {
    fn pixels(&self, seconds: i64) -> f64 {
        seconds as f64 * self.pixels_per_hour / SECONDS_PER_HOUR
    }
}

/// An event interval in seconds from the start of its day, already clamped
/// to the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Span {
    pub start: i64,
    pub end: i64,
}

impl Span {
    pub fn new(start: i64, end: i64) -> Self {
        Span {
            start,
            end: end.max(start),
        }
    }

    /// End of the time the span blocks; a zero-length span blocks its
    /// starting second.
    pub fn occupied_end(&self) -> i64 {
        self.end.max(self.start + 1)
    }

    /// Half-open overlap of occupied time: touching spans do not overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.occupied_end() && other.start < self.occupied_end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Layer {
    /// Regular column-packed events
    Grid,
    /// Full-width out-of-office blocks drawn above the grid
    OutOfOffice,
}

/// Where one event goes on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPosition {
    pub event_id: String,
    pub top: f64,
    pub height: f64,
    pub column: usize,
    pub total_columns: usize,
    /// Index of the overlap cluster within the day (grid layer only)
    pub cluster: usize,
    pub span: Span,
    pub layer: Layer,
    /// Kept inside the visible window while scrolling
    pub sticky: bool,
}

impl LayoutPosition {
    /// Horizontal offset as a fraction of the day column width.
    pub fn left_fraction(&self) -> f64 {
        self.column as f64 / self.total_columns.max(1) as f64
    }

    pub fn width_fraction(&self) -> f64 {
        1.0 / self.total_columns.max(1) as f64
    }
}

/// Layout of one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayLayout {
    pub date: NaiveDate,
    /// Ids of events shown in the all-day row, in input order
    pub all_day: Vec<String>,
    /// Grid positions ordered by `(span.start, longest first, event id)`
    pub positions: Vec<LayoutPosition>,
    pub out_of_office: Vec<LayoutPosition>,
    pub height: f64,
    /// Offset of the local sticky bias hour on this day
    pub bias_top: f64,
}

impl DayLayout {
    pub fn position(&self, event_id: &str) -> Option<&LayoutPosition> {
        self.positions
            .iter()
            .chain(self.out_of_office.iter())
            .find(|p| p.event_id == event_id)
    }

    pub fn cluster_count(&self) -> usize {
        self.positions
            .iter()
            .map(|p| p.cluster + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Events intersecting `date` in `tz`.
pub fn events_for_day<'a>(events: &'a [Event], date: NaiveDate, tz: &Tz) -> Vec<&'a Event> {
    events.iter().filter(|e| e.occurs_on(date, tz)).collect()
}

/// Lay out every day in `dates` independently.
pub fn layout_week(
    dates: &[NaiveDate],
    events: &[Event],
    config: &LayoutConfig,
) -> Vec<DayLayout> {
    dates
        .iter()
        .map(|date| layout_day(*date, events, config))
        .collect()
}

/// Compute positions for the events of `events` that fall on `date`.
///
/// Events not touching `date` are ignored, so a whole week's list can be
/// passed in.
pub fn layout_day(date: NaiveDate, events: &[Event], config: &LayoutConfig) -> DayLayout {
    let tz = &config.timezone;
    let day_start = start_of_day(date, tz);
    let next_day = start_of_day(date + Duration::days(1), tz);
    // Last represented instant, 23:59:59 local.
    let day_last = next_day - Duration::seconds(1);

    let mut all_day = Vec::new();
    let mut out_of_office = Vec::new();
    let mut timed: Vec<(Span, &Event)> = Vec::new();

    for event in events_for_day(events, date, tz) {
        if event.all_day {
            all_day.push(event.id.clone());
            continue;
        }

        let start = event.start_in(tz).clamp(day_start, day_last);
        let end = event.end_in(tz).clamp(day_start, day_last);
        let span = Span::new(
            (start - day_start).num_seconds(),
            (end - day_start).num_seconds(),
        );

        if event.event_type == EventType::OutOfOffice {
            out_of_office.push(place(event, span, Layer::OutOfOffice, 0, 0, 1, config));
        } else {
            timed.push((span, event));
        }
    }

    timed.sort_by(|(a, ea), (b, eb)| {
        a.start
            .cmp(&b.start)
            .then_with(|| b.end.cmp(&a.end))
            .then_with(|| ea.id.cmp(&eb.id))
    });

    let spans: Vec<Span> = timed.iter().map(|(span, _)| *span).collect();
    let clusters = cluster_spans(&spans);
    let columns = assign_columns(&spans, &clusters);

    let positions = timed
        .iter()
        .zip(clusters.iter().zip(columns.iter()))
        .map(|((span, event), (cluster, (column, total)))| {
            place(event, *span, Layer::Grid, *cluster, *column, *total, config)
        })
        .collect();

    let bias = local_hour(date, config.sticky_bias_hour, tz).clamp(day_start, next_day);

    DayLayout {
        date,
        all_day,
        positions,
        out_of_office,
        height: config.pixels((next_day - day_start).num_seconds()),
        bias_top: config.pixels((bias - day_start).num_seconds()),
    }
}

/// The instant local `hour` o'clock starts on `date`. Hours skipped by a DST
/// transition resolve to the next existing hour; 24 is the next midnight.
fn local_hour(date: NaiveDate, hour: u32, tz: &Tz) -> DateTime<Utc> {
    let Some(time) = NaiveTime::from_hms_opt(hour, 0, 0) else {
        return start_of_day(date + Duration::days(1), tz);
    };
    let local = date.and_time(time);
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(local + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| start_of_day(date, tz) + Duration::hours(hour as i64))
}

fn place(
    event: &Event,
    span: Span,
    layer: Layer,
    cluster: usize,
    column: usize,
    total_columns: usize,
    config: &LayoutConfig,
) -> LayoutPosition {
    let duration = (span.end - span.start).max(config.min_event_minutes * 60);
    LayoutPosition {
        event_id: event.id.clone(),
        top: config.pixels(span.start),
        height: config.pixels(duration),
        column,
        total_columns,
        cluster,
        span,
        layer,
        sticky: event.is_task_marker(),
    }
}

/// Partition spans (sorted by start) into overlap clusters.
///
/// Returns the cluster index of each span. Two spans share a cluster iff a
/// chain of pairwise overlaps connects them.
pub fn cluster_spans(spans: &[Span]) -> Vec<usize> {
    // Latest end seen in each cluster so far.
    let mut cluster_ends: Vec<i64> = Vec::new();
    let mut assignment = Vec::with_capacity(spans.len());

    for span in spans {
        match cluster_ends.iter().rposition(|&end| span.start < end) {
            Some(idx) => {
                cluster_ends[idx] = cluster_ends[idx].max(span.occupied_end());
                assignment.push(idx);
            }
            None => {
                cluster_ends.push(span.occupied_end());
                assignment.push(cluster_ends.len() - 1);
            }
        }
    }

    assignment
}

/// Greedy column assignment within each cluster.
///
/// `spans` must be sorted by start and `clusters` come from
/// [`cluster_spans`]. Returns `(column, total_columns)` per span, where
/// `total_columns` is the column count of the span's cluster.
pub fn assign_columns(spans: &[Span], clusters: &[usize]) -> Vec<(usize, usize)> {
    let cluster_count = clusters.iter().map(|c| c + 1).max().unwrap_or(0);
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); cluster_count];
    for (idx, cluster) in clusters.iter().enumerate() {
        members[*cluster].push(idx);
    }

    let mut result = vec![(0, 1); spans.len()];

    for indices in &members {
        // End of the last span placed in each column.
        let mut column_ends: Vec<i64> = Vec::new();
        for &idx in indices {
            let span = spans[idx];
            let column = match column_ends.iter().position(|&end| end <= span.start) {
                Some(column) => {
                    column_ends[column] = span.occupied_end();
                    column
                }
                None => {
                    column_ends.push(span.occupied_end());
                    column_ends.len() - 1
                }
            };
            result[idx].0 = column;
        }
        for &idx in indices {
            result[idx].1 = column_ends.len();
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventTime, Provenance};
    use chrono::{TimeZone, Utc};

    fn at(h: u32, m: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 20, h, m, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 20).unwrap()
    }

    fn event(id: &str, start: chrono::DateTime<Utc>, end: chrono::DateTime<Utc>) -> Event {
        Event {
            id: id.to_string(),
            title: id.to_uppercase(),
            description: None,
            location: None,
            start: EventTime::DateTime(start),
            end: EventTime::DateTime(end),
            all_day: false,
            recurrence: vec![],
            recurring_event_id: None,
            event_type: EventType::Default,
            attendees: vec![],
            color: None,
            provenance: Provenance::default(),
            task_id: None,
        }
    }

    fn columns(layout: &DayLayout, id: &str) -> (usize, usize) {
        let p = layout.position(id).unwrap();
        (p.column, p.total_columns)
    }

    #[test]
    fn test_chained_overlap_forms_one_cluster_with_column_reuse() {
        let events = vec![
            event("a", at(9, 0), at(10, 0)),
            event("b", at(9, 30), at(10, 30)),
            event("c", at(10, 15), at(10, 45)),
        ];

        let layout = layout_day(day(), &events, &LayoutConfig::default());

        assert_eq!(layout.cluster_count(), 1);
        assert_eq!(columns(&layout, "a"), (0, 2));
        assert_eq!(columns(&layout, "b"), (1, 2));
        assert_eq!(columns(&layout, "c"), (0, 2));
    }

    #[test]
    fn test_separate_clusters_get_independent_widths() {
        let events = vec![
            event("a", at(9, 0), at(10, 0)),
            event("b", at(9, 0), at(10, 0)),
            event("c", at(9, 0), at(10, 0)),
            event("lunch", at(12, 0), at(13, 0)),
        ];

        let layout = layout_day(day(), &events, &LayoutConfig::default());

        assert_eq!(layout.cluster_count(), 2);
        assert_eq!(layout.position("a").unwrap().total_columns, 3);
        assert_eq!(columns(&layout, "lunch"), (0, 1));
        assert_eq!(layout.position("lunch").unwrap().width_fraction(), 1.0);
    }

    #[test]
    fn test_back_to_back_events_do_not_overlap() {
        let events = vec![
            event("a", at(9, 0), at(10, 0)),
            event("b", at(10, 0), at(11, 0)),
        ];

        let layout = layout_day(day(), &events, &LayoutConfig::default());
        assert_eq!(layout.cluster_count(), 2);
        assert_eq!(columns(&layout, "b"), (0, 1));
    }

    #[test]
    fn test_geometry_uses_pixels_per_hour() {
        let config = LayoutConfig {
            pixels_per_hour: 60.0,
            ..Default::default()
        };
        let layout = layout_day(day(), &[event("a", at(9, 30), at(11, 0))], &config);

        let p = layout.position("a").unwrap();
        assert_eq!(p.top, 570.0);
        assert_eq!(p.height, 90.0);
        assert_eq!(layout.height, 24.0 * 60.0);
    }

    #[test]
    fn test_zero_length_event_gets_minimum_height_but_no_extra_overlap() {
        let config = LayoutConfig {
            pixels_per_hour: 60.0,
            ..Default::default()
        };
        let events = vec![
            event("ping", at(9, 0), at(9, 0)),
            event("next", at(9, 5), at(9, 30)),
        ];

        let layout = layout_day(day(), &events, &config);

        let ping = layout.position("ping").unwrap();
        assert_eq!(ping.height, 15.0);
        // The rendered floor reaches past 09:05, but the real interval does not.
        assert_eq!(layout.cluster_count(), 2);
        assert_eq!(columns(&layout, "next"), (0, 1));
    }

    #[test]
    fn test_multi_day_event_is_clamped_to_each_day() {
        let config = LayoutConfig {
            pixels_per_hour: 60.0,
            ..Default::default()
        };
        let overnight = event(
            "overnight",
            at(22, 0),
            Utc.with_ymd_and_hms(2025, 3, 21, 2, 0, 0).unwrap(),
        );

        let first = layout_day(day(), &[overnight.clone()], &config);
        let p = first.position("overnight").unwrap();
        assert_eq!(p.top, 22.0 * 60.0);
        assert_eq!(p.span.end, 86_399);

        let second = layout_day(day() + Duration::days(1), &[overnight], &config);
        let p = second.position("overnight").unwrap();
        assert_eq!(p.top, 0.0);
        assert_eq!(p.height, 120.0);
    }

    #[test]
    fn test_all_day_and_out_of_office_skip_column_packing() {
        let mut holiday = event("holiday", at(0, 0), at(0, 0));
        holiday.all_day = true;
        holiday.start = EventTime::Date(day());
        holiday.end = EventTime::Date(day() + Duration::days(1));

        let mut away = event("away", at(8, 0), at(12, 0));
        away.event_type = EventType::OutOfOffice;

        let events = vec![holiday, away, event("a", at(9, 0), at(10, 0))];
        let layout = layout_day(day(), &events, &LayoutConfig::default());

        assert_eq!(layout.all_day, vec!["holiday"]);
        assert_eq!(layout.out_of_office.len(), 1);
        assert_eq!(layout.out_of_office[0].layer, Layer::OutOfOffice);
        assert_eq!(columns(&layout, "a"), (0, 1));
        assert_eq!(layout.positions.len(), 1);
    }

    #[test]
    fn test_events_on_other_days_are_ignored() {
        let tomorrow = Utc.with_ymd_and_hms(2025, 3, 21, 9, 0, 0).unwrap();
        let events = vec![event("later", tomorrow, tomorrow + Duration::hours(1))];

        let layout = layout_day(day(), &events, &LayoutConfig::default());
        assert!(layout.positions.is_empty());
    }

    #[test]
    fn test_layout_is_independent_of_input_order() {
        let events = vec![
            event("a", at(9, 0), at(10, 0)),
            event("b", at(9, 0), at(10, 0)),
            event("c", at(9, 30), at(11, 0)),
            event("d", at(10, 0), at(10, 30)),
        ];
        let mut reversed = events.clone();
        reversed.reverse();

        let config = LayoutConfig::default();
        assert_eq!(
            layout_day(day(), &events, &config),
            layout_day(day(), &reversed, &config)
        );
    }

    #[test]
    fn test_task_markers_are_sticky() {
        let mut marker = event("task-1", at(15, 0), at(15, 30));
        marker.event_type = EventType::TaskDerived;

        let layout = layout_day(day(), &[marker], &LayoutConfig::default());
        assert!(layout.position("task-1").unwrap().sticky);
    }

    #[test]
    fn test_zero_length_events_at_one_instant_get_separate_columns() {
        let events = vec![
            event("a", at(9, 0), at(9, 0)),
            event("b", at(9, 0), at(9, 0)),
        ];

        let layout = layout_day(day(), &events, &LayoutConfig::default());
        assert_eq!(layout.cluster_count(), 1);
        assert_eq!(columns(&layout, "a"), (0, 2));
        assert_eq!(columns(&layout, "b"), (1, 2));
    }

    #[test]
    fn test_zero_length_event_inside_longer_one_shares_its_cluster() {
        let events = vec![
            event("meeting", at(9, 0), at(10, 0)),
            event("ping", at(9, 30), at(9, 30)),
            event("reminder", at(9, 30), at(9, 30)),
        ];

        let layout = layout_day(day(), &events, &LayoutConfig::default());
        assert_eq!(layout.cluster_count(), 1);
        assert_eq!(columns(&layout, "meeting"), (0, 3));
        assert_eq!(columns(&layout, "ping"), (1, 3));
        assert_eq!(columns(&layout, "reminder"), (2, 3));
    }

    #[test]
    fn test_bias_top_follows_local_hour_on_dst_days() {
        let config = LayoutConfig {
            timezone: chrono_tz::Europe::Berlin,
            ..Default::default()
        };

        // 25-hour day: local noon is 13 elapsed hours after midnight.
        let fall_back = NaiveDate::from_ymd_opt(2025, 10, 26).unwrap();
        assert_eq!(layout_day(fall_back, &[], &config).bias_top, 13.0 * 48.0);

        // 23-hour day: local noon is 11 elapsed hours after midnight.
        let spring_forward = NaiveDate::from_ymd_opt(2025, 3, 30).unwrap();
        assert_eq!(layout_day(spring_forward, &[], &config).bias_top, 11.0 * 48.0);

        assert_eq!(layout_day(day(), &[], &config).bias_top, 12.0 * 48.0);
    }

    #[test]
    fn test_cluster_spans_joins_through_chain() {
        let spans = vec![
            Span::new(0, 10),
            Span::new(5, 20),
            Span::new(15, 30),
            Span::new(30, 40),
        ];
        assert_eq!(cluster_spans(&spans), vec![0, 0, 0, 1]);
    }
}
