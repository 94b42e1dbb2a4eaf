use chrono::{Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use tracker_core::layout::day::Span;
use tracker_core::layout::{DayLayout, LayoutConfig, StickyPositioner, Viewport, layout_day};
use tracker_core::{Event, EventTime, EventType, Provenance};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 20).expect("valid date")
}

fn events_from(intervals: &[(i64, i64)]) -> Vec<Event> {
    let midnight = Utc.with_ymd_and_hms(2025, 3, 20, 0, 0, 0).unwrap();
    intervals
        .iter()
        .enumerate()
        .map(|(i, (start_min, duration_min))| {
            let start = midnight + Duration::minutes(*start_min);
            Event {
                id: format!("evt-{i:03}"),
                title: format!("Event {i}"),
                description: None,
                location: None,
                start: EventTime::DateTime(start),
                end: EventTime::DateTime(start + Duration::minutes(*duration_min)),
                all_day: false,
                recurrence: vec![],
                recurring_event_id: None,
                event_type: EventType::Default,
                attendees: vec![],
                color: None,
                provenance: Provenance::default(),
                task_id: None,
            }
        })
        .collect()
}

fn max_active(spans: &[Span]) -> usize {
    spans
        .iter()
        .map(|probe| {
            spans
                .iter()
                .filter(|s| s.start <= probe.start && probe.start < s.occupied_end())
                .count()
        })
        .max()
        .unwrap_or(0)
}

/// Number of connected components of the overlap graph of `spans`.
fn components(spans: &[Span]) -> usize {
    let mut parent: Vec<usize> = (0..spans.len()).collect();
    fn root(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }
    for a in 0..spans.len() {
        for b in (a + 1)..spans.len() {
            if spans[a].overlaps(&spans[b]) {
                let (ra, rb) = (root(&mut parent, a), root(&mut parent, b));
                parent[ra] = rb;
            }
        }
    }
    (0..spans.len())
        .filter(|&i| root(&mut parent, i) == i)
        .count()
}

fn cluster_spans(layout: &DayLayout, cluster: usize) -> Vec<Span> {
    layout
        .positions
        .iter()
        .filter(|p| p.cluster == cluster)
        .map(|p| p.span)
        .collect()
}

/// `(start minute, duration minutes)` pairs, including zero-length events and
/// events running past midnight.
fn intervals() -> impl Strategy<Value = Vec<(i64, i64)>> {
    let start = prop_oneof![0i64..1440, 1380i64..1440];
    let duration = prop_oneof![Just(0i64), 0i64..240];
    prop::collection::vec((start, duration), 0..40)
}

proptest! {
    #[test]
    fn same_column_never_overlaps(intervals in intervals()) {
        let layout = layout_day(day(), &events_from(&intervals), &LayoutConfig::default());

        for (i, a) in layout.positions.iter().enumerate() {
            for b in &layout.positions[i + 1..] {
                if a.cluster == b.cluster && a.column == b.column {
                    prop_assert!(!a.span.overlaps(&b.span), "{:?} and {:?}", a, b);
                }
            }
        }
    }

    #[test]
    fn clusters_are_overlap_components(intervals in intervals()) {
        let layout = layout_day(day(), &events_from(&intervals), &LayoutConfig::default());

        for (i, a) in layout.positions.iter().enumerate() {
            for b in &layout.positions[i + 1..] {
                if a.span.overlaps(&b.span) {
                    prop_assert_eq!(a.cluster, b.cluster);
                }
            }
        }

        for cluster in 0..layout.cluster_count() {
            prop_assert_eq!(components(&cluster_spans(&layout, cluster)), 1);
        }
    }

    #[test]
    fn column_count_is_peak_concurrency(intervals in intervals()) {
        let layout = layout_day(day(), &events_from(&intervals), &LayoutConfig::default());

        for cluster in 0..layout.cluster_count() {
            let members: Vec<_> = layout
                .positions
                .iter()
                .filter(|p| p.cluster == cluster)
                .collect();
            let expected = max_active(&cluster_spans(&layout, cluster));
            for p in members {
                prop_assert_eq!(p.total_columns, expected);
                prop_assert!(p.column < p.total_columns);
            }
        }
    }

    #[test]
    fn spans_stay_inside_the_day(intervals in intervals()) {
        let layout = layout_day(day(), &events_from(&intervals), &LayoutConfig::default());

        for p in &layout.positions {
            prop_assert!(0 <= p.span.start && p.span.start <= p.span.end);
            prop_assert!(p.span.end <= 86_399);
        }
    }

    #[test]
    fn layout_ignores_input_order(intervals in intervals()) {
        let events = events_from(&intervals);
        let mut reversed = events.clone();
        reversed.reverse();

        let config = LayoutConfig::default();
        prop_assert_eq!(layout_day(day(), &events, &config), layout_day(day(), &reversed, &config));
    }

    #[test]
    fn visible_sticky_marker_is_not_moved(
        scroll in 0.0f64..1000.0,
        container in 100.0f64..800.0,
        height in 1.0f64..60.0,
        margin in 0.0f64..20.0,
        boundary in 0.0f64..1152.0,
        fraction in 0.0f64..1.0,
    ) {
        let min_top = scroll + margin;
        let max_top = scroll + container - height - margin;
        prop_assume!(min_top <= max_top);

        let natural = min_top + (max_top - min_top) * fraction;
        let positioner = StickyPositioner::new(margin, boundary);
        let (top, edge) = positioner.display_top(natural, height, &Viewport::new(scroll, container));

        prop_assert_eq!(top, natural);
        prop_assert!(edge.is_none());
    }

    #[test]
    fn sticky_clamp_respects_bias(
        scroll in 0.0f64..1000.0,
        container in 100.0f64..800.0,
        natural in 0.0f64..1152.0,
    ) {
        let positioner = StickyPositioner::new(8.0, 576.0);
        let viewport = Viewport::new(scroll, container);
        let (top, edge) = positioner.display_top(natural, 24.0, &viewport);

        if natural < 576.0 {
            // Top-biased markers only ever move down.
            prop_assert!(top >= natural);
        } else {
            prop_assert!(top <= natural);
        }
        prop_assert_eq!(edge.is_some(), top != natural);
    }
}
