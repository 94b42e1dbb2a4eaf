//! TUI rendering for tracker-core types.
//!
//! Extension traits and helpers that add colored terminal output using
//! owo_colors.

use chrono_tz::Tz;
use owo_colors::OwoColorize;
use tracker_core::layout::sticky::StickyEdge;
use tracker_core::layout::{DayLayout, LayoutPosition, StickyPlacement};
use tracker_core::{Account, CalendarSource, Event};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Account {
    fn render(&self) -> String {
        format!("👤 {}", self)
    }
}

impl Render for CalendarSource {
    fn render(&self) -> String {
        let name = paint(self.display_name(), self.color.as_deref());
        format!("📅 {} {}", name, format!("({})", self.id).dimmed())
    }
}

/// Color `text` with a `#rrggbb` token, leaving it plain otherwise.
fn paint(text: &str, color: Option<&str>) -> String {
    match color.and_then(parse_hex) {
        Some((r, g, b)) => text.truecolor(r, g, b).to_string(),
        None => text.to_string(),
    }
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

fn time_range(event: &Event, tz: &Tz) -> String {
    format!(
        "{}-{}",
        event.start_in(tz).with_timezone(tz).format("%H:%M"),
        event.end_in(tz).with_timezone(tz).format("%H:%M")
    )
}

fn render_position(
    position: &LayoutPosition,
    event: &Event,
    tz: &Tz,
    sticky: &[StickyPlacement],
) -> String {
    let title = paint(&event.title, event.display_color());
    let mut line = format!(
        "   {}  {} {}",
        time_range(event, tz),
        format!("[{}/{}]", position.column + 1, position.total_columns).dimmed(),
        title
    );

    if event.is_task_marker() {
        line.push_str(&format!(" {}", "(due)".cyan()));
    }

    match sticky
        .iter()
        .find(|p| p.event_id == position.event_id)
        .and_then(|p| p.clamped)
    {
        Some(StickyEdge::Top) => line.push_str(&format!(" {}", "↑ pinned".dimmed())),
        Some(StickyEdge::Bottom) => line.push_str(&format!(" {}", "↓ pinned".dimmed())),
        None => {}
    }

    line
}

/// Render one day: all-day row, out-of-office blocks, then the grid.
pub fn render_day(
    layout: &DayLayout,
    events: &[Event],
    tz: &Tz,
    sticky: &[StickyPlacement],
) -> String {
    let find = |id: &str| events.iter().find(|e| e.id == id);
    let mut lines = vec![layout.date.format("%A %Y-%m-%d").bold().to_string()];

    for event in layout.all_day.iter().filter_map(|id| find(id.as_str())) {
        let title = paint(&event.title, event.display_color());
        lines.push(format!("   {}  {}", "all day    ".dimmed(), title));
    }

    for event in layout.out_of_office.iter().filter_map(|p| find(p.event_id.as_str())) {
        lines.push(format!(
            "   {}  {} {}",
            time_range(event, tz),
            event.title.yellow(),
            "(out of office)".dimmed()
        ));
    }

    for (position, event) in layout
        .positions
        .iter()
        .filter_map(|p| find(p.event_id.as_str()).map(|e| (p, e)))
    {
        lines.push(render_position(position, event, tz, sticky));
    }

    if lines.len() == 1 {
        lines.push(format!("   {}", "No events".dimmed()));
    }

    lines.join("\n")
}
