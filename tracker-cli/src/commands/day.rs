use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use tracker_core::layout::{DayLayout, StickyPlacement, Viewport, layout_day};
use tracker_core::time_window::parse_date_arg;
use tracker_core::{TimeWindow, TrackerConfig};

use crate::render::render_day;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DayOutput<'a> {
    layout: &'a DayLayout,
    sticky: &'a [StickyPlacement],
}

pub async fn run(
    config: TrackerConfig,
    date: Option<&str>,
    tasks_path: Option<&Path>,
    viewport: Option<Viewport>,
    json: bool,
) -> Result<()> {
    let tz = config.timezone;
    let date = parse_date_arg(date, &tz).map_err(|e| anyhow::anyhow!(e))?;
    let tasks = super::load_tasks(tasks_path)?;

    let layout_config = config.layout();
    let positioner = config.sticky();
    let aggregation = super::fetch(config, TimeWindow::for_day(date, &tz), &tasks).await?;

    let events = aggregation.display_events();
    let layout = layout_day(date, &events, &layout_config);
    let sticky = viewport
        .map(|v| positioner.place_day(&layout, &v))
        .unwrap_or_default();

    if json {
        let output = DayOutput {
            layout: &layout,
            sticky: &sticky,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", render_day(&layout, &events, &tz, &sticky));
    }

    Ok(())
}
