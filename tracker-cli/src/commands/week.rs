use std::path::Path;

use anyhow::Result;
use tracker_core::layout::layout_week;
use tracker_core::time_window::{parse_date_arg, week_dates};
use tracker_core::{TimeWindow, TrackerConfig};

use crate::render::render_day;

pub async fn run(
    config: TrackerConfig,
    date: Option<&str>,
    tasks_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    let tz = config.timezone;
    let date = parse_date_arg(date, &tz).map_err(|e| anyhow::anyhow!(e))?;
    let tasks = super::load_tasks(tasks_path)?;

    let layout_config = config.layout();
    let aggregation = super::fetch(config, TimeWindow::for_week(date, &tz), &tasks).await?;

    let events = aggregation.display_events();
    let layouts = layout_week(&week_dates(date), &events, &layout_config);

    if json {
        println!("{}", serde_json::to_string_pretty(&layouts)?);
        return Ok(());
    }

    for (i, layout) in layouts.iter().enumerate() {
        println!("{}", render_day(layout, &events, &tz, &[]));

        if i < layouts.len() - 1 {
            println!();
        }
    }

    Ok(())
}
