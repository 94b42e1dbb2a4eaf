pub mod day;
pub mod sources;
pub mod week;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use tracker_core::remote::ProviderTransport;
use tracker_core::tasks::Task;
use tracker_core::{Aggregation, Aggregator, TimeWindow, TrackerConfig, TrackerError};

use crate::utils::tui::create_spinner;

/// Read tasks from a JSON array file; no file means no tasks.
pub fn load_tasks(path: Option<&Path>) -> Result<Vec<Task>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read tasks file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Invalid tasks file {}", path.display()))
}

/// Run one aggregation cycle against the installed providers, printing any
/// sync failures.
pub async fn fetch(
    config: TrackerConfig,
    window: TimeWindow,
    tasks: &[Task],
) -> Result<Aggregation> {
    let accounts = config.accounts();
    let aggregator = Aggregator::new(Arc::new(ProviderTransport), config);

    let spinner = create_spinner("Syncing calendars".to_string());
    let result = aggregator.aggregate(&accounts, &window, tasks).await;
    spinner.finish_and_clear();

    let aggregation = match result {
        Ok(aggregation) => aggregation,
        Err(TrackerError::NoSourcesConfigured) => anyhow::bail!(
            "No calendar sources configured.\n\n\
            Add an account to {}:\n  \
            [[accounts]]\n  \
            provider = \"google\"\n  \
            identifier = \"me@example.com\"",
            TrackerConfig::config_path()?.display()
        ),
        Err(e) => return Err(e.into()),
    };

    let Some(aggregation) = aggregator.accept(aggregation) else {
        anyhow::bail!("Calendar data changed while syncing, try again");
    };

    if let Some(message) = aggregation.failure_message() {
        eprintln!("{}", message.red());
    }

    Ok(aggregation)
}
