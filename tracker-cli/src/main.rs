mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracker_core::TrackerConfig;
use tracker_core::layout::Viewport;

#[derive(Parser)]
#[command(name = "tracker")]
#[command(about = "Render calendar days and weeks from your connected accounts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out a single day
    Day {
        /// Day to show (YYYY-MM-DD or "today")
        date: Option<String>,

        /// JSON file with tasks whose due dates are shown as markers
        #[arg(long)]
        tasks: Option<PathBuf>,

        /// Scroll offset of the day column, in pixels
        #[arg(long, requires = "height")]
        scroll: Option<f64>,

        /// Visible height of the day column, in pixels
        #[arg(long)]
        height: Option<f64>,

        /// Print the layout as JSON
        #[arg(long)]
        json: bool,
    },
    /// Lay out the Monday-based week containing a date
    Week {
        /// Any day in the week (YYYY-MM-DD or "today")
        date: Option<String>,

        /// JSON file with tasks whose due dates are shown as markers
        #[arg(long)]
        tasks: Option<PathBuf>,

        /// Print the layouts as JSON
        #[arg(long)]
        json: bool,
    },
    /// List calendar sources of every account
    Sources,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = TrackerConfig::load()?;

    match cli.command {
        Commands::Day {
            date,
            tasks,
            scroll,
            height,
            json,
        } => {
            let viewport = height.map(|h| Viewport::new(scroll.unwrap_or(0.0), h));
            commands::day::run(config, date.as_deref(), tasks.as_deref(), viewport, json).await
        }
        Commands::Week { date, tasks, json } => {
            commands::week::run(config, date.as_deref(), tasks.as_deref(), json).await
        }
        Commands::Sources => commands::sources::run(config).await,
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
