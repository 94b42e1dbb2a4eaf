use anyhow::Result;
use owo_colors::OwoColorize;
use tracker_core::remote::{CalendarTransport, ProviderTransport};
use tracker_core::{CalendarSource, TrackerConfig};

use crate::render::Render;
use crate::utils::tui::create_spinner;

pub async fn run(config: TrackerConfig) -> Result<()> {
    let accounts = config.accounts();

    if accounts.is_empty() {
        println!("{}", "No accounts configured".dimmed());
        return Ok(());
    }

    for (i, account) in accounts.iter().enumerate() {
        let spinner = create_spinner(account.render());
        let result = ProviderTransport.list_sources(account).await;
        spinner.finish_and_clear();

        println!("{}", account.render());

        match result {
            Ok(raw) => {
                for source in raw.into_iter().map(|r| CalendarSource::from_raw(r, account)) {
                    let marker = if config.is_enabled(&source) {
                        "✓".green().to_string()
                    } else {
                        "✗".dimmed().to_string()
                    };
                    println!("   {} {}", marker, source.render());
                }
            }
            Err(e) => println!("   {}", e.to_string().red()),
        }

        if i < accounts.len() - 1 {
            println!();
        }
    }

    Ok(())
}
