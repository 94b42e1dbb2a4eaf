//! Tracker calendar configuration.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::error::{TrackerError, TrackerResult};
use crate::layout::day::LayoutConfig;
use crate::layout::sticky::StickyPositioner;
use crate::remote::provider::Provider;
use crate::source::{Account, CalendarSource};
use crate::tasks::TaskStatus;

fn default_timezone() -> Tz {
    Tz::UTC
}

fn default_pixels_per_hour() -> f64 {
    48.0
}

fn default_min_event_minutes() -> i64 {
    15
}

fn default_sticky_margin() -> f64 {
    8.0
}

fn default_sticky_bias_hour() -> u32 {
    12
}

/// A connected provider account.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AccountConfig {
    pub provider: String,
    pub identifier: String,
}

/// Explicit enable/disable of one calendar source.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SourceSelection {
    pub account: String,
    pub source: String,
    pub enabled: bool,
}

/// Configuration at ~/.config/tracker/config.toml
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TrackerConfig {
    /// IANA zone the day grid is drawn in
    #[serde(default = "default_timezone")]
    pub timezone: Tz,

    #[serde(default = "default_pixels_per_hour")]
    pub pixels_per_hour: f64,

    /// Floor for rendered event height
    #[serde(default = "default_min_event_minutes")]
    pub min_event_minutes: i64,

    #[serde(default = "default_sticky_margin")]
    pub sticky_margin: f64,

    /// Markers naturally before this hour stick to the top edge, the rest to
    /// the bottom edge
    #[serde(default = "default_sticky_bias_hour")]
    pub sticky_bias_hour: u32,

    #[serde(default)]
    pub accounts: Vec<AccountConfig>,

    #[serde(default)]
    pub sources: Vec<SourceSelection>,

    /// Marker color per task status name (e.g. `blocked`)
    #[serde(default)]
    pub marker_colors: HashMap<String, String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            timezone: default_timezone(),
            pixels_per_hour: default_pixels_per_hour(),
            min_event_minutes: default_min_event_minutes(),
            sticky_margin: default_sticky_margin(),
            sticky_bias_hour: default_sticky_bias_hour(),
            accounts: Vec::new(),
            sources: Vec::new(),
            marker_colors: HashMap::new(),
        }
    }
}

impl TrackerConfig {
    pub fn config_path() -> TrackerResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| TrackerError::Config("Could not determine config directory".into()))?
            .join("tracker");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, creating a commented file on first use.
    pub fn load() -> TrackerResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> TrackerResult<Self> {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();

        let config: TrackerConfig = Config::builder()
            .add_source(File::from(PathBuf::from(expanded)).required(false))
            .build()
            .map_err(|e| TrackerError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| TrackerError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> TrackerResult<()> {
        if !(self.pixels_per_hour > 0.0) {
            return Err(TrackerError::Config(
                "pixels_per_hour must be positive".into(),
            ));
        }
        if self.min_event_minutes < 0 {
            return Err(TrackerError::Config(
                "min_event_minutes must not be negative".into(),
            ));
        }
        if self.sticky_bias_hour > 24 {
            return Err(TrackerError::Config(
                "sticky_bias_hour must be between 0 and 24".into(),
            ));
        }
        Ok(())
    }

    /// Save the current config to `path`.
    pub fn save(&self, path: &Path) -> TrackerResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| TrackerError::Config(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| TrackerError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> TrackerResult<()> {
        let contents = "\
# tracker calendar configuration

# Time zone the day grid is drawn in:
# timezone = \"Europe/Berlin\"

# Grid scale and minimum rendered event length:
# pixels_per_hour = 48.0
# min_event_minutes = 15

# Task markers stay inside the visible window, biased to the top edge
# before this hour and to the bottom edge after it:
# sticky_margin = 8.0
# sticky_bias_hour = 12

# Connected accounts:
# [[accounts]]
# provider = \"google\"
# identifier = \"me@example.com\"

# Hide or show individual calendars:
# [[sources]]
# account = \"me@example.com\"
# source = \"holidays\"
# enabled = false

# [marker_colors]
# todo = \"#039be5\"
# blocked = \"#d50000\"
";

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TrackerError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| TrackerError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.accounts
            .iter()
            .map(|a| Account::new(Provider::from_name(&a.provider), a.identifier.clone()))
            .collect()
    }

    /// Whether `source` takes part in aggregation. An explicit selection
    /// entry wins over the provider's own `selected` flag.
    pub fn is_enabled(&self, source: &CalendarSource) -> bool {
        self.sources
            .iter()
            .find(|s| s.account == source.account && s.source == source.id)
            .map(|s| s.enabled)
            .unwrap_or(source.selected)
    }

    /// Marker colors keyed by status; unknown status names are ignored.
    pub fn marker_colors(&self) -> HashMap<TaskStatus, String> {
        self.marker_colors
            .iter()
            .filter_map(|(name, color)| TaskStatus::parse(name).map(|s| (s, color.clone())))
            .collect()
    }

    pub fn layout(&self) -> LayoutConfig {
        LayoutConfig {
            timezone: self.timezone,
            pixels_per_hour: self.pixels_per_hour,
            min_event_minutes: self.min_event_minutes,
            sticky_bias_hour: self.sticky_bias_hour,
        }
    }

    /// Positioner with the bias boundary of a regular 24-hour day;
    /// [`StickyPositioner::place_day`] uses each day's own boundary.
    pub fn sticky(&self) -> StickyPositioner {
        StickyPositioner::new(
            self.sticky_margin,
            self.sticky_bias_hour as f64 * self.pixels_per_hour,
        )
    }
}
