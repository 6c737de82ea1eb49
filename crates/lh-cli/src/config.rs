//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use lh_core::peaks::{DEFAULT_PEAK_THRESHOLD, DEFAULT_TIMELINE_MIN_PLAYS, PeakOptions};
use lh_core::time_key::parse_weekday;
use lh_core::{AggregateOptions, ParseError};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Plays shorter than this are ignored by aggregation.
    pub min_ms_to_count: u64,
    pub include_podcasts: bool,
    pub include_audiobooks: bool,
    /// Standard deviations above the mean for a window to count as a peak.
    pub peak_threshold: f64,
    /// First day of a peak-analysis week (`monday`, `sunday`, ...).
    pub week_start: String,
    /// Minimum weekly plays for a week to appear on the peak timeline.
    pub timeline_min_plays: u64,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("history.db"),
            min_ms_to_count: 0,
            include_podcasts: false,
            include_audiobooks: false,
            peak_threshold: DEFAULT_PEAK_THRESHOLD,
            week_start: "monday".to_string(),
            timeline_min_plays: DEFAULT_TIMELINE_MIN_PLAYS,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // LH_DATABASE_PATH, LH_MIN_MS_TO_COUNT, ...
        figment = figment.merge(Env::prefixed("LH_"));

        figment.extract()
    }

    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions {
            min_ms_to_count: self.min_ms_to_count,
            include_podcasts: self.include_podcasts,
            include_audiobooks: self.include_audiobooks,
        }
    }

    /// Peak options, with an optional threshold override from the command line.
    pub fn peak_options(&self, threshold: Option<f64>) -> Result<PeakOptions, ParseError> {
        let week_start =
            parse_weekday(&self.week_start).ok_or_else(|| ParseError::InvalidWeekStart {
                value: self.week_start.clone(),
            })?;
        Ok(PeakOptions {
            threshold: threshold.unwrap_or(self.peak_threshold),
            week_start,
            timeline_min_plays: self.timeline_min_plays,
        })
    }
}

/// Returns the platform-specific config directory for lh.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("lh"))
}

/// Returns the platform-specific data directory for lh.
///
/// On Linux: `~/.local/share/lh`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("lh"))
}
