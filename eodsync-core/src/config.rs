//! Pipeline configuration, loaded from a TOML file with full defaults.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Everything the pipeline needs to know about one deployment.
///
/// Every field has a default, so an empty TOML file (or none at all) is a
/// valid SME-board configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Root of all persisted state.
    pub data_dir: PathBuf,

    /// Listing classes merged into the per-instrument series.
    pub sync_series: Vec<String>,

    /// Minimum price increment adjusted prices snap to.
    pub tick_size: f64,

    /// Series files idle longer than this many days are deleted.
    pub retention_days: i64,

    /// Corporate-action cache refresh cadence, in days.
    pub action_refresh_days: i64,

    /// How far past the processing date the action window extends, in days.
    pub action_lookahead_days: i64,

    /// First date to sync when no cursor state exists yet. Defaults to the
    /// day before today at run time.
    pub seed_date: Option<NaiveDate>,

    /// Exchange API endpoint.
    pub base_url: String,

    /// Exchange historical-archive endpoint (bhav copies).
    pub archive_url: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("sme_data"),
            sync_series: vec!["SM".into(), "ST".into()],
            tick_size: 0.05,
            retention_days: 365,
            action_refresh_days: 7,
            action_lookahead_days: 8,
            seed_date: None,
            base_url: "https://www.nseindia.com".into(),
            archive_url: "https://archives.nseindia.com".into(),
        }
    }
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn daily_dir(&self) -> PathBuf {
        self.data_dir.join("daily")
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.data_dir.join("archive")
    }

    pub fn isin_path(&self) -> PathBuf {
        self.data_dir.join("isin.csv")
    }

    pub fn holiday_cache_path(&self) -> PathBuf {
        self.data_dir.join("holidays.json")
    }

    pub fn action_cache_path(&self) -> PathBuf {
        self.data_dir.join("actions.json")
    }

    pub fn cursor_path(&self) -> PathBuf {
        self.data_dir.join("last_sync.txt")
    }
}
