//! Holiday calendar with a yearly cache.
//!
//! The exchange publishes one trading-holiday list per calendar year. The
//! cached copy is trusted while its file-modification year matches the
//! processing year; otherwise one refresh rewrites it. A date that looks
//! like a holiday in a possibly-stale cache forces a single refresh per run
//! before the verdict is trusted, so a just-added unscheduled holiday is
//! not mistaken for stale data.
//!
//! The verdict is descriptive only; the caller decides whether a holiday is
//! fatal (it falls on wall-clock today) or a skippable backfill date.

use crate::feed::{ExchangeFeed, FeedError};
use chrono::{DateTime, Datelike, Local, NaiveDate};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("holiday cache I/O at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("holiday cache unreadable at {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Feed(#[from] FeedError),
}

/// Verdict for one processing date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayStatus {
    Trading,
    Holiday(String),
}

/// The holiday calendar service. One instance per run.
pub struct HolidayCalendar {
    cache_path: PathBuf,
    refreshed_this_run: bool,
}

impl HolidayCalendar {
    pub fn new(cache_path: impl Into<PathBuf>) -> Self {
        Self {
            cache_path: cache_path.into(),
            refreshed_this_run: false,
        }
    }

    /// Classify one processing date, refreshing the yearly cache as needed.
    pub fn status(
        &mut self,
        date: NaiveDate,
        feed: &dyn ExchangeFeed,
    ) -> Result<DayStatus, CalendarError> {
        let mut holidays = if self.cache_year_matches(date)? {
            self.read_cache()?
        } else {
            self.refresh(feed)?
        };

        let key = date.format(crate::domain::action::exchange_date::FORMAT).to_string();

        if holidays.contains_key(&key) && !self.refreshed_this_run {
            // The flagged date may be stale data; trust it only after one
            // refresh per run.
            holidays = self.refresh(feed)?;
        }

        match holidays.get(&key) {
            Some(description) => Ok(DayStatus::Holiday(description.clone())),
            None => Ok(DayStatus::Trading),
        }
    }

    /// The cache is current while its modification-time year matches the
    /// processing year.
    fn cache_year_matches(&self, date: NaiveDate) -> Result<bool, CalendarError> {
        if !self.cache_path.exists() {
            return Ok(false);
        }
        let modified = fs::metadata(&self.cache_path)
            .and_then(|meta| meta.modified())
            .map_err(|e| CalendarError::Io {
                path: self.cache_path.clone(),
                source: e,
            })?;
        let modified: DateTime<Local> = modified.into();
        Ok(modified.year() == date.year())
    }

    fn read_cache(&self) -> Result<HashMap<String, String>, CalendarError> {
        let text = fs::read_to_string(&self.cache_path).map_err(|e| CalendarError::Io {
            path: self.cache_path.clone(),
            source: e,
        })?;
        serde_json::from_str(&text).map_err(|e| CalendarError::Malformed {
            path: self.cache_path.clone(),
            source: e,
        })
    }

    fn refresh(
        &mut self,
        feed: &dyn ExchangeFeed,
    ) -> Result<HashMap<String, String>, CalendarError> {
        let holidays = feed.fetch_holidays()?;

        if let Some(parent) = self.cache_path.parent() {
            fs::create_dir_all(parent).map_err(|e| CalendarError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let text = serde_json::to_string_pretty(&holidays).map_err(|e| {
            CalendarError::Malformed {
                path: self.cache_path.clone(),
                source: e,
            }
        })?;
        fs::write(&self.cache_path, text).map_err(|e| CalendarError::Io {
            path: self.cache_path.clone(),
            source: e,
        })?;

        info!(feed = feed.name(), "holiday list updated");
        self.refreshed_this_run = true;
        Ok(holidays)
    }
}
