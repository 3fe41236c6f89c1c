//! Corporate-action store — a locally cached rolling window of action
//! records, refreshed on a fixed cadence.
//!
//! Freshness is measured against the processing date, not wall-clock now:
//! a backfill run decides staleness from the date it is syncing. The
//! refresh fetch starts where the previous window left off (modification
//! time + refresh interval) and extends past the processing date by the
//! lookahead, so upcoming effective dates are already cached when the
//! cursor reaches them.

use crate::domain::CorporateAction;
use crate::feed::{ExchangeFeed, FeedError};
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// Listing classes whose actions are in scope; everything else is
/// silently skipped.
pub const ACTION_SERIES: [&str; 3] = ["EQ", "BE", "BZ"];

#[derive(Debug, Error)]
pub enum ActionStoreError {
    #[error("action cache I/O at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("action cache unreadable at {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Feed(#[from] FeedError),
}

/// The corporate-action store service. One instance per run.
pub struct ActionStore {
    cache_path: PathBuf,
    refresh_days: i64,
    lookahead_days: i64,
}

impl ActionStore {
    pub fn new(cache_path: impl Into<PathBuf>, refresh_days: i64, lookahead_days: i64) -> Self {
        Self {
            cache_path: cache_path.into(),
            refresh_days,
            lookahead_days,
        }
    }

    /// Make sure the cached window covers the processing date.
    ///
    /// No cache: fetch `[date, date + lookahead]`. Cache present: refresh
    /// only when it is older than the refresh interval, fetching
    /// `[modified + refresh, date + lookahead]`.
    pub fn ensure_fresh(
        &self,
        feed: &dyn ExchangeFeed,
        date: NaiveDate,
    ) -> Result<(), ActionStoreError> {
        let lookahead = Duration::days(self.lookahead_days);

        if !self.cache_path.exists() {
            return self.refresh(feed, date, date + lookahead);
        }

        let modified = self.modified_at()?;
        if needs_refresh(modified, date, self.refresh_days) {
            let from = modified.date() + Duration::days(self.refresh_days);
            return self.refresh(feed, from, date + lookahead);
        }
        Ok(())
    }

    /// Actions effective on `date`, filtered to the in-scope listing classes.
    pub fn actions_on(&self, date: NaiveDate) -> Result<Vec<CorporateAction>, ActionStoreError> {
        let text = fs::read_to_string(&self.cache_path).map_err(|e| ActionStoreError::Io {
            path: self.cache_path.clone(),
            source: e,
        })?;
        let all: Vec<CorporateAction> =
            serde_json::from_str(&text).map_err(|e| ActionStoreError::Malformed {
                path: self.cache_path.clone(),
                source: e,
            })?;

        Ok(all
            .into_iter()
            .filter(|action| {
                action.ex_date == date && ACTION_SERIES.contains(&action.series.as_str())
            })
            .collect())
    }

    fn refresh(
        &self,
        feed: &dyn ExchangeFeed,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<(), ActionStoreError> {
        info!(%from, %to, feed = feed.name(), "updating corporate actions cache");
        let actions = feed.fetch_actions(from, to)?;

        if let Some(parent) = self.cache_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ActionStoreError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let text = serde_json::to_string_pretty(&actions).map_err(|e| {
            ActionStoreError::Malformed {
                path: self.cache_path.clone(),
                source: e,
            }
        })?;
        fs::write(&self.cache_path, text).map_err(|e| ActionStoreError::Io {
            path: self.cache_path.clone(),
            source: e,
        })
    }

    fn modified_at(&self) -> Result<NaiveDateTime, ActionStoreError> {
        let modified = fs::metadata(&self.cache_path)
            .and_then(|meta| meta.modified())
            .map_err(|e| ActionStoreError::Io {
                path: self.cache_path.clone(),
                source: e,
            })?;
        let modified: DateTime<Local> = modified.into();
        Ok(modified.naive_local())
    }
}

/// Staleness check: elapsed time from the cache's last refresh to the
/// processing date's midnight, compared against the refresh interval.
fn needs_refresh(modified: NaiveDateTime, date: NaiveDate, refresh_days: i64) -> bool {
    let processing_midnight = date.and_hms_opt(0, 0, 0).expect("midnight is valid");
    processing_midnight - modified > Duration::days(refresh_days)
}
