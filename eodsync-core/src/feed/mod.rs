//! Exchange feed trait and structured error types.
//!
//! The ExchangeFeed trait abstracts the three remote collaborators the
//! pipeline depends on (holiday master, corporate actions, daily snapshot)
//! so the pipeline can be exercised against a stub in tests.

use crate::domain::{CorporateAction, SnapshotRow};
use chrono::NaiveDate;
use std::collections::HashMap;
use thiserror::Error;

pub mod nse;

pub use nse::NseFeed;

/// Structured error types for feed operations.
///
/// Transient failures are fatal to the run: the pipeline performs no
/// internal retry, retry happens on the next scheduled invocation.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("snapshot payload implausibly small ({len} bytes) for {date}")]
    PayloadTooSmall { date: NaiveDate, len: usize },

    #[error("snapshot archive unreadable: {0}")]
    Archive(String),

    #[error("response format changed: {0}")]
    ResponseFormat(String),
}

/// Remote collaborators of the pipeline, behind one blocking trait.
///
/// All calls are synchronous with no retry/backoff; the snapshot fetch
/// validates payload plausibility before returning rows.
pub trait ExchangeFeed {
    /// Human-readable name of this feed.
    fn name(&self) -> &str;

    /// Trading-holiday list for the current calendar year:
    /// `DD-Mon-YYYY` date string mapped to a textual description.
    fn fetch_holidays(&self) -> Result<HashMap<String, String>, FeedError>;

    /// Corporate actions announced for the given date range.
    fn fetch_actions(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CorporateAction>, FeedError>;

    /// The full per-instrument snapshot for one session.
    ///
    /// Returns every listed instrument; the sync engine filters to the
    /// listing classes relevant to its deployment.
    fn fetch_snapshot(&self, date: NaiveDate) -> Result<Vec<SnapshotRow>, FeedError>;
}
