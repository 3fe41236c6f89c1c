//! Session pipeline — one run, one trading date at a time.
//!
//! Control flow per date: cursor advance → weekend/holiday gate →
//! corporate-action cache freshness → snapshot fetch → sync → adjustment
//! (compute, then commit) → cursor commit → retention cleanup.
//!
//! Outcome model: recoverable conditions (backfilled holiday, unparsable
//! action text, missing rename source, untracked adjusted instrument) are
//! logged and skipped; a `SessionError` is fatal — the in-flight date is
//! rolled back across every series file, the cursor rewinds, and the run
//! halts so the next scheduled invocation retries the same date.

use crate::actions::{ActionParser, ActionStore, ActionStoreError};
use crate::adjust::{self, AdjustError};
use crate::calendar::{CalendarError, DayStatus, HolidayCalendar};
use crate::cleanup;
use crate::config::PipelineConfig;
use crate::cursor::{CursorError, SessionCursor};
use crate::feed::{ExchangeFeed, FeedError};
use crate::rollback;
use crate::store::{SeriesStore, StoreError, SymbolMap};
use crate::sync;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("market holiday today: {0}")]
    HolidayToday(String),

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Calendar(#[from] CalendarError),

    #[error(transparent)]
    Actions(#[from] ActionStoreError),

    #[error("session sync failed for {date}")]
    Sync {
        date: NaiveDate,
        #[source]
        source: StoreError,
    },

    #[error("adjustment failed for {date}")]
    Adjustment {
        date: NaiveDate,
        #[source]
        source: AdjustError,
    },

    #[error(transparent)]
    Cursor(#[from] CursorError),

    #[error("rollback failed, store may hold rows for {date}")]
    Rollback {
        date: NaiveDate,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a completed run did.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub days_completed: usize,
    pub holidays_skipped: usize,
    pub weekends_skipped: usize,
    pub rows_appended: usize,
    pub stale_purged: usize,
}

/// The session pipeline. Stateful services are constructed once per run
/// and driven by reference; their cache files are the only state that
/// survives the process.
pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    feed: &'a dyn ExchangeFeed,
    today: NaiveDate,
    cursor: SessionCursor,
    calendar: HolidayCalendar,
    actions: ActionStore,
    series: SeriesStore,
    symbol_map: SymbolMap,
    parser: ActionParser,
}

impl<'a> Pipeline<'a> {
    /// Wire up a run against wall-clock `today`.
    pub fn new(
        config: &'a PipelineConfig,
        feed: &'a dyn ExchangeFeed,
        today: NaiveDate,
    ) -> Result<Self, SessionError> {
        let seed = config.seed_date.unwrap_or(today - Duration::days(1));

        Ok(Self {
            config,
            feed,
            today,
            cursor: SessionCursor::load(config.cursor_path(), today, seed)?,
            calendar: HolidayCalendar::new(config.holiday_cache_path()),
            actions: ActionStore::new(
                config.action_cache_path(),
                config.action_refresh_days,
                config.action_lookahead_days,
            ),
            series: SeriesStore::new(config.daily_dir()),
            symbol_map: SymbolMap::load(config.isin_path())?,
            parser: ActionParser::new(),
        })
    }

    /// Process every pending date up to today. Stops cleanly when caught
    /// up; any fatal error leaves the store rolled back and the cursor on
    /// the last completed date.
    pub fn run(&mut self) -> Result<RunSummary, SessionError> {
        let mut summary = RunSummary::default();

        while let Some(date) = self.cursor.advance() {
            if is_weekend(date) {
                debug!(%date, "weekend, skipping");
                summary.weekends_skipped += 1;
                continue;
            }

            match self.calendar.status(date, self.feed)? {
                DayStatus::Holiday(description) => {
                    if date == self.today {
                        error!(%date, %description, "market holiday today, halting");
                        return Err(SessionError::HolidayToday(description));
                    }
                    info!(%date, %description, "market holiday, skipping");
                    summary.holidays_skipped += 1;
                    continue;
                }
                DayStatus::Trading => {}
            }

            self.actions.ensure_fresh(self.feed, date)?;

            // Nothing has been written for this date yet; a fetch failure
            // halts without rollback.
            let snapshot = self.feed.fetch_snapshot(date)?;

            info!(%date, instruments = snapshot.len(), "starting session sync");

            match self.sync_and_adjust(date, &snapshot) {
                Ok(appended) => summary.rows_appended += appended,
                Err(err) => {
                    error!(%date, %err, "session failed, rolling back");
                    rollback::rollback(&self.series, date).map_err(|source| {
                        SessionError::Rollback { date, source }
                    })?;
                    self.cursor.reset()?;
                    return Err(err);
                }
            }

            self.cursor.commit()?;
            summary.stale_purged +=
                cleanup::purge_stale(&self.series, self.today, self.config.retention_days)?;
            summary.days_completed += 1;
            info!(%date, "session complete");
        }

        info!(
            days = summary.days_completed,
            last_completed = %self.cursor.last_completed(),
            "run up to date"
        );
        Ok(summary)
    }

    /// The rollback-covered span: series appends, then the two-phase
    /// adjustment batch.
    fn sync_and_adjust(
        &mut self,
        date: NaiveDate,
        snapshot: &[crate::domain::SnapshotRow],
    ) -> Result<usize, SessionError> {
        let report = sync::sync_session(
            snapshot,
            date,
            &self.config.sync_series,
            &self.series,
            &mut self.symbol_map,
            &self.config.archive_dir(),
        )
        .map_err(|source| SessionError::Sync { date, source })?;

        let actions = self.actions.actions_on(date)?;
        if !actions.is_empty() {
            debug!(count = actions.len(), "scanning corporate actions");
        }

        let pending = adjust::scan(
            &actions,
            date,
            &self.series,
            &self.parser,
            self.config.tick_size,
        )
        .map_err(|source| SessionError::Adjustment { date, source })?;

        adjust::commit(pending, &self.series)
            .map_err(|source| SessionError::Adjustment { date, source })?;

        Ok(report.appended)
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
