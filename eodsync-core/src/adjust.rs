//! Adjustment engine — retroactive rescaling for splits and bonus issues.
//!
//! Two-phase compute-then-commit: the scan accumulates every rescaled
//! series in memory and nothing touches disk until the whole day's scan
//! has succeeded. A fatal error anywhere discards the entire batch, so
//! adjustment is all-or-nothing across all instruments for a given day.
//!
//! Recoverable per-action outcomes (unparsable subject, instrument not
//! tracked by this deployment) are logged and skipped without aborting.

use crate::actions::parse::{is_bonus, is_split, ActionParser};
use crate::domain::{CorporateAction, EodRow};
use crate::store::{SeriesStore, StoreError};
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum AdjustError {
    #[error("no row at effective date {date} in series for {symbol}")]
    MissingEffectiveRow { symbol: String, date: NaiveDate },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One rescaled series waiting for commit.
#[derive(Debug)]
pub struct PendingWrite {
    pub path: PathBuf,
    pub rows: Vec<EodRow>,
}

/// Scan the day's actions and compute the full pending batch.
///
/// The effective-date row must already exist in the series: the action
/// fires on a date the session has just synced. Its absence in a tracked
/// instrument is a fatal session error.
pub fn scan(
    actions: &[CorporateAction],
    date: NaiveDate,
    store: &SeriesStore,
    parser: &ActionParser,
    tick: f64,
) -> Result<Vec<PendingWrite>, AdjustError> {
    let mut pending = Vec::new();

    for action in actions {
        let mut factors = Vec::new();

        if is_split(&action.subject) {
            match parser.split_factor(&action.subject) {
                Some(factor) => factors.push(factor),
                None => warn!(
                    symbol = %action.symbol,
                    subject = %action.subject,
                    "split ratio not matched, skipping action"
                ),
            }
        }

        if is_bonus(&action.subject) {
            match parser.bonus_factor(&action.subject) {
                Some(factor) => factors.push(factor),
                None => warn!(
                    symbol = %action.symbol,
                    subject = %action.subject,
                    "bonus ratio not matched, skipping action"
                ),
            }
        }

        for factor in factors {
            if let Some(write) = make_adjustment(&action.symbol, factor, date, store, tick)? {
                info!(symbol = %action.symbol, factor, subject = %action.subject, "adjustment staged");
                pending.push(write);
            }
        }
    }

    Ok(pending)
}

/// Commit every pending write. Called only after a fully successful scan.
pub fn commit(pending: Vec<PendingWrite>, store: &SeriesStore) -> Result<(), AdjustError> {
    for write in pending {
        store.write_all(&write.path, &write.rows)?;
    }
    Ok(())
}

/// Rescale one instrument's history for an adjustment factor.
///
/// Returns `None` when the instrument has no series file here — actions
/// cover listing classes beyond the synced board, so this is a skip, not
/// an error.
fn make_adjustment(
    symbol: &str,
    factor: f64,
    date: NaiveDate,
    store: &SeriesStore,
    tick: f64,
) -> Result<Option<PendingWrite>, AdjustError> {
    let path = store.path_for(symbol);
    if !path.exists() {
        warn!(%symbol, "no series file for adjusted instrument, skipping");
        return Ok(None);
    }

    let rows = store.load(&path)?;
    let ex_index = rows
        .iter()
        .position(|row| row.date == date)
        .ok_or_else(|| AdjustError::MissingEffectiveRow {
            symbol: symbol.to_string(),
            date,
        })?;

    let rows = rescale(&rows, ex_index, factor, tick);
    Ok(Some(PendingWrite { path, rows }))
}

/// Divide every price column of the rows before `ex_index` by `factor`,
/// snap to the tick grid, and round to two decimals. Rows from `ex_index`
/// on, and volume everywhere, are untouched. Date order is preserved.
pub fn rescale(rows: &[EodRow], ex_index: usize, factor: f64, tick: f64) -> Vec<EodRow> {
    let rescale_price = |value: f64| snap_to_tick(value / factor, tick);

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            if i >= ex_index {
                return row.clone();
            }
            EodRow {
                date: row.date,
                open: rescale_price(row.open),
                high: rescale_price(row.high),
                low: rescale_price(row.low),
                close: rescale_price(row.close),
                volume: row.volume,
            }
        })
        .collect()
}

/// Nearest multiple of `tick`, then rounded to two decimals.
pub fn snap_to_tick(value: f64, tick: f64) -> f64 {
    let snapped = (value / tick).round() * tick;
    (snapped * 100.0).round() / 100.0
}
