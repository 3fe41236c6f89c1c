//! Session sync engine — merges one day's snapshot into the series store.
//!
//! Identity is resolved through the ISIN map: an unseen identifier is
//! registered, and a mapped symbol that differs from the row's symbol is a
//! rename, which moves the on-disk series file before appending. The map
//! is persisted once at the end of the batch, only if it changed.
//!
//! Appends are not transactional with each other; recoverability comes
//! from the rollback coordinator, which can strip the session date out of
//! every series file.

use crate::domain::{EodRow, SnapshotRow};
use crate::store::{archive, SeriesStore, StoreError, SymbolMap};
use chrono::NaiveDate;
use std::path::Path;
use tracing::{info, warn};

/// What one session sync did, for logging and the run summary.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub appended: usize,
    pub renames: usize,
    pub registered: usize,
}

/// Merge the snapshot rows for `date` into the per-instrument series.
///
/// Only rows whose listing class appears in `sync_series` participate.
/// The filtered snapshot is archived first, then each row is resolved and
/// appended. At-most-once per date is the session cursor's guarantee, not
/// this function's.
pub fn sync_session(
    snapshot: &[SnapshotRow],
    date: NaiveDate,
    sync_series: &[String],
    store: &SeriesStore,
    map: &mut SymbolMap,
    archive_dir: &Path,
) -> Result<SyncReport, StoreError> {
    let relevant: Vec<&SnapshotRow> = snapshot
        .iter()
        .filter(|row| sync_series.iter().any(|s| s == &row.series))
        .collect();

    archive::write_snapshot(archive_dir, date, &relevant)?;

    let mut report = SyncReport::default();

    for row in &relevant {
        let mapped = map.get(&row.isin).map(str::to_string);
        match mapped {
            None => {
                map.insert(row.isin.clone(), row.symbol.clone());
                report.registered += 1;
            }
            Some(old) if old != row.symbol => {
                match store.rename(&old, &row.symbol) {
                    Ok(()) => {}
                    Err(StoreError::RenameSourceMissing { old }) => {
                        warn!(old = %old.display(), new = %row.symbol, "rename source missing, continuing");
                    }
                    Err(e) => return Err(e),
                }
                map.insert(row.isin.clone(), row.symbol.clone());
                info!(%old, new = %row.symbol, isin = %row.isin, "symbol renamed");
                report.renames += 1;
            }
            Some(_) => {}
        }

        store.append(
            &row.symbol,
            &EodRow {
                date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            },
        )?;
        report.appended += 1;
    }

    if map.save_if_dirty()? {
        info!(entries = map.len(), "symbol map persisted");
    }

    Ok(report)
}
