//! Rollback coordinator — compensating deletion of one session's rows.
//!
//! The sync engine's per-instrument appends are plain file writes with no
//! journal; the session becomes recoverable by scanning every series file
//! and stripping out any row carrying the failed date. At most one row per
//! file can exist for a session date, so a single pass restores every
//! touched file to its pre-session state. Idempotent: a second pass finds
//! nothing to remove.

use crate::store::{SeriesStore, StoreError};
use chrono::NaiveDate;
use tracing::info;

/// Remove every series row written for `date`. Returns the number of
/// files that had one.
pub fn rollback(store: &SeriesStore, date: NaiveDate) -> Result<usize, StoreError> {
    info!(%date, dir = %store.daily_dir().display(), "rolling back session");

    let mut reverted = 0;
    for path in store.files()? {
        if store.remove_date(&path, date)? {
            reverted += 1;
        }
    }

    info!(reverted, "rollback complete");
    Ok(reverted)
}
