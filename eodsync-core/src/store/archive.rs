//! Dated snapshot archive for audit/replay.
//!
//! Layout: `{archive_dir}/{year}/{YYYY-MM-DD}.csv`, the session snapshot
//! filtered to the synced listing classes. Independent of per-instrument
//! series and deliberately outside rollback scope: the archive records what
//! the feed delivered, not what the session committed.

use super::StoreError;
use crate::domain::SnapshotRow;
use chrono::{Datelike, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};

/// Archive file path for a session date.
pub fn path_for(archive_dir: &Path, date: NaiveDate) -> PathBuf {
    archive_dir
        .join(date.year().to_string())
        .join(format!("{date}.csv"))
}

/// Persist one session's filtered snapshot.
pub fn write_snapshot(
    archive_dir: &Path,
    date: NaiveDate,
    rows: &[&SnapshotRow],
) -> Result<PathBuf, StoreError> {
    let path = path_for(archive_dir, date);
    let parent = path.parent().expect("archive path has a year directory");
    fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;

    let mut writer = csv::Writer::from_path(&path).map_err(|e| StoreError::csv(&path, e))?;
    for row in rows {
        writer.serialize(row).map_err(|e| StoreError::csv(&path, e))?;
    }
    writer.flush().map_err(|e| StoreError::io(&path, e))?;
    Ok(path)
}
