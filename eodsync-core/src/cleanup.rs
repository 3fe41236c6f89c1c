//! Retention cleanup — drop series files that stopped trading.
//!
//! A series whose last row is older than the retention window is assumed
//! delisted and deleted. Runs after each successful session; also exposed
//! as a CLI command with a dry-run listing.

use crate::store::{SeriesStore, StoreError};
use chrono::{Duration, NaiveDate};
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Series files whose last row predates `today - retention_days`.
pub fn find_stale(
    store: &SeriesStore,
    today: NaiveDate,
    retention_days: i64,
) -> Result<Vec<(PathBuf, NaiveDate)>, StoreError> {
    let deadline = today - Duration::days(retention_days);
    let mut stale = Vec::new();

    for path in store.files()? {
        if let Some(last) = store.last_date(&path)? {
            if last < deadline {
                stale.push((path, last));
            }
        }
    }
    Ok(stale)
}

/// Delete stale series files; returns how many were removed.
pub fn purge_stale(
    store: &SeriesStore,
    today: NaiveDate,
    retention_days: i64,
) -> Result<usize, StoreError> {
    let stale = find_stale(store, today, retention_days)?;
    for (path, last) in &stale {
        fs::remove_file(path).map_err(|e| StoreError::io(path, e))?;
        info!(path = %path.display(), %last, "stale series removed");
    }
    Ok(stale.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::series::tests::{row, temp_dir};

    #[test]
    fn purges_only_beyond_retention() {
        let dir = temp_dir("cleanup");
        let store = SeriesStore::new(&dir);

        store.append("fresh", &row("2024-01-20", 10.0)).unwrap();
        store.append("stale", &row("2022-06-01", 10.0)).unwrap();

        let today = "2024-01-26".parse().unwrap();
        assert_eq!(purge_stale(&store, today, 365).unwrap(), 1);

        assert!(store.path_for("fresh").exists());
        assert!(!store.path_for("stale").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn boundary_date_is_kept() {
        let dir = temp_dir("cleanup");
        let store = SeriesStore::new(&dir);

        // Exactly at the deadline: kept (strictly-older files are purged).
        store.append("edge", &row("2023-01-26", 10.0)).unwrap();

        let today = "2024-01-26".parse().unwrap();
        assert_eq!(purge_stale(&store, today, 365).unwrap(), 0);
        assert!(store.path_for("edge").exists());

        let _ = fs::remove_dir_all(&dir);
    }
}
