//! Per-instrument CSV series store.
//!
//! Layout: `{daily_dir}/{symbol_lowercase}.csv` with header
//! `Date,Open,High,Low,Close,Volume`, rows date-ordered, one per session.
//!
//! Appends go straight to the file. Full rewrites (adjustment commits,
//! rollback deletions) are atomic: write to a `.tmp` sibling, rename into
//! place.

use super::StoreError;
use crate::domain::EodRow;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

/// The per-instrument series store.
pub struct SeriesStore {
    daily_dir: PathBuf,
}

impl SeriesStore {
    pub fn new(daily_dir: impl Into<PathBuf>) -> Self {
        Self {
            daily_dir: daily_dir.into(),
        }
    }

    /// Root directory holding one CSV file per instrument.
    pub fn daily_dir(&self) -> &Path {
        &self.daily_dir
    }

    /// Series file path for a display symbol: `{daily_dir}/{symbol}.csv`,
    /// symbol lower-cased.
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.daily_dir.join(format!("{}.csv", symbol.to_lowercase()))
    }

    /// Append one row to a symbol's series, writing the header first when
    /// the file is new. The caller guarantees at-most-once per date.
    pub fn append(&self, symbol: &str, row: &EodRow) -> Result<(), StoreError> {
        fs::create_dir_all(&self.daily_dir)
            .map_err(|e| StoreError::io(&self.daily_dir, e))?;

        let path = self.path_for(symbol);
        let is_new = !path.exists();

        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);
        writer
            .serialize(row)
            .map_err(|e| StoreError::csv(&path, e))?;
        writer
            .flush()
            .map_err(|e| StoreError::io(&path, e))?;
        Ok(())
    }

    /// Load a full series, in file order.
    pub fn load(&self, path: &Path) -> Result<Vec<EodRow>, StoreError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| StoreError::csv(path, e))?;
        reader
            .deserialize()
            .collect::<Result<Vec<EodRow>, _>>()
            .map_err(|e| StoreError::csv(path, e))
    }

    /// Rewrite a full series atomically (tmp file + rename).
    pub fn write_all(&self, path: &Path, rows: &[EodRow]) -> Result<(), StoreError> {
        let tmp = path.with_extension("csv.tmp");

        let mut writer = csv::Writer::from_path(&tmp).map_err(|e| StoreError::csv(&tmp, e))?;
        if rows.is_empty() {
            // serialize() emits the header lazily; keep it for empty files
            // so a later append does not misread the first data row.
            writer
                .write_record(["Date", "Open", "High", "Low", "Close", "Volume"])
                .map_err(|e| StoreError::csv(&tmp, e))?;
        }
        for row in rows {
            writer.serialize(row).map_err(|e| StoreError::csv(&tmp, e))?;
        }
        writer.flush().map_err(|e| StoreError::io(&tmp, e))?;
        drop(writer);

        fs::rename(&tmp, path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            StoreError::io(path, e)
        })
    }

    /// Rename a series file after a symbol change.
    ///
    /// A missing source file is reported as `RenameSourceMissing` so the
    /// sync engine can log it and continue under the new name.
    pub fn rename(&self, old_symbol: &str, new_symbol: &str) -> Result<(), StoreError> {
        let old = self.path_for(old_symbol);
        let new = self.path_for(new_symbol);

        if !old.exists() {
            return Err(StoreError::RenameSourceMissing { old });
        }
        fs::rename(&old, &new).map_err(|e| StoreError::io(&old, e))
    }

    /// Drop the row for `date` from one series file, rewriting it without
    /// that row. Returns whether a row was removed; a second call for the
    /// same date is a no-op.
    pub fn remove_date(&self, path: &Path, date: NaiveDate) -> Result<bool, StoreError> {
        let rows = self.load(path)?;
        let kept: Vec<EodRow> = rows.iter().filter(|r| r.date != date).cloned().collect();

        if kept.len() == rows.len() {
            return Ok(false);
        }
        self.write_all(path, &kept)?;
        Ok(true)
    }

    /// Date of the last row in a series file, `None` for a header-only file.
    pub fn last_date(&self, path: &Path) -> Result<Option<NaiveDate>, StoreError> {
        Ok(self.load(path)?.last().map(|row| row.date))
    }

    /// All series files currently in the daily folder.
    pub fn files(&self) -> Result<Vec<PathBuf>, StoreError> {
        if !self.daily_dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.daily_dir)
            .map_err(|e| StoreError::io(&self.daily_dir, e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.daily_dir, e))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("csv") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::env;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    pub(crate) fn temp_dir(tag: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = env::temp_dir().join(format!("eodsync_{tag}_{}_{id}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    pub(crate) fn row(date: &str, close: f64) -> EodRow {
        EodRow {
            date: date.parse().unwrap(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn append_writes_header_once() {
        let dir = temp_dir("series");
        let store = SeriesStore::new(&dir);

        store.append("ABC", &row("2024-01-02", 100.0)).unwrap();
        store.append("ABC", &row("2024-01-03", 101.0)).unwrap();

        let text = fs::read_to_string(store.path_for("ABC")).unwrap();
        assert_eq!(text.matches("Date,Open,High,Low,Close,Volume").count(), 1);

        let rows = store.load(&store.path_for("abc")).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].close, 101.0);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn path_is_lowercased_symbol() {
        let store = SeriesStore::new("daily");
        assert!(store.path_for("TATAMOTORS").ends_with("tatamotors.csv"));
    }

    #[test]
    fn rename_moves_history() {
        let dir = temp_dir("series");
        let store = SeriesStore::new(&dir);

        store.append("ABC", &row("2024-01-02", 100.0)).unwrap();
        store.rename("ABC", "XYZ").unwrap();

        assert!(!store.path_for("ABC").exists());
        let rows = store.load(&store.path_for("XYZ")).unwrap();
        assert_eq!(rows.len(), 1);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn rename_missing_source_is_reported() {
        let dir = temp_dir("series");
        let store = SeriesStore::new(&dir);

        let err = store.rename("GHOST", "XYZ").unwrap_err();
        assert!(matches!(err, StoreError::RenameSourceMissing { .. }));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn remove_date_is_idempotent() {
        let dir = temp_dir("series");
        let store = SeriesStore::new(&dir);
        let path = store.path_for("abc");

        store.append("abc", &row("2024-01-02", 100.0)).unwrap();
        store.append("abc", &row("2024-01-03", 101.0)).unwrap();

        let date = "2024-01-03".parse().unwrap();
        assert!(store.remove_date(&path, date).unwrap());
        assert!(!store.remove_date(&path, date).unwrap());

        let rows = store.load(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].close, 100.0);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_all_replaces_contents() {
        let dir = temp_dir("series");
        let store = SeriesStore::new(&dir);
        let path = store.path_for("abc");

        store.append("abc", &row("2024-01-02", 100.0)).unwrap();
        store
            .write_all(&path, &[row("2024-01-02", 50.0), row("2024-01-03", 51.0)])
            .unwrap();

        let rows = store.load(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].close, 50.0);
        assert!(!path.with_extension("csv.tmp").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn last_date_reads_final_row() {
        let dir = temp_dir("series");
        let store = SeriesStore::new(&dir);

        store.append("abc", &row("2024-01-02", 100.0)).unwrap();
        store.append("abc", &row("2024-01-03", 101.0)).unwrap();

        let last = store.last_date(&store.path_for("abc")).unwrap();
        assert_eq!(last, Some("2024-01-03".parse().unwrap()));

        let _ = fs::remove_dir_all(&dir);
    }
}
