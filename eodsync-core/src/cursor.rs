//! Session cursor — the pipeline's notion of "where processing stands."
//!
//! Holds the current processing date and the last successfully completed
//! date. Advances by exactly one calendar day per iteration regardless of
//! holidays (non-trading days short-circuit the rest of the pipeline, not
//! the advance), stops once the next date would pass wall-clock today,
//! and persists progress only on successful completion of a date.

use chrono::{Duration, NaiveDate};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CursorError {
    #[error("cursor state I/O at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cursor state unreadable at {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: chrono::ParseError,
    },
}

/// The session cursor service. One instance per run.
#[derive(Debug)]
pub struct SessionCursor {
    path: PathBuf,
    today: NaiveDate,
    current: NaiveDate,
    last_completed: NaiveDate,
}

impl SessionCursor {
    /// Read the persisted last-completed date, or seed it on first run.
    pub fn load(
        path: impl Into<PathBuf>,
        today: NaiveDate,
        seed: NaiveDate,
    ) -> Result<Self, CursorError> {
        let path = path.into();

        let last_completed = if path.exists() {
            let text = fs::read_to_string(&path).map_err(|e| CursorError::Io {
                path: path.clone(),
                source: e,
            })?;
            text.trim()
                .parse()
                .map_err(|e| CursorError::Malformed {
                    path: path.clone(),
                    source: e,
                })?
        } else {
            seed
        };

        Ok(Self {
            path,
            today,
            current: last_completed,
            last_completed,
        })
    }

    /// Move the current date forward one calendar day. `None` means the
    /// run has caught up with today and should stop cleanly.
    pub fn advance(&mut self) -> Option<NaiveDate> {
        let next = self.current + Duration::days(1);
        if next > self.today {
            return None;
        }
        self.current = next;
        Some(next)
    }

    pub fn current(&self) -> NaiveDate {
        self.current
    }

    pub fn last_completed(&self) -> NaiveDate {
        self.last_completed
    }

    /// Persist the current date as the new last-completed date.
    pub fn commit(&mut self) -> Result<(), CursorError> {
        self.last_completed = self.current;
        self.persist()
    }

    /// Rewind to the last-completed date after a failed day, so the next
    /// run retries the same trading date. The state file is rewritten
    /// explicitly even though its value is unchanged.
    pub fn reset(&mut self) -> Result<(), CursorError> {
        self.current = self.last_completed;
        self.persist()
    }

    fn persist(&self) -> Result<(), CursorError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| CursorError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        fs::write(&self.path, format!("{}\n", self.last_completed)).map_err(|e| {
            CursorError::Io {
                path: self.path.clone(),
                source: e,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::series::tests::temp_dir;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn advances_one_day_at_a_time_up_to_today() {
        let dir = temp_dir("cursor");
        let mut cursor =
            SessionCursor::load(dir.join("last_sync.txt"), d("2024-01-29"), d("2024-01-26"))
                .unwrap();

        assert_eq!(cursor.advance(), Some(d("2024-01-27")));
        assert_eq!(cursor.advance(), Some(d("2024-01-28")));
        assert_eq!(cursor.advance(), Some(d("2024-01-29")));
        assert_eq!(cursor.advance(), None);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn commit_persists_and_resume_continues() {
        let dir = temp_dir("cursor");
        let path = dir.join("last_sync.txt");

        let mut cursor = SessionCursor::load(&path, d("2024-01-29"), d("2024-01-26")).unwrap();
        cursor.advance();
        cursor.commit().unwrap();

        // A fresh process resumes at the day after the committed date.
        let mut resumed = SessionCursor::load(&path, d("2024-01-29"), d("2024-01-01")).unwrap();
        assert_eq!(resumed.last_completed(), d("2024-01-27"));
        assert_eq!(resumed.advance(), Some(d("2024-01-28")));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn reset_rewinds_to_last_completed() {
        let dir = temp_dir("cursor");
        let mut cursor =
            SessionCursor::load(dir.join("last_sync.txt"), d("2024-01-29"), d("2024-01-26"))
                .unwrap();

        cursor.advance();
        cursor.reset().unwrap();
        assert_eq!(cursor.current(), d("2024-01-26"));

        // Retry walks the same date again.
        assert_eq!(cursor.advance(), Some(d("2024-01-27")));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn current_never_falls_behind_last_completed() {
        let dir = temp_dir("cursor");
        let mut cursor =
            SessionCursor::load(dir.join("last_sync.txt"), d("2024-01-29"), d("2024-01-26"))
                .unwrap();

        cursor.advance();
        cursor.commit().unwrap();
        assert!(cursor.current() >= cursor.last_completed());
        cursor.reset().unwrap();
        assert!(cursor.current() >= cursor.last_completed());

        let _ = fs::remove_dir_all(&dir);
    }
}
