//! Persistent state: per-instrument series files, the ISIN↔symbol map,
//! and the dated snapshot archive.

use std::path::PathBuf;
use thiserror::Error;

pub mod archive;
pub mod series;
pub mod symbol_map;

pub use series::SeriesStore;
pub use symbol_map::SymbolMap;

/// Structured error types for on-disk store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error at {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("rename source missing: {old}")]
    RenameSourceMissing { old: PathBuf },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}
