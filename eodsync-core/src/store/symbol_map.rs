//! ISIN↔symbol map.
//!
//! Keyed by the stable identifier, value is the current display symbol.
//! Bijective at any instant: a rename replaces the old symbol under its
//! ISIN, it never leaves two identifiers pointing at one live symbol.
//! Persisted at session end only when something changed.

use super::StoreError;
use crate::domain::Isin;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize)]
struct MapRecord {
    #[serde(rename = "ISIN")]
    isin: Isin,
    #[serde(rename = "SYMBOL")]
    symbol: String,
}

/// The identifier↔symbol map, backed by a two-column CSV.
///
/// A `BTreeMap` keeps the persisted file deterministically ordered.
pub struct SymbolMap {
    path: PathBuf,
    entries: BTreeMap<Isin, String>,
    dirty: bool,
}

impl SymbolMap {
    /// Load the map from disk; a missing file yields an empty map.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut entries = BTreeMap::new();

        if path.exists() {
            let mut reader =
                csv::Reader::from_path(&path).map_err(|e| StoreError::csv(&path, e))?;
            for record in reader.deserialize::<MapRecord>() {
                let record = record.map_err(|e| StoreError::csv(&path, e))?;
                entries.insert(record.isin, record.symbol);
            }
        }

        Ok(Self {
            path,
            entries,
            dirty: false,
        })
    }

    /// Current display symbol for an identifier.
    pub fn get(&self, isin: &Isin) -> Option<&str> {
        self.entries.get(isin).map(String::as_str)
    }

    /// Register or replace the symbol under an identifier, marking the map
    /// dirty when anything actually changed.
    pub fn insert(&mut self, isin: Isin, symbol: impl Into<String>) {
        let symbol = symbol.into();
        if self.entries.get(&isin) != Some(&symbol) {
            self.entries.insert(isin, symbol);
            self.dirty = true;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Persist the map iff it changed since load. Returns whether a write
    /// happened.
    pub fn save_if_dirty(&mut self) -> Result<bool, StoreError> {
        if !self.dirty {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let mut writer =
            csv::Writer::from_path(&self.path).map_err(|e| StoreError::csv(&self.path, e))?;
        for (isin, symbol) in &self.entries {
            writer
                .serialize(MapRecord {
                    isin: isin.clone(),
                    symbol: symbol.clone(),
                })
                .map_err(|e| StoreError::csv(&self.path, e))?;
        }
        writer.flush().map_err(|e| StoreError::io(&self.path, e))?;

        self.dirty = false;
        Ok(true)
    }
}
