//! Snapshot rows — one instrument per row in the exchange's daily bulk file.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable instrument identifier.
///
/// An ISIN survives symbol renames, so it is the key of the symbol map and
/// the signal for detecting that an instrument's display name changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Isin(pub String);

impl Isin {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }
}

impl fmt::Display for Isin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One instrument's row in a session snapshot.
///
/// Serialized column names match the snapshot archive header. The listing
/// class (`series`) decides whether the row is synced at all; the pipeline
/// only merges the classes configured for its deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRow {
    #[serde(rename = "ISIN")]
    pub isin: Isin,
    #[serde(rename = "SYMBOL")]
    pub symbol: String,
    #[serde(rename = "SERIES")]
    pub series: String,
    #[serde(rename = "OPEN")]
    pub open: f64,
    #[serde(rename = "HIGH")]
    pub high: f64,
    #[serde(rename = "LOW")]
    pub low: f64,
    #[serde(rename = "CLOSE")]
    pub close: f64,
    #[serde(rename = "VOLUME")]
    pub volume: u64,
}
