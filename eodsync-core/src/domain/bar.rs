//! EodRow — the fundamental series unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily OHLCV row in an instrument's series file.
///
/// Serialized column names match the on-disk CSV header exactly:
/// `Date,Open,High,Low,Close,Volume`. Prices carry at most two decimals
/// after an adjustment rewrite; volume is never rescaled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EodRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume")]
    pub volume: u64,
}

impl EodRow {
    /// Basic OHLC sanity check: high is the day's ceiling, low its floor.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}
