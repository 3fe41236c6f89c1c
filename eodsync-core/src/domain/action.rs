//! Corporate action records as delivered by the exchange feed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One corporate-action announcement.
///
/// Not unique per symbol: an instrument may carry several actions with
/// different effective dates. The `subject` is free text; the adjustment
/// engine extracts split/bonus ratios from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorporateAction {
    pub symbol: String,
    pub series: String,
    #[serde(rename = "exDate", with = "exchange_date")]
    pub ex_date: NaiveDate,
    pub subject: String,
    #[serde(default)]
    pub purpose: String,
}

/// Serde adapter for the exchange's `DD-Mon-YYYY` date format.
///
/// Used for corporate-action effective dates and holiday-list keys; the
/// rest of the pipeline works with `NaiveDate` and ISO formatting.
pub mod exchange_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%d-%b-%Y";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
