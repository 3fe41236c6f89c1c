//! NSE feed — blocking HTTP client for the exchange's public endpoints.
//!
//! Fetches the yearly trading-holiday master, the corporate-action window,
//! and the daily bhav copy (a zipped CSV of per-instrument trade summaries).
//! The endpoints are unofficial and subject to unannounced format changes;
//! typed response structs keep the blast radius at this boundary.

use super::{ExchangeFeed, FeedError};
use crate::domain::{CorporateAction, Isin, SnapshotRow};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::time::Duration;

/// Holiday master response. Only the capital-market segment is relevant.
#[derive(Debug, Deserialize)]
struct HolidayMaster {
    #[serde(rename = "CM")]
    cm: Vec<HolidayEntry>,
}

#[derive(Debug, Deserialize)]
struct HolidayEntry {
    #[serde(rename = "tradingDate")]
    trading_date: String,
    description: String,
}

/// One row of the bhav copy CSV. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct BhavRecord {
    #[serde(rename = "SYMBOL")]
    symbol: String,
    #[serde(rename = "SERIES")]
    series: String,
    #[serde(rename = "OPEN")]
    open: f64,
    #[serde(rename = "HIGH")]
    high: f64,
    #[serde(rename = "LOW")]
    low: f64,
    #[serde(rename = "CLOSE")]
    close: f64,
    #[serde(rename = "TOTTRDQTY")]
    volume: u64,
    #[serde(rename = "ISIN")]
    isin: String,
}

/// NSE exchange feed.
pub struct NseFeed {
    client: reqwest::blocking::Client,
    base_url: String,
    archive_url: String,
}

impl NseFeed {
    pub fn new(base_url: impl Into<String>, archive_url: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            archive_url: archive_url.into(),
        }
    }

    /// Bhav copy archive URL, e.g.
    /// `.../content/historical/EQUITIES/2024/JAN/cm26JAN2024bhav.csv.zip`.
    fn bhav_url(&self, date: NaiveDate) -> String {
        let stamp = bhav_stamp(date);
        let month = &stamp[2..5];
        format!(
            "{}/content/historical/EQUITIES/{}/{}/cm{}bhav.csv.zip",
            self.archive_url,
            date.year(),
            month,
            stamp
        )
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, FeedError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| FeedError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp)
    }

    /// Unpack the single CSV member of the bhav zip archive.
    fn unpack_bhav(date: NaiveDate, payload: &[u8]) -> Result<String, FeedError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(payload))
            .map_err(|e| FeedError::Archive(e.to_string()))?;

        let member = format!("cm{}bhav.csv", bhav_stamp(date));
        let mut file = archive
            .by_name(&member)
            .map_err(|e| FeedError::Archive(format!("{member}: {e}")))?;

        let mut text = String::new();
        file.read_to_string(&mut text)
            .map_err(|e| FeedError::Archive(e.to_string()))?;
        Ok(text)
    }

    fn parse_bhav(text: &str) -> Result<Vec<SnapshotRow>, FeedError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        for record in reader.deserialize::<BhavRecord>() {
            let record = record.map_err(|e| FeedError::ResponseFormat(e.to_string()))?;
            rows.push(SnapshotRow {
                isin: Isin::new(record.isin),
                symbol: record.symbol,
                series: record.series,
                open: record.open,
                high: record.high,
                low: record.low,
                close: record.close,
                volume: record.volume,
            });
        }
        Ok(rows)
    }
}

impl ExchangeFeed for NseFeed {
    fn name(&self) -> &str {
        "nse"
    }

    fn fetch_holidays(&self) -> Result<HashMap<String, String>, FeedError> {
        let url = format!("{}/api/holiday-master?type=trading", self.base_url);
        let master: HolidayMaster = self
            .get(&url)?
            .json()
            .map_err(|e| FeedError::ResponseFormat(e.to_string()))?;

        Ok(master
            .cm
            .into_iter()
            .map(|entry| (entry.trading_date, entry.description))
            .collect())
    }

    fn fetch_actions(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CorporateAction>, FeedError> {
        let fmt = "%d-%m-%Y";
        let url = format!(
            "{}/api/corporates-corporateActions?index=equities&from_date={}&to_date={}",
            self.base_url,
            from.format(fmt),
            to.format(fmt)
        );

        self.get(&url)?
            .json()
            .map_err(|e| FeedError::ResponseFormat(e.to_string()))
    }

    fn fetch_snapshot(&self, date: NaiveDate) -> Result<Vec<SnapshotRow>, FeedError> {
        let url = self.bhav_url(date);
        let payload = self
            .get(&url)?
            .bytes()
            .map_err(|e| FeedError::NetworkUnreachable(e.to_string()))?;

        if payload.len() < 500 {
            return Err(FeedError::PayloadTooSmall {
                date,
                len: payload.len(),
            });
        }

        let text = Self::unpack_bhav(date, &payload)?;
        Self::parse_bhav(&text)
    }
}

/// Date stamp used in bhav file names: `26JAN2024`.
fn bhav_stamp(date: NaiveDate) -> String {
    date.format("%d%b%Y").to_string().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn bhav_url_layout() {
        let feed = NseFeed::new("https://x", "https://archives");
        let date = NaiveDate::from_ymd_opt(2024, 1, 26).unwrap();
        assert_eq!(
            feed.bhav_url(date),
            "https://archives/content/historical/EQUITIES/2024/JAN/cm26JAN2024bhav.csv.zip"
        );
    }

    #[test]
    fn bhav_csv_parses_and_ignores_extra_columns() {
        let csv = "\
SYMBOL,SERIES,OPEN,HIGH,LOW,CLOSE,LAST,PREVCLOSE,TOTTRDQTY,TOTTRDVAL,TIMESTAMP,ISIN
ABC,SM,10.0,11.0,9.5,10.5,10.5,10.0,1200,12600.0,26-JAN-2024,INE123A01016
XYZ,EQ,99.0,100.0,98.0,99.5,99.5,99.0,5000,497500.0,26-JAN-2024,INE999A01010
";
        let rows = NseFeed::parse_bhav(csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].isin, Isin::new("INE123A01016"));
        assert_eq!(rows[0].volume, 1200);
        assert_eq!(rows[1].series, "EQ");
    }

    #[test]
    fn bhav_zip_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 26).unwrap();
        let csv = "SYMBOL,SERIES,OPEN,HIGH,LOW,CLOSE,TOTTRDQTY,ISIN\nABC,SM,1,2,1,2,10,IN1\n";

        let mut buf = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buf);
            writer
                .start_file(
                    "cm26JAN2024bhav.csv",
                    zip::write::SimpleFileOptions::default(),
                )
                .unwrap();
            writer.write_all(csv.as_bytes()).unwrap();
            writer.finish().unwrap();
        }

        let text = NseFeed::unpack_bhav(date, buf.get_ref()).unwrap();
        assert_eq!(text, csv);
    }
}
