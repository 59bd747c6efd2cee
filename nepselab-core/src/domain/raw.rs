//! Raw snapshot records as produced by the scraper.

use serde::{Deserialize, Serialize};

/// One indicator snapshot for one symbol at one scrape moment.
///
/// Percentage fields and categorical labels are kept exactly as scraped;
/// the normalizer and encoder turn them into canonical values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSignal {
    pub symbol: String,
    pub technical_summary: String,
    pub technical_entry_risk: String,
    pub sector: String,
    pub daily_gain: String,
    pub ltp: f64,
    pub daily_volatility: String,
    pub price_relative: String,
    #[serde(rename = "trend3M")]
    pub trend_3m: String,
    pub rsi14: f64,
    pub macd_vs_signal_line: String,
    pub percent_b: String,
    pub mfi14: f64,
    pub sto14: f64,
    pub cci14: f64,
    #[serde(rename = "stochRSI")]
    pub stoch_rsi: f64,
    pub sma10: String,
    #[serde(rename = "priceAbove20SMA")]
    pub price_above_20_sma: String,
    #[serde(rename = "priceAbove50SMA")]
    pub price_above_50_sma: String,
    #[serde(rename = "priceAbove200SMA")]
    pub price_above_200_sma: String,
    #[serde(rename = "sma5Above20SMA")]
    pub sma5_above_20_sma: String,
    #[serde(rename = "sma50_200")]
    pub sma50_200: String,
    pub volume_trend: String,
    #[serde(rename = "beta3Month")]
    pub beta_3_month: f64,
    pub scraped_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrape_date: Option<String>,
}

impl RawSignal {
    /// The date portion the record logically belongs to: the embedded
    /// `scrapeDate` when present, otherwise the first ten characters of the
    /// scrape timestamp.
    pub fn scrape_date_str(&self) -> &str {
        match self.scrape_date.as_deref() {
            Some(date) if !date.trim().is_empty() => date.trim(),
            _ => self.scraped_at.get(..10).unwrap_or(&self.scraped_at),
        }
    }
}

/// Header written at the top of every raw snapshot file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMetadata {
    pub total_records: usize,
    pub scraped_at: String,
    pub scrape_date: String,
    pub source: String,
    pub version: String,
}

/// A raw snapshot file: metadata plus loosely-typed records.
///
/// Records stay as JSON values until the schema validator has seen them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFile {
    pub metadata: RawMetadata,
    pub records: Vec<serde_json::Value>,
}
