//! Shared fixtures for pipeline scenario tests.

#![allow(dead_code)]

use std::path::Path;

use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::{json, Value};

use nepselab_pipeline::{write_raw_snapshot_at, PipelineConfig, PipelineRunner, StoreLayout};

pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// A valid raw record. `scrapeDate` is left for the file header to supply.
pub fn raw_record(symbol: &str, rsi: f64) -> Value {
    json!({
        "symbol": symbol,
        "technicalSummary": "Medium Bullish",
        "technicalEntryRisk": "Medium Risk",
        "sector": "Commercial Banks",
        "dailyGain": "1.25%",
        "ltp": 512.3,
        "dailyVolatility": "2.10%",
        "priceRelative": "-0.40%",
        "trend3M": "TRENDING",
        "rsi14": rsi,
        "macdVsSignalLine": "Bullish",
        "percentB": "78.5%",
        "mfi14": 55.0,
        "sto14": 70.1,
        "cci14": -120.4,
        "stochRSI": 88.0,
        "sma10": "Price Above Moving Average",
        "priceAbove20SMA": "Price Above Moving Average",
        "priceAbove50SMA": "Price Below Moving Average",
        "priceAbove200SMA": "Price Above Moving Average",
        "sma5Above20SMA": "Bullish",
        "sma50_200": "Neutral",
        "volumeTrend": "Trending Up",
        "beta3Month": 1.1,
        "scrapedAt": "2026-02-10T09:15:00.000Z"
    })
}

/// The same record pinned to `date`.
pub fn raw_record_on(symbol: &str, rsi: f64, date: &str) -> Value {
    let mut record = raw_record(symbol, rsi);
    record["scrapeDate"] = json!(date);
    record
}

pub fn runner(dir: &Path) -> PipelineRunner {
    PipelineRunner::new(PipelineConfig::with_base_path(dir))
}

pub fn layout(dir: &Path) -> StoreLayout {
    StoreLayout::new(dir, "nepse")
}

/// Write a raw snapshot for `date`, scraped at 09:00 UTC that day.
pub fn write_snapshot(dir: &Path, date: &str, records: &[Value]) {
    let day = d(date);
    let at = Utc.from_utc_datetime(&day.and_hms_opt(9, 0, 0).unwrap());
    write_raw_snapshot_at(&layout(dir), records, at, Some(day), None).unwrap();
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}
