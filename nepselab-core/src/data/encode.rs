//! Categorical encoding of cleaned signals.
//!
//! The normalizer never sees the raw labels. Instead the pipeline builds a
//! side table of [`RawCategoricals`] keyed by normalized symbol from the
//! raw records and passes it here, so both stages stay pure.

use std::collections::HashMap;

use serde_json::Value;

use super::mappings::{encode_risk, encode_sentiment, encode_sma, encode_trend, encode_volume};
use super::normalize::normalize_symbol;
use crate::domain::{CleanedSignal, RawSignal};

/// The categorical labels of one raw record. Missing labels are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCategoricals {
    pub technical_summary: Option<String>,
    pub technical_entry_risk: Option<String>,
    pub macd_vs_signal_line: Option<String>,
    pub sma5_above_20_sma: Option<String>,
    pub sma50_200: Option<String>,
    pub volume_trend: Option<String>,
    pub sma10: Option<String>,
    pub price_above_20_sma: Option<String>,
    pub price_above_50_sma: Option<String>,
    pub price_above_200_sma: Option<String>,
}

impl RawCategoricals {
    /// Extract labels from a loosely-typed record; non-string fields count as missing.
    pub fn from_value(record: &Value) -> Self {
        let label = |field: &str| {
            record
                .get(field)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Self {
            technical_summary: label("technicalSummary"),
            technical_entry_risk: label("technicalEntryRisk"),
            macd_vs_signal_line: label("macdVsSignalLine"),
            sma5_above_20_sma: label("sma5Above20SMA"),
            sma50_200: label("sma50_200"),
            volume_trend: label("volumeTrend"),
            sma10: label("sma10"),
            price_above_20_sma: label("priceAbove20SMA"),
            price_above_50_sma: label("priceAbove50SMA"),
            price_above_200_sma: label("priceAbove200SMA"),
        }
    }
}

impl From<&RawSignal> for RawCategoricals {
    fn from(raw: &RawSignal) -> Self {
        Self {
            technical_summary: Some(raw.technical_summary.clone()),
            technical_entry_risk: Some(raw.technical_entry_risk.clone()),
            macd_vs_signal_line: Some(raw.macd_vs_signal_line.clone()),
            sma5_above_20_sma: Some(raw.sma5_above_20_sma.clone()),
            sma50_200: Some(raw.sma50_200.clone()),
            volume_trend: Some(raw.volume_trend.clone()),
            sma10: Some(raw.sma10.clone()),
            price_above_20_sma: Some(raw.price_above_20_sma.clone()),
            price_above_50_sma: Some(raw.price_above_50_sma.clone()),
            price_above_200_sma: Some(raw.price_above_200_sma.clone()),
        }
    }
}

/// Symbol → raw labels side table.
pub type RawFieldMap = HashMap<String, RawCategoricals>;

/// Build the side table from raw records. Records without a string
/// `symbol` are ignored; for repeated symbols the last record wins.
pub fn build_raw_field_map<'a, I>(records: I) -> RawFieldMap
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut map = RawFieldMap::new();
    for record in records {
        if let Some(symbol) = record.get("symbol").and_then(Value::as_str) {
            map.insert(normalize_symbol(symbol), RawCategoricals::from_value(record));
        }
    }
    map
}

/// Resolve every categorical code of `signal` from its raw labels.
pub fn encode_signal(signal: &CleanedSignal, raw: &RawCategoricals) -> CleanedSignal {
    let label = |value: &Option<String>, fallback: &'static str| -> String {
        value.as_deref().unwrap_or(fallback).to_string()
    };

    CleanedSignal {
        technical_summary: encode_sentiment(&label(&raw.technical_summary, "Neutral")),
        technical_risk: encode_risk(&label(&raw.technical_entry_risk, "Medium Risk")),
        macd_signal: encode_trend(&label(&raw.macd_vs_signal_line, "Neutral")),
        sma5_above_sma20: encode_trend(&label(&raw.sma5_above_20_sma, "Neutral")),
        sma50_vs_sma200: encode_trend(&label(&raw.sma50_200, "Neutral")),
        volume_trend: encode_volume(&label(&raw.volume_trend, "Neutral")),
        price_above_sma10: encode_sma(&label(&raw.sma10, "")),
        price_above_sma20: encode_sma(&label(&raw.price_above_20_sma, "")),
        price_above_sma50: encode_sma(&label(&raw.price_above_50_sma, "")),
        price_above_sma200: encode_sma(&label(&raw.price_above_200_sma, "")),
        ..signal.clone()
    }
}

/// Encode a batch. Signals with no side-table entry pass through unchanged.
pub fn encode_signals(signals: &[CleanedSignal], raw_map: &RawFieldMap) -> Vec<CleanedSignal> {
    signals
        .iter()
        .map(|signal| match raw_map.get(&signal.symbol) {
            Some(raw) => encode_signal(signal, raw),
            None => signal.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    use crate::domain::Trend3M;

    fn cleaned(symbol: &str) -> CleanedSignal {
        CleanedSignal {
            symbol: symbol.into(),
            scrape_date: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
            scrape_timestamp: "2026-02-10T09:15:00.000Z".into(),
            sector: "Hydro Power".into(),
            ltp: 100.0,
            daily_gain_pct: 1.0,
            daily_volatility_pct: 2.0,
            price_relative_pct: 0.0,
            trend_3m: Trend3M::Trending,
            rsi_14: 50.0,
            macd_signal: 0,
            percent_b: 50.0,
            mfi_14: 50.0,
            sto_14: 50.0,
            cci_14: 0.0,
            stoch_rsi: 50.0,
            price_above_sma10: false,
            price_above_sma20: false,
            price_above_sma50: false,
            price_above_sma200: false,
            sma5_above_sma20: 0,
            sma50_vs_sma200: 0,
            volume_trend: 0,
            beta_3m: 1.0,
            technical_summary: 0.0,
            technical_risk: 1,
        }
    }

    fn labels() -> Value {
        json!({
            "symbol": " upper",
            "technicalSummary": "Strong Bearish",
            "technicalEntryRisk": "High Risk",
            "macdVsSignalLine": "Bearish",
            "sma5Above20SMA": "Bullish",
            "sma50_200": "Bearish",
            "volumeTrend": "Trending Down",
            "sma10": "Price Above Moving Average",
            "priceAbove20SMA": "Price Below Moving Average",
            "priceAbove50SMA": "Price Above Moving Average",
            "priceAbove200SMA": "garbage"
        })
    }

    #[test]
    fn resolves_all_codes() {
        let raw = RawCategoricals::from_value(&labels());
        let encoded = encode_signal(&cleaned("UPPER"), &raw);
        assert_eq!(encoded.technical_summary, -2.0);
        assert_eq!(encoded.technical_risk, 2);
        assert_eq!(encoded.macd_signal, -1);
        assert_eq!(encoded.sma5_above_sma20, 1);
        assert_eq!(encoded.sma50_vs_sma200, -1);
        assert_eq!(encoded.volume_trend, -1);
        assert!(encoded.price_above_sma10);
        assert!(!encoded.price_above_sma20);
        assert!(encoded.price_above_sma50);
        assert!(!encoded.price_above_sma200);
        assert_eq!(encoded.rsi_14, 50.0);
    }

    #[test]
    fn missing_labels_fall_back_to_neutral_defaults() {
        let encoded = encode_signal(&cleaned("UPPER"), &RawCategoricals::default());
        assert_eq!(encoded.technical_summary, 0.0);
        assert_eq!(encoded.technical_risk, 1);
        assert_eq!(encoded.macd_signal, 0);
        assert!(!encoded.price_above_sma200);
    }

    #[test]
    fn side_table_is_keyed_by_normalized_symbol() {
        let records = vec![labels()];
        let map = build_raw_field_map(&records);
        assert!(map.contains_key("UPPER"));

        let out = encode_signals(&[cleaned("UPPER"), cleaned("NABIL")], &map);
        assert_eq!(out[0].macd_signal, -1);
        assert_eq!(out[1], cleaned("NABIL"));
    }

    #[test]
    fn last_record_for_a_symbol_wins() {
        let mut second = labels();
        second["macdVsSignalLine"] = json!("Bullish");
        let records = vec![labels(), second];
        let map = build_raw_field_map(&records);
        assert_eq!(map["UPPER"].macd_vs_signal_line.as_deref(), Some("Bullish"));
    }
}
