//! Fixed label ↔ code tables for categorical scraper fields.
//!
//! Lookups never fail: an unknown label maps to the table's documented
//! default.

use crate::domain::{RiskValue, SentimentValue, TrendValue};

pub const SENTIMENT_ENCODING: &[(&str, SentimentValue)] = &[
    ("Strong Bullish", 2.0),
    ("Medium Bullish", 1.0),
    ("Weak Bullish", 0.5),
    ("Neutral", 0.0),
    ("Weak Bearish", -0.5),
    ("Bearish", -1.0),
    ("Strong Bearish", -2.0),
];

pub const TREND_ENCODING: &[(&str, TrendValue)] = &[
    ("Bullish", 1),
    ("Neutral", 0),
    ("Bearish", -1),
];

pub const VOLUME_ENCODING: &[(&str, TrendValue)] = &[
    ("Trending Up", 1),
    ("Neutral", 0),
    ("Trending Down", -1),
];

pub const RISK_ENCODING: &[(&str, RiskValue)] = &[
    ("Low Risk", 0),
    ("Medium Risk", 1),
    ("High Risk", 2),
];

pub const SMA_ENCODING: &[(&str, bool)] = &[
    ("Price Above Moving Average", true),
    ("Price Below Moving Average", false),
];

pub const DEFAULT_SENTIMENT: SentimentValue = 0.0;
pub const DEFAULT_TREND: TrendValue = 0;
pub const DEFAULT_RISK: RiskValue = 1;

fn lookup<T: Copy>(table: &[(&str, T)], label: &str) -> Option<T> {
    table.iter().find(|(l, _)| *l == label).map(|(_, v)| *v)
}

fn reverse<T: PartialEq>(table: &[(&'static str, T)], value: &T) -> Option<&'static str> {
    table.iter().find(|(_, v)| v == value).map(|(l, _)| *l)
}

pub fn encode_sentiment(label: &str) -> SentimentValue {
    lookup(SENTIMENT_ENCODING, label).unwrap_or(DEFAULT_SENTIMENT)
}

pub fn encode_trend(label: &str) -> TrendValue {
    lookup(TREND_ENCODING, label).unwrap_or(DEFAULT_TREND)
}

pub fn encode_volume(label: &str) -> TrendValue {
    lookup(VOLUME_ENCODING, label).unwrap_or(DEFAULT_TREND)
}

pub fn encode_risk(label: &str) -> RiskValue {
    lookup(RISK_ENCODING, label).unwrap_or(DEFAULT_RISK)
}

pub fn encode_sma(label: &str) -> bool {
    lookup(SMA_ENCODING, label).unwrap_or(false)
}

/// Display-only inverse of [`encode_sentiment`]; unknown codes read "Neutral".
pub fn decode_sentiment(value: SentimentValue) -> &'static str {
    reverse(SENTIMENT_ENCODING, &value).unwrap_or("Neutral")
}

pub fn decode_trend(value: TrendValue) -> &'static str {
    reverse(TREND_ENCODING, &value).unwrap_or("Neutral")
}

pub fn decode_volume(value: TrendValue) -> &'static str {
    reverse(VOLUME_ENCODING, &value).unwrap_or("Neutral")
}

pub fn decode_risk(value: RiskValue) -> &'static str {
    reverse(RISK_ENCODING, &value).unwrap_or("Medium Risk")
}
