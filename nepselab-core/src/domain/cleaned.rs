//! Cleaned signals: canonical numeric values and encoded categoricals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::key::SignalKey;

/// Sentiment code ∈ {-2, -1, -0.5, 0, 0.5, 1, 2}.
pub type SentimentValue = f64;
/// Direction code ∈ {-1, 0, 1}.
pub type TrendValue = i8;
/// Risk code ∈ {0, 1, 2}.
pub type RiskValue = u8;

/// Three-month trend regime reported by the scraper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trend3M {
    #[serde(rename = "TRENDING")]
    Trending,
    #[serde(rename = "MEAN REVERTING")]
    MeanReverting,
}

impl Trend3M {
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "TRENDING" => Some(Self::Trending),
            "MEAN REVERTING" => Some(Self::MeanReverting),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trending => "TRENDING",
            Self::MeanReverting => "MEAN REVERTING",
        }
    }
}

/// A validated, normalized and encoded signal keyed by `(symbol, scrape_date)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedSignal {
    pub symbol: String,
    pub scrape_date: NaiveDate,
    pub scrape_timestamp: String,
    pub sector: String,

    pub ltp: f64,
    pub daily_gain_pct: f64,
    pub daily_volatility_pct: f64,
    pub price_relative_pct: f64,

    pub trend_3m: Trend3M,

    pub rsi_14: f64,
    pub macd_signal: TrendValue,
    pub percent_b: f64,
    pub mfi_14: f64,
    pub sto_14: f64,
    pub cci_14: f64,
    pub stoch_rsi: f64,

    pub price_above_sma10: bool,
    pub price_above_sma20: bool,
    pub price_above_sma50: bool,
    pub price_above_sma200: bool,
    pub sma5_above_sma20: TrendValue,
    pub sma50_vs_sma200: TrendValue,

    pub volume_trend: TrendValue,
    pub beta_3m: f64,

    pub technical_summary: SentimentValue,
    pub technical_risk: RiskValue,
}

impl CleanedSignal {
    pub fn key(&self) -> SignalKey {
        SignalKey::new(&self.symbol, self.scrape_date)
    }
}
