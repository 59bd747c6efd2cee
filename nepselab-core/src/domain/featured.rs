//! Featured signals: cleaned signals plus derived scores.

use serde::{Deserialize, Serialize};

use super::cleaned::CleanedSignal;
use super::key::SignalKey;

/// RSI classification against the overbought/oversold thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsiZone {
    Oversold,
    Neutral,
    Overbought,
}

/// MACD classification by sign of the encoded MACD-vs-signal code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacdZone {
    Bearish,
    Neutral,
    Bullish,
}

/// A cleaned signal with its derived scores.
///
/// Serialized flat: the cleaned fields and the derived fields share one
/// JSON object, as in the featured and historical stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturedSignal {
    #[serde(flatten)]
    pub signal: CleanedSignal,
    pub momentum_score: f64,
    pub volatility_ratio: f64,
    pub is_overbought: bool,
    pub is_oversold: bool,
    pub trend_strength: f64,
    pub ma_alignment_score: i32,
    pub signal_composite: f64,
    pub rsi_zone: RsiZone,
    pub macd_zone: MacdZone,
}

impl FeaturedSignal {
    pub fn key(&self) -> SignalKey {
        self.signal.key()
    }

    pub fn symbol(&self) -> &str {
        &self.signal.symbol
    }

    pub fn sector(&self) -> &str {
        &self.signal.sector
    }
}
