//! Per-date summary of a featured batch.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::filters::{BEARISH_COMPOSITE, BULLISH_COMPOSITE};
use crate::domain::FeaturedSignal;
use crate::numeric::round_to;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyFeatureStats {
    pub scrape_date: NaiveDate,
    pub total_records: usize,
    pub avg_momentum: f64,
    pub avg_volatility_ratio: f64,
    pub overbought_count: usize,
    pub oversold_count: usize,
    pub bullish_count: usize,
    pub bearish_count: usize,
}

/// Summarise the records of `date`; records for other dates are ignored.
/// Averages are 0 for an empty day.
pub fn daily_stats(date: NaiveDate, signals: &[FeaturedSignal]) -> DailyFeatureStats {
    let day: Vec<&FeaturedSignal> = signals
        .iter()
        .filter(|s| s.signal.scrape_date == date)
        .collect();
    let n = day.len();
    let mean = |f: fn(&FeaturedSignal) -> f64| {
        if n == 0 {
            0.0
        } else {
            round_to(day.iter().map(|s| f(s) / n as f64).sum::<f64>(), 2)
        }
    };

    DailyFeatureStats {
        scrape_date: date,
        total_records: n,
        avg_momentum: mean(|s| s.momentum_score),
        avg_volatility_ratio: mean(|s| s.volatility_ratio),
        overbought_count: day.iter().filter(|s| s.is_overbought).count(),
        oversold_count: day.iter().filter(|s| s.is_oversold).count(),
        bullish_count: day
            .iter()
            .filter(|s| s.signal_composite > BULLISH_COMPOSITE)
            .count(),
        bearish_count: day
            .iter()
            .filter(|s| s.signal_composite < BEARISH_COMPOSITE)
            .count(),
    }
}
