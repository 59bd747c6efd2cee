//! Score formulas. All functions are pure over a single cleaned signal.
//!
//! Clamp ranges, point awards and blend weights are fixed: dashboards rank
//! and classify on these exact values.

use std::collections::HashMap;

use super::config::{FeatureWeights, RsiThresholds};
use crate::domain::{CleanedSignal, MacdZone, RsiZone};
use crate::numeric::round_to;

pub const SCORE_MIN: f64 = -100.0;
pub const SCORE_MAX: f64 = 100.0;

/// Points per "price above SMA_n" flag (10, 20, 50, 200).
pub const SMA10_POINTS: f64 = 15.0;
pub const SMA20_POINTS: f64 = 20.0;
pub const SMA50_POINTS: f64 = 25.0;
pub const SMA200_POINTS: f64 = 40.0;
pub const SHORT_CROSS_POINTS: f64 = 10.0;
pub const GOLDEN_CROSS_POINTS: f64 = 30.0;
pub const DEATH_CROSS_PENALTY: f64 = 20.0;

/// Blend of the headline composite score.
pub const COMPOSITE_MOMENTUM: f64 = 0.30;
pub const COMPOSITE_TREND: f64 = 0.25;
pub const COMPOSITE_ALIGNMENT: f64 = 0.20;
pub const COMPOSITE_SENTIMENT: f64 = 0.15;
pub const COMPOSITE_VOLATILITY: f64 = 0.10;

/// Weighted oscillator momentum in `[-100, 100]`, 2 decimals.
///
/// Each indicator contributes up to ± its nominal share of 100 points,
/// scaled by `weight / nominal`.
pub fn momentum_score(s: &CleanedSignal, w: &FeatureWeights) -> f64 {
    let n = FeatureWeights::NOMINAL;
    let rsi = centered(s.rsi_14) * 30.0 * w.rsi / n.rsi;
    let macd = f64::from(s.macd_signal) * 25.0 * w.macd / n.macd;
    let mfi = centered(s.mfi_14) * 20.0 * w.mfi / n.mfi;
    let stoch = centered(s.sto_14) * 15.0 * w.stoch / n.stoch;
    let trend = f64::from(s.sma5_above_sma20) * 10.0 * w.trend / n.trend;

    round_to(
        (rsi + macd + mfi + stoch + trend).clamp(SCORE_MIN, SCORE_MAX),
        2,
    )
}

/// `(x - 50) / 50`: maps a `[0, 100]` oscillator onto `[-1, 1]`.
fn centered(value: f64) -> f64 {
    (value - 50.0) / 50.0
}

/// Moving-average trend strength in `[0, 100]`.
pub fn trend_strength(s: &CleanedSignal) -> f64 {
    let mut score = 0.0;
    if s.price_above_sma10 {
        score += SMA10_POINTS;
    }
    if s.price_above_sma20 {
        score += SMA20_POINTS;
    }
    if s.price_above_sma50 {
        score += SMA50_POINTS;
    }
    if s.price_above_sma200 {
        score += SMA200_POINTS;
    }
    if s.sma5_above_sma20 == 1 {
        score += SHORT_CROSS_POINTS;
    }
    match s.sma50_vs_sma200 {
        1 => score += GOLDEN_CROSS_POINTS,
        -1 => score -= DEATH_CROSS_PENALTY,
        _ => {}
    }
    round_to(score.clamp(0.0, 100.0), 2)
}

/// Count of "price above SMA" flags, negated under a bearish 50/200 cross.
pub fn ma_alignment(s: &CleanedSignal) -> i32 {
    let count = [
        s.price_above_sma10,
        s.price_above_sma20,
        s.price_above_sma50,
        s.price_above_sma200,
    ]
    .iter()
    .filter(|above| **above)
    .count() as i32;

    if s.sma50_vs_sma200 == -1 {
        -count
    } else {
        count
    }
}

/// Headline score blending momentum, trend, MA position, sentiment and an
/// inverse-volatility bonus; `[-100, 100]`, 2 decimals.
pub fn composite_score(s: &CleanedSignal, w: &FeatureWeights) -> f64 {
    let momentum = momentum_score(s, w) * COMPOSITE_MOMENTUM;
    let trend = trend_strength(s) * COMPOSITE_TREND;
    let alignment = f64::from(ma_alignment(s)) * 12.5 * COMPOSITE_ALIGNMENT;
    let sentiment = s.technical_summary * 15.0 * COMPOSITE_SENTIMENT;
    let volatility = (50.0 - s.daily_volatility_pct.abs()) / 50.0 * 10.0 * COMPOSITE_VOLATILITY;

    round_to(
        (momentum + trend + alignment + sentiment + volatility).clamp(SCORE_MIN, SCORE_MAX),
        2,
    )
}

/// Daily volatility relative to beta; a zero beta counts as 1.
pub fn volatility_ratio(s: &CleanedSignal) -> f64 {
    let beta = if s.beta_3m == 0.0 || s.beta_3m.is_nan() {
        1.0
    } else {
        s.beta_3m
    };
    ratio(s.daily_volatility_pct, beta)
}

/// Daily volatility relative to the sector average; a non-positive or
/// missing average yields exactly 1.
pub fn sector_volatility_ratio(s: &CleanedSignal, sector_avg: Option<f64>) -> f64 {
    match sector_avg {
        Some(avg) if avg > 0.0 => ratio(s.daily_volatility_pct, avg),
        _ => 1.0,
    }
}

/// `num / den` to 4 decimals. A quotient that overflows (tiny denominator)
/// counts as neutral, since the stores cannot hold an infinity.
fn ratio(num: f64, den: f64) -> f64 {
    let q = num / den;
    if q.is_finite() {
        round_to(q, 4)
    } else {
        1.0
    }
}

/// Mean daily volatility per sector, 4 decimals.
pub fn sector_volatility(signals: &[CleanedSignal]) -> HashMap<String, f64> {
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    for s in signals {
        let entry = sums.entry(s.sector.as_str()).or_insert((0.0, 0));
        entry.0 += s.daily_volatility_pct;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(sector, (sum, n))| (sector.to_string(), round_to(finite_or_max(sum) / n as f64, 4)))
        .collect()
}

/// Clamp an overflowed sum back into the finite range.
fn finite_or_max(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(f64::MIN, f64::MAX)
    }
}

pub fn rsi_zone(rsi: f64, t: &RsiThresholds) -> RsiZone {
    if rsi > t.overbought {
        RsiZone::Overbought
    } else if rsi < t.oversold {
        RsiZone::Oversold
    } else {
        RsiZone::Neutral
    }
}

pub fn macd_zone(code: i8) -> MacdZone {
    match code.signum() {
        1 => MacdZone::Bullish,
        -1 => MacdZone::Bearish,
        _ => MacdZone::Neutral,
    }
}
