//! Selections over a featured batch.

use crate::domain::FeaturedSignal;

/// Composite score strictly above this is bullish.
pub const BULLISH_COMPOSITE: f64 = 50.0;
/// Composite score strictly below this is bearish.
pub const BEARISH_COMPOSITE: f64 = -50.0;

pub fn overbought(signals: &[FeaturedSignal]) -> Vec<&FeaturedSignal> {
    signals.iter().filter(|s| s.is_overbought).collect()
}

pub fn oversold(signals: &[FeaturedSignal]) -> Vec<&FeaturedSignal> {
    signals.iter().filter(|s| s.is_oversold).collect()
}

pub fn bullish(signals: &[FeaturedSignal]) -> Vec<&FeaturedSignal> {
    signals
        .iter()
        .filter(|s| s.signal_composite > BULLISH_COMPOSITE)
        .collect()
}

pub fn bearish(signals: &[FeaturedSignal]) -> Vec<&FeaturedSignal> {
    signals
        .iter()
        .filter(|s| s.signal_composite < BEARISH_COMPOSITE)
        .collect()
}
