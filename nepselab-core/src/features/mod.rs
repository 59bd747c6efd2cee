//! Feature Engine: derived scores over cleaned signals.
//!
//! [`FeatureEngine::engineer`] scores one signal in isolation (volatility
//! ratio against beta). [`FeatureEngine::engineer_batch`] scores a whole
//! day and replaces the volatility ratio with the sector-relative one.

pub mod config;
pub mod filters;
pub mod scores;
pub mod stats;

pub use config::{FeatureConfig, FeatureConfigError, FeatureWeights, RsiThresholds};
pub use filters::{bearish, bullish, overbought, oversold, BEARISH_COMPOSITE, BULLISH_COMPOSITE};
pub use stats::{daily_stats, DailyFeatureStats};

use crate::domain::{CleanedSignal, FeaturedSignal};

#[derive(Debug, Clone, Default)]
pub struct FeatureEngine {
    config: FeatureConfig,
}

impl FeatureEngine {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Score a single signal with no cross-record context.
    pub fn engineer(&self, signal: &CleanedSignal) -> FeaturedSignal {
        let w = &self.config.weights;
        let t = &self.config.thresholds;
        FeaturedSignal {
            momentum_score: scores::momentum_score(signal, w),
            volatility_ratio: scores::volatility_ratio(signal),
            is_overbought: signal.rsi_14 > t.overbought,
            is_oversold: signal.rsi_14 < t.oversold,
            trend_strength: scores::trend_strength(signal),
            ma_alignment_score: scores::ma_alignment(signal),
            signal_composite: scores::composite_score(signal, w),
            rsi_zone: scores::rsi_zone(signal.rsi_14, t),
            macd_zone: scores::macd_zone(signal.macd_signal),
            signal: signal.clone(),
        }
    }

    /// Score a batch, using each sector's mean daily volatility for the
    /// volatility ratio. Output order matches input order.
    pub fn engineer_batch(&self, signals: &[CleanedSignal]) -> Vec<FeaturedSignal> {
        let sector_avg = scores::sector_volatility(signals);
        signals
            .iter()
            .map(|signal| {
                let mut featured = self.engineer(signal);
                featured.volatility_ratio = scores::sector_volatility_ratio(
                    signal,
                    sector_avg.get(&signal.sector).copied(),
                );
                featured
            })
            .collect()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
