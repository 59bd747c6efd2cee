//! Scoring weights and classification thresholds.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureConfigError {
    #[error("feature weights must sum to 1.0, got {0:.6}")]
    WeightSum(f64),
    #[error("oversold threshold ({oversold}) must be below overbought ({overbought})")]
    ThresholdOrder { oversold: f64, overbought: f64 },
}

/// Per-indicator weights for the momentum score. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureWeights {
    pub rsi: f64,
    pub macd: f64,
    pub mfi: f64,
    pub stoch: f64,
    pub trend: f64,
}

impl FeatureWeights {
    /// Nominal weights; each contribution's point range is sized to these.
    pub const NOMINAL: Self = Self {
        rsi: 0.30,
        macd: 0.25,
        mfi: 0.20,
        stoch: 0.15,
        trend: 0.10,
    };

    pub fn sum(&self) -> f64 {
        self.rsi + self.macd + self.mfi + self.stoch + self.trend
    }
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self::NOMINAL
    }
}

/// RSI levels for the overbought/oversold flags and zones (strict comparisons).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiThresholds {
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for RsiThresholds {
    fn default() -> Self {
        Self {
            overbought: 70.0,
            oversold: 30.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub weights: FeatureWeights,
    pub thresholds: RsiThresholds,
}

impl FeatureConfig {
    /// Check weights sum to 1.0 and thresholds are ordered.
    pub fn validate(&self) -> Result<(), FeatureConfigError> {
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(FeatureConfigError::WeightSum(sum));
        }
        let RsiThresholds { overbought, oversold } = self.thresholds;
        if oversold >= overbought {
            return Err(FeatureConfigError::ThresholdOrder { oversold, overbought });
        }
        Ok(())
    }
}
