//! Domain types for the signal pipeline.
//!
//! Data flows raw → cleaned → featured; every stage past raw is keyed by
//! [`SignalKey`].

pub mod cleaned;
pub mod featured;
pub mod key;
pub mod raw;

pub use cleaned::{CleanedSignal, RiskValue, SentimentValue, Trend3M, TrendValue};
pub use featured::{FeaturedSignal, MacdZone, RsiZone};
pub use key::SignalKey;
pub use raw::{RawFile, RawMetadata, RawSignal};

