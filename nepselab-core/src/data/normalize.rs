//! Numeric normalization of raw signals.
//!
//! Parses percentage strings, rounds to fixed decimals and resolves the
//! scrape date. Categorical fields are left at their neutral defaults; the
//! encoder fills them from the raw labels.

use chrono::NaiveDate;
use thiserror::Error;

use super::mappings::DEFAULT_RISK;
use crate::domain::{CleanedSignal, RawSignal, Trend3M};
use crate::numeric::{parse_percentage, round_to};

/// Decimal places kept for prices, percentages and indicator readings.
pub const VALUE_DECIMALS: u32 = 2;

#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("symbol '{symbol}': cannot derive scrape date from '{value}'")]
    InvalidScrapeDate { symbol: String, value: String },
}

/// Canonicalize a symbol: trimmed and uppercased.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Normalize one raw signal into a cleaned signal with categorical defaults.
pub fn normalize(raw: &RawSignal) -> Result<CleanedSignal, NormalizeError> {
    let date_str = raw.scrape_date_str();
    let scrape_date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|_| {
        NormalizeError::InvalidScrapeDate {
            symbol: raw.symbol.clone(),
            value: date_str.to_string(),
        }
    })?;

    Ok(CleanedSignal {
        symbol: normalize_symbol(&raw.symbol),
        scrape_date,
        scrape_timestamp: raw.scraped_at.clone(),
        sector: raw.sector.trim().to_string(),

        ltp: round_to(raw.ltp, VALUE_DECIMALS),
        daily_gain_pct: pct(&raw.daily_gain),
        daily_volatility_pct: pct(&raw.daily_volatility),
        price_relative_pct: pct(&raw.price_relative),

        trend_3m: Trend3M::parse(raw.trend_3m.trim()).unwrap_or(Trend3M::MeanReverting),

        rsi_14: round_to(raw.rsi14, VALUE_DECIMALS),
        macd_signal: 0,
        percent_b: pct(&raw.percent_b),
        mfi_14: round_to(raw.mfi14, VALUE_DECIMALS),
        sto_14: round_to(raw.sto14, VALUE_DECIMALS),
        cci_14: round_to(raw.cci14, VALUE_DECIMALS),
        stoch_rsi: round_to(raw.stoch_rsi, VALUE_DECIMALS),

        price_above_sma10: false,
        price_above_sma20: false,
        price_above_sma50: false,
        price_above_sma200: false,
        sma5_above_sma20: 0,
        sma50_vs_sma200: 0,

        volume_trend: 0,
        beta_3m: round_to(raw.beta_3_month, VALUE_DECIMALS),

        technical_summary: 0.0,
        technical_risk: DEFAULT_RISK,
    })
}

/// Normalize a batch, failing on the first record without a usable date.
pub fn normalize_all(raws: &[RawSignal]) -> Result<Vec<CleanedSignal>, NormalizeError> {
    raws.iter().map(normalize).collect()
}

fn pct(value: &str) -> f64 {
    round_to(parse_percentage(value), VALUE_DECIMALS)
}
