//! Property tests for normalizer tolerance and feature ranges.
//!
//! Uses proptest to verify:
//! 1. Percentage parsing never panics and always yields a finite value
//! 2. Well-formed percentage strings parse to their numeric value
//! 3. Batch scores stay within their documented ranges

use chrono::NaiveDate;
use proptest::prelude::*;

use nepselab_core::domain::{CleanedSignal, Trend3M};
use nepselab_core::features::FeatureEngine;
use nepselab_core::numeric::parse_percentage;

// ── 1. Tolerant parsing ──────────────────────────────────────────────

proptest! {
    #[test]
    fn parse_percentage_is_total(s in ".*") {
        let v = parse_percentage(&s);
        prop_assert!(v.is_finite());
    }

    #[test]
    fn parse_percentage_reads_formatted_values(x in -1000.0f64..1000.0) {
        let s = format!("{x:.2}%");
        let expected: f64 = format!("{x:.2}").parse().unwrap();
        prop_assert_eq!(parse_percentage(&s), expected);
    }
}

// ── 2. Feature ranges over batches ───────────────────────────────────

fn arb_cleaned() -> impl Strategy<Value = CleanedSignal> {
    (
        0.0f64..=100.0,
        0.0f64..=100.0,
        0.0f64..=100.0,
        -1i8..=1,
        -1i8..=1,
        any::<(bool, bool, bool, bool)>(),
        -20.0f64..20.0,
        prop::sample::select(vec!["Banking", "Hydropower", "Insurance"]),
    )
        .prop_map(|(rsi, mfi, sto, macd, cross, (a, b, c, d), vol, sector)| CleanedSignal {
            symbol: "PROP".to_string(),
            scrape_date: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
            scrape_timestamp: "2026-02-10T09:00:00Z".to_string(),
            sector: sector.to_string(),
            ltp: 100.0,
            daily_gain_pct: 0.0,
            daily_volatility_pct: vol,
            price_relative_pct: 0.0,
            trend_3m: Trend3M::MeanReverting,
            rsi_14: rsi,
            macd_signal: macd,
            percent_b: 50.0,
            mfi_14: mfi,
            sto_14: sto,
            cci_14: 0.0,
            stoch_rsi: 50.0,
            price_above_sma10: a,
            price_above_sma20: b,
            price_above_sma50: c,
            price_above_sma200: d,
            sma5_above_sma20: macd,
            sma50_vs_sma200: cross,
            volume_trend: 0,
            beta_3m: 1.0,
            technical_summary: -2.0,
            technical_risk: 1,
        })
}

proptest! {
    #[test]
    fn batch_scores_stay_in_range(batch in prop::collection::vec(arb_cleaned(), 1..40)) {
        let featured = FeatureEngine::default().engineer_batch(&batch);
        prop_assert_eq!(featured.len(), batch.len());
        for f in &featured {
            prop_assert!((-100.0..=100.0).contains(&f.momentum_score));
            prop_assert!((-100.0..=100.0).contains(&f.signal_composite));
            prop_assert!((0.0..=100.0).contains(&f.trend_strength));
            prop_assert!(f.volatility_ratio.is_finite());
        }
    }
}
