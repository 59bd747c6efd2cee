//! End-to-end record stages: raw JSON → validated → cleaned → encoded → featured.

use serde_json::{json, Value};

use nepselab_core::data::{
    build_raw_field_map, encode_signals, normalize, normalize_all, validate_raw_signals,
};
use nepselab_core::domain::{MacdZone, RawSignal, RsiZone};
use nepselab_core::features::{daily_stats, FeatureEngine};

// ── Fixtures ─────────────────────────────────────────────────────────

fn record(symbol: &str, rsi: f64) -> Value {
    json!({
        "symbol": symbol,
        "technicalSummary": "Medium Bullish",
        "technicalEntryRisk": "High Risk",
        "sector": "Commercial Banks",
        "dailyGain": "1.257%",
        "ltp": 512.346,
        "dailyVolatility": "2.10%",
        "priceRelative": "-0.40%",
        "trend3M": "TRENDING",
        "rsi14": rsi,
        "macdVsSignalLine": "Bullish",
        "percentB": "78.5%",
        "mfi14": 55.0,
        "sto14": 70.1,
        "cci14": -120.4,
        "stochRSI": 88.0,
        "sma10": "Price Above Moving Average",
        "priceAbove20SMA": "Price Above Moving Average",
        "priceAbove50SMA": "Price Below Moving Average",
        "priceAbove200SMA": "Price Above Moving Average",
        "sma5Above20SMA": "Bullish",
        "sma50_200": "Bearish",
        "volumeTrend": "Trending Down",
        "beta3Month": 1.1,
        "scrapedAt": "2026-02-10T09:15:00.000Z",
        "scrapeDate": "2026-02-10"
    })
}

// ── Scenarios ────────────────────────────────────────────────────────

#[test]
fn three_symbol_day_flows_through_every_stage() {
    // GIVEN: three records, one overbought, one oversold, one neutral, plus junk
    let input = json!([
        record("nabil", 75.0),
        record(" nica ", 25.0),
        record("hbl", 50.0),
        { "symbol": "BAD", "rsi14": 101 }
    ]);

    // WHEN: validate, normalize, encode, engineer
    let report = validate_raw_signals(&input).unwrap();
    assert_eq!(report.valid.len(), 3);
    assert_eq!(report.invalid.len(), 1);
    assert!(report.invalid[0]
        .errors
        .iter()
        .any(|e| e.starts_with("rsi14:")));

    let side_table = build_raw_field_map(input.as_array().unwrap().iter());
    let cleaned = encode_signals(&normalize_all(&report.valid).unwrap(), &side_table);
    let featured = FeatureEngine::default().engineer_batch(&cleaned);

    // THEN: symbols canonical, categoricals resolved, zones classified
    let symbols: Vec<&str> = featured.iter().map(|f| f.symbol()).collect();
    assert_eq!(symbols, ["NABIL", "NICA", "HBL"]);

    let nabil = &featured[0];
    assert_eq!(nabil.signal.ltp, 512.35);
    assert_eq!(nabil.signal.daily_gain_pct, 1.26);
    assert_eq!(nabil.signal.macd_signal, 1);
    assert_eq!(nabil.signal.sma50_vs_sma200, -1);
    assert_eq!(nabil.signal.volume_trend, -1);
    assert_eq!(nabil.signal.technical_summary, 1.0);
    assert_eq!(nabil.signal.technical_risk, 2);
    assert!(nabil.signal.price_above_sma10);
    assert!(!nabil.signal.price_above_sma50);
    // three flags, negated under the bearish 50/200 cross
    assert_eq!(nabil.ma_alignment_score, -3);
    assert!(nabil.is_overbought);
    assert_eq!(nabil.rsi_zone, RsiZone::Overbought);
    assert_eq!(nabil.macd_zone, MacdZone::Bullish);

    assert!(featured[1].is_oversold);
    assert_eq!(featured[1].rsi_zone, RsiZone::Oversold);
    assert_eq!(featured[2].rsi_zone, RsiZone::Neutral);

    // same sector, same volatility
    assert!(featured.iter().all(|f| f.volatility_ratio == 1.0));

    let stats = daily_stats(nabil.signal.scrape_date, &featured);
    assert_eq!(stats.total_records, 3);
    assert_eq!(stats.overbought_count, 1);
    assert_eq!(stats.oversold_count, 1);
}

#[test]
fn rsi_boundary_is_inclusive_at_100() {
    let input = json!([record("A", 100.0), record("B", 101.0)]);
    let report = validate_raw_signals(&input).unwrap();
    assert_eq!(report.valid.len(), 1);
    assert_eq!(report.valid[0].symbol, "A");
}

#[test]
fn unparseable_percentage_normalizes_to_zero() {
    // GIVEN: a record that bypasses validation with a junk percentage
    let mut value = record("NABIL", 50.0);
    value["dailyGain"] = json!("abc%");
    let raw: RawSignal = serde_json::from_value(value).unwrap();

    // WHEN / THEN
    let cleaned = normalize(&raw).unwrap();
    assert_eq!(cleaned.daily_gain_pct, 0.0);
}

#[test]
fn featured_signal_serializes_flat() {
    let input = json!([record("NABIL", 60.0)]);
    let report = validate_raw_signals(&input).unwrap();
    let side_table = build_raw_field_map(input.as_array().unwrap().iter());
    let cleaned = encode_signals(&normalize_all(&report.valid).unwrap(), &side_table);
    let featured = FeatureEngine::default().engineer_batch(&cleaned);

    let line = serde_json::to_value(&featured[0]).unwrap();
    assert_eq!(line["symbol"], "NABIL");
    assert_eq!(line["scrape_date"], "2026-02-10");
    assert_eq!(line["rsi_zone"], "neutral");
    assert!(line.get("signal").is_none());
}
