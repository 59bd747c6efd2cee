//! Schema validation for raw scraper records.
//!
//! Records arrive as loosely-typed JSON. Each one is checked field by field
//! and either promoted to a [`RawSignal`] or rejected with every problem
//! found, reported as `field: message`. A bad record never aborts the batch.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::{RawMetadata, RawSignal};

pub const TREND_3M_LABELS: &[&str] = &["TRENDING", "MEAN REVERTING"];
pub const DIRECTION_LABELS: &[&str] = &["Bullish", "Bearish", "Neutral"];
pub const VOLUME_LABELS: &[&str] = &["Trending Up", "Trending Down", "Neutral"];

/// Maximum symbol length accepted from the scraper.
pub const MAX_SYMBOL_LEN: usize = 20;

/// A record that failed validation, kept verbatim for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidRecord {
    pub record: Value,
    pub errors: Vec<String>,
}

/// Partition of an input batch into valid signals and rejected records.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub valid: Vec<RawSignal>,
    pub invalid: Vec<InvalidRecord>,
}

impl ValidationReport {
    pub fn total(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }

    pub fn has_valid(&self) -> bool {
        !self.valid.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Expected array of signals, received {0}")]
    NotASequence(&'static str),

    #[error("Validation failed for {count} records:\n{details}")]
    InvalidRecords { count: usize, details: String },
}

/// Validate a JSON value that must be an array of candidate records.
///
/// Fails only when `data` is not an array.
pub fn validate_raw_signals(data: &Value) -> Result<ValidationReport, ValidationError> {
    match data {
        Value::Array(records) => Ok(validate_records(records)),
        other => Err(ValidationError::NotASequence(type_name(other))),
    }
}

/// Validate an in-memory batch of candidate records.
pub fn validate_records(records: &[Value]) -> ValidationReport {
    let mut report = ValidationReport::default();
    for record in records {
        match validate_signal(record) {
            Ok(signal) => report.valid.push(signal),
            Err(errors) => report.invalid.push(InvalidRecord {
                record: record.clone(),
                errors,
            }),
        }
    }
    report
}

/// Validate and fail if any record is invalid, listing up to five of them.
pub fn validate_or_fail(data: &Value) -> Result<Vec<RawSignal>, ValidationError> {
    let report = validate_raw_signals(data)?;
    if report.invalid.is_empty() {
        return Ok(report.valid);
    }

    let details = report
        .invalid
        .iter()
        .take(5)
        .enumerate()
        .map(|(i, inv)| format!("Record {}: {}", i + 1, inv.errors.join(", ")))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ValidationError::InvalidRecords {
        count: report.invalid.len(),
        details,
    })
}

pub fn is_signal_valid(record: &Value) -> bool {
    validate_signal(record).is_ok()
}

/// Validate a single candidate record.
pub fn validate_signal(record: &Value) -> Result<RawSignal, Vec<String>> {
    let Some(obj) = record.as_object() else {
        return Err(vec![format!(
            "(root): Expected object, received {}",
            type_name(record)
        )]);
    };

    let mut c = FieldChecker::new(obj);

    c.string("symbol", 1, Some(MAX_SYMBOL_LEN));
    c.string("technicalSummary", 0, None);
    c.string("technicalEntryRisk", 0, None);
    c.string("sector", 1, None);
    c.percentage("dailyGain");
    c.number("ltp", Bound::Positive);
    c.percentage("dailyVolatility");
    c.percentage("priceRelative");
    c.one_of("trend3M", TREND_3M_LABELS);
    c.number("rsi14", Bound::Percent);
    c.one_of("macdVsSignalLine", DIRECTION_LABELS);
    c.percentage("percentB");
    c.number("mfi14", Bound::Percent);
    c.number("sto14", Bound::Percent);
    c.number("cci14", Bound::Any);
    c.number("stochRSI", Bound::Percent);
    c.string("sma10", 0, None);
    c.string("priceAbove20SMA", 0, None);
    c.string("priceAbove50SMA", 0, None);
    c.string("priceAbove200SMA", 0, None);
    c.one_of("sma5Above20SMA", DIRECTION_LABELS);
    c.one_of("sma50_200", DIRECTION_LABELS);
    c.one_of("volumeTrend", VOLUME_LABELS);
    c.number("beta3Month", Bound::Positive);
    c.string("scrapedAt", 1, None);
    c.scrape_date();

    if !c.errors.is_empty() {
        return Err(c.errors);
    }

    serde_json::from_value::<RawSignal>(record.clone())
        .map_err(|e| vec![format!("(root): {e}")])
}

/// Validate a raw file header.
pub fn validate_metadata(value: &Value) -> Result<RawMetadata, Vec<String>> {
    let Some(obj) = value.as_object() else {
        return Err(vec![format!(
            "metadata: Expected object, received {}",
            type_name(value)
        )]);
    };

    let mut c = FieldChecker::with_prefix(obj, "metadata");
    c.count("totalRecords");
    c.string("scrapedAt", 1, None);
    c.iso_date("scrapeDate", true);
    c.string("source", 0, None);
    c.string("version", 0, None);

    if !c.errors.is_empty() {
        return Err(c.errors);
    }

    serde_json::from_value::<RawMetadata>(value.clone())
        .map_err(|e| vec![format!("metadata: {e}")])
}

/// True for `YYYY-MM-DD` strings naming a real calendar date.
pub fn is_iso_date(s: &str) -> bool {
    s.len() == 10 && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Matches `-?\d+\.?\d*\s*%` exactly.
pub fn is_percentage(s: &str) -> bool {
    let body = match s.strip_suffix('%') {
        Some(body) => body.trim_end(),
        None => return false,
    };
    let body = body.strip_prefix('-').unwrap_or(body);
    let (int_part, frac_part) = match body.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (body, None),
    };
    !int_part.is_empty()
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && frac_part.map_or(true, |f| f.bytes().all(|b| b.is_ascii_digit()))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, Copy)]
enum Bound {
    /// Any finite number.
    Any,
    /// Strictly greater than zero.
    Positive,
    /// Inclusive `[0, 100]`.
    Percent,
}

/// Accumulates `path: message` errors for one JSON object.
struct FieldChecker<'a> {
    obj: &'a Map<String, Value>,
    prefix: Option<&'static str>,
    errors: Vec<String>,
}

impl<'a> FieldChecker<'a> {
    fn new(obj: &'a Map<String, Value>) -> Self {
        Self {
            obj,
            prefix: None,
            errors: Vec::new(),
        }
    }

    fn with_prefix(obj: &'a Map<String, Value>, prefix: &'static str) -> Self {
        Self {
            obj,
            prefix: Some(prefix),
            errors: Vec::new(),
        }
    }

    fn fail(&mut self, field: &str, message: impl AsRef<str>) {
        let path = match self.prefix {
            Some(prefix) => format!("{prefix}.{field}"),
            None => field.to_string(),
        };
        self.errors.push(format!("{path}: {}", message.as_ref()));
    }

    fn required(&mut self, field: &str) -> Option<&'a Value> {
        let obj = self.obj;
        let value = obj.get(field);
        if value.is_none() {
            self.fail(field, "Required");
        }
        value
    }

    fn str_value(&mut self, field: &str) -> Option<&'a str> {
        let value = self.required(field)?;
        match value.as_str() {
            Some(s) => Some(s),
            None => {
                self.fail(
                    field,
                    format!("Expected string, received {}", type_name(value)),
                );
                None
            }
        }
    }

    fn string(&mut self, field: &str, min_len: usize, max_len: Option<usize>) {
        let Some(s) = self.str_value(field) else { return };
        let len = s.chars().count();
        if len < min_len {
            self.fail(
                field,
                format!("String must contain at least {min_len} character(s)"),
            );
        }
        if let Some(max) = max_len {
            if len > max {
                self.fail(
                    field,
                    format!("String must contain at most {max} character(s)"),
                );
            }
        }
    }

    fn percentage(&mut self, field: &str) {
        let Some(s) = self.str_value(field) else { return };
        if !is_percentage(s) {
            self.fail(field, "Invalid percentage format");
        }
    }

    fn one_of(&mut self, field: &str, allowed: &[&str]) {
        let Some(s) = self.str_value(field) else { return };
        if !allowed.contains(&s) {
            let expected = allowed
                .iter()
                .map(|a| format!("'{a}'"))
                .collect::<Vec<_>>()
                .join(" | ");
            self.fail(
                field,
                format!("Invalid enum value. Expected {expected}, received '{s}'"),
            );
        }
    }

    fn number(&mut self, field: &str, bound: Bound) {
        let Some(value) = self.required(field) else { return };
        let Some(n) = value.as_f64() else {
            self.fail(
                field,
                format!("Expected number, received {}", type_name(value)),
            );
            return;
        };
        match bound {
            Bound::Any => {}
            Bound::Positive => {
                if n <= 0.0 {
                    self.fail(field, "Number must be greater than 0");
                }
            }
            Bound::Percent => {
                if n < 0.0 {
                    self.fail(field, "Number must be greater than or equal to 0");
                } else if n > 100.0 {
                    self.fail(field, "Number must be less than or equal to 100");
                }
            }
        }
    }

    fn count(&mut self, field: &str) {
        let Some(value) = self.required(field) else { return };
        if value.as_u64().is_none() {
            self.fail(field, "Expected non-negative integer");
        }
    }

    fn iso_date(&mut self, field: &str, required: bool) {
        let obj = self.obj;
        let value = match obj.get(field) {
            None | Some(Value::Null) if !required => return,
            _ => self.str_value(field),
        };
        if let Some(s) = value {
            if !is_iso_date(s) {
                self.fail(field, "Invalid date, expected YYYY-MM-DD");
            }
        }
    }

    /// `scrapeDate` is optional, but some date must be derivable: either
    /// `scrapeDate` itself or the leading `YYYY-MM-DD` of `scrapedAt`.
    fn scrape_date(&mut self) {
        let obj = self.obj;
        let explicit = obj.get("scrapeDate");
        let has_explicit = matches!(explicit, Some(Value::String(s)) if !s.trim().is_empty());
        if has_explicit {
            self.iso_date("scrapeDate", true);
            return;
        }
        if let Some(other) = explicit.filter(|v| !v.is_null() && !v.is_string()) {
            self.fail(
                "scrapeDate",
                format!("Expected string, received {}", type_name(other)),
            );
            return;
        }
        if let Some(Value::String(at)) = obj.get("scrapedAt") {
            if !at.is_empty() && !at.get(..10).is_some_and(is_iso_date) {
                self.fail("scrapedAt", "Expected timestamp starting with YYYY-MM-DD");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_record() -> Value {
        json!({
            "symbol": "NABIL",
            "technicalSummary": "Medium Bullish",
            "technicalEntryRisk": "Medium Risk",
            "sector": "Commercial Banks",
            "dailyGain": "1.25%",
            "ltp": 512.3,
            "dailyVolatility": "2.10%",
            "priceRelative": "-0.40%",
            "trend3M": "TRENDING",
            "rsi14": 61.2,
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
            "sma50_200": "Neutral",
            "volumeTrend": "Trending Up",
            "beta3Month": 1.1,
            "scrapedAt": "2026-02-10T09:15:00.000Z"
        })
    }

    fn with(field: &str, value: Value) -> Value {
        let mut record = valid_record();
        record[field] = value;
        record
    }

    #[test]
    fn accepts_well_formed_record() {
        let signal = validate_signal(&valid_record()).unwrap();
        assert_eq!(signal.symbol, "NABIL");
    }

    #[test]
    fn rsi_upper_bound_is_inclusive() {
        assert!(validate_signal(&with("rsi14", json!(100))).is_ok());
        let errors = validate_signal(&with("rsi14", json!(101))).unwrap_err();
        assert_eq!(
            errors,
            vec!["rsi14: Number must be less than or equal to 100".to_string()]
        );
    }

    #[test]
    fn rejects_negative_oscillator() {
        let errors = validate_signal(&with("mfi14", json!(-0.5))).unwrap_err();
        assert!(errors[0].starts_with("mfi14:"));
    }

    #[test]
    fn cci_is_unbounded() {
        assert!(validate_signal(&with("cci14", json!(-350.0))).is_ok());
        assert!(validate_signal(&with("cci14", json!(420.0))).is_ok());
    }

    #[test]
    fn rejects_non_positive_ltp_and_beta() {
        assert!(validate_signal(&with("ltp", json!(0))).is_err());
        assert!(validate_signal(&with("beta3Month", json!(-1.0))).is_err());
    }

    #[test]
    fn rejects_bad_percentage_strings() {
        let errors = validate_signal(&with("dailyGain", json!("abc%"))).unwrap_err();
        assert_eq!(errors, vec!["dailyGain: Invalid percentage format".to_string()]);
        assert!(validate_signal(&with("dailyGain", json!("1.5"))).is_err());
        assert!(validate_signal(&with("dailyGain", json!("-1.5 %"))).is_ok());
    }

    #[test]
    fn rejects_unknown_enum_labels() {
        let errors = validate_signal(&with("volumeTrend", json!("Sideways"))).unwrap_err();
        assert!(errors[0].contains("Invalid enum value"));
        assert!(errors[0].contains("'Sideways'"));
    }

    #[test]
    fn reports_every_failing_field() {
        let mut record = valid_record();
        record["rsi14"] = json!("high");
        record.as_object_mut().unwrap().remove("sector");
        let errors = validate_signal(&record).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(&"sector: Required".to_string()));
        assert!(errors.contains(&"rsi14: Expected number, received string".to_string()));
    }

    #[test]
    fn symbol_length_is_bounded() {
        assert!(validate_signal(&with("symbol", json!(""))).is_err());
        assert!(validate_signal(&with("symbol", json!("A".repeat(21)))).is_err());
        assert!(validate_signal(&with("symbol", json!("A".repeat(20)))).is_ok());
    }

    #[test]
    fn scrape_date_must_be_derivable() {
        assert!(validate_signal(&with("scrapeDate", json!("2026-02-09"))).is_ok());
        assert!(validate_signal(&with("scrapeDate", json!("09/02/2026"))).is_err());
        assert!(validate_signal(&with("scrapedAt", json!("yesterday"))).is_err());

        let mut record = with("scrapedAt", json!("yesterday"));
        record["scrapeDate"] = json!("2026-02-09");
        assert!(validate_signal(&record).is_ok());
    }

    #[test]
    fn non_object_record_is_rejected() {
        let errors = validate_signal(&json!(42)).unwrap_err();
        assert_eq!(errors, vec!["(root): Expected object, received number".to_string()]);
    }

    #[test]
    fn batch_partitions_valid_and_invalid() {
        let batch = json!([valid_record(), with("rsi14", json!(101)), json!("junk")]);
        let report = validate_raw_signals(&batch).unwrap();
        assert_eq!(report.valid.len(), 1);
        assert_eq!(report.invalid.len(), 2);
        assert_eq!(report.invalid[1].record, json!("junk"));
        assert_eq!(report.total(), 3);
    }

    #[test]
    fn non_array_input_is_an_error() {
        let err = validate_raw_signals(&valid_record()).unwrap_err();
        assert!(matches!(err, ValidationError::NotASequence("object")));
    }

    #[test]
    fn validate_or_fail_lists_failures() {
        let batch = json!([valid_record(), with("ltp", json!(-3))]);
        let err = validate_or_fail(&batch).unwrap_err();
        match err {
            ValidationError::InvalidRecords { count, details } => {
                assert_eq!(count, 1);
                assert!(details.starts_with("Record 1: ltp:"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(validate_or_fail(&json!([valid_record()])).unwrap().len(), 1);
    }

    #[test]
    fn metadata_requires_iso_scrape_date() {
        let meta = json!({
            "totalRecords": 3,
            "scrapedAt": "2026-02-10T09:15:00.000Z",
            "scrapeDate": "2026-02-10",
            "source": "nepsealpha.com",
            "version": "1.0.0"
        });
        assert_eq!(validate_metadata(&meta).unwrap().total_records, 3);

        let mut bad = meta.clone();
        bad["scrapeDate"] = json!("Feb 10");
        let errors = validate_metadata(&bad).unwrap_err();
        assert_eq!(errors, vec!["metadata.scrapeDate: Invalid date, expected YYYY-MM-DD".to_string()]);
    }

    #[test]
    fn percentage_matcher() {
        assert!(is_percentage("12%"));
        assert!(is_percentage("-0.5%"));
        assert!(is_percentage("3. %"));
        assert!(!is_percentage("%"));
        assert!(!is_percentage(".5%"));
        assert!(!is_percentage("1,000%"));
    }
}
