//! Raw snapshot files: discovery, loading and writing.
//!
//! Discovery is forgiving. A missing day directory means no data, and a file
//! that cannot be read or parsed is skipped with a warning. Only the stores
//! downstream treat I/O problems as hard errors.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use nepselab_core::data::validate_metadata;
use nepselab_core::domain::{RawFile, RawMetadata};

use crate::store::{StoreError, StoreLayout};

pub const RAW_VERSION: &str = "1.0.0";
pub const DEFAULT_SOURCE: &str = "nepsealpha.com";

/// Everything loaded from one day's raw files.
#[derive(Debug, Clone, Default)]
pub struct RawInput {
    /// Records from every readable file, `scrapeDate` filled in.
    pub records: Vec<Value>,
    pub files_read: Vec<PathBuf>,
    pub files_skipped: Vec<PathBuf>,
    /// BLAKE3 over the name and bytes of every file read, in path order.
    pub input_hash: String,
}

/// Raw snapshot files for `date`, sorted by name (i.e. by scrape time).
pub fn discover_raw_files(layout: &StoreLayout, date: NaiveDate) -> Vec<PathBuf> {
    let dir = layout.raw_day_dir(date);
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(dir = %dir.display(), error = %e, "cannot list raw directory");
            }
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_snapshot_name(path))
        .collect();
    files.sort();
    files
}

fn is_snapshot_name(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("signals_") && n.ends_with(".json"))
}

/// Load and flatten the records of `files`.
///
/// Records without a `scrapeDate` inherit the file's `metadata.scrapeDate`,
/// or `date` when the header is missing or invalid.
pub fn load_raw_records(files: &[PathBuf], date: NaiveDate) -> RawInput {
    let mut input = RawInput::default();
    let mut hasher = blake3::Hasher::new();
    let fallback = date.to_string();

    for path in files {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "skipping unreadable raw file");
                input.files_skipped.push(path.clone());
                continue;
            }
        };
        let content: Value = match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "skipping unparseable raw file");
                input.files_skipped.push(path.clone());
                continue;
            }
        };
        let Some(Value::Array(records)) = content.get("records") else {
            warn!(file = %path.display(), "skipping raw file without a records array");
            input.files_skipped.push(path.clone());
            continue;
        };

        let file_date = match content.get("metadata").map(validate_metadata) {
            Some(Ok(meta)) => meta.scrape_date,
            Some(Err(errors)) => {
                warn!(
                    file = %path.display(),
                    errors = ?errors,
                    "invalid raw metadata, using target date"
                );
                fallback.clone()
            }
            None => fallback.clone(),
        };

        if let Some(name) = path.file_name() {
            hasher.update(name.to_string_lossy().as_bytes());
        }
        hasher.update(&bytes);

        input
            .records
            .extend(records.iter().map(|r| with_scrape_date(r, &file_date)));
        input.files_read.push(path.clone());
        debug!(file = %path.display(), records = records.len(), "loaded raw file");
    }

    input.input_hash = hasher.finalize().to_hex().to_string();
    input
}

/// Fill a missing or empty `scrapeDate`; non-object records pass through.
fn with_scrape_date(record: &Value, date: &str) -> Value {
    let mut record = record.clone();
    if let Value::Object(obj) = &mut record {
        let present = matches!(obj.get("scrapeDate"), Some(Value::String(s)) if !s.is_empty());
        if !present {
            obj.insert("scrapeDate".to_string(), Value::String(date.to_string()));
        }
    }
    record
}

/// BLAKE3 fingerprint of in-memory records, for runs that bypass discovery.
pub fn fingerprint_records(records: &[Value]) -> String {
    let mut hasher = blake3::Hasher::new();
    for record in records {
        // Value's Display is compact JSON and cannot fail.
        hasher.update(record.to_string().as_bytes());
        hasher.update(b"\n");
    }
    hasher.finalize().to_hex().to_string()
}

/// Every date with a `YYYY/MM/DD` directory under the raw root, ascending.
pub fn discover_raw_dates(layout: &StoreLayout) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    for (year, year_dir) in numeric_subdirs(&layout.raw_root(), 4) {
        for (month, month_dir) in numeric_subdirs(&year_dir, 2) {
            for (day, _) in numeric_subdirs(&month_dir, 2) {
                let date = i32::try_from(year)
                    .ok()
                    .and_then(|y| NaiveDate::from_ymd_opt(y, month, day));
                match date {
                    Some(date) => dates.push(date),
                    None => debug!(year, month, day, "ignoring non-calendar raw directory"),
                }
            }
        }
    }
    dates.sort();
    dates.dedup();
    dates
}

/// Subdirectories whose names are exactly `width` ASCII digits.
fn numeric_subdirs(dir: &Path, width: usize) -> Vec<(u32, PathBuf)> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            if name.len() != width || !name.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            Some((name.parse().ok()?, entry.path()))
        })
        .collect()
}

/// Result of writing one raw snapshot.
#[derive(Debug, Clone)]
pub struct WriteRawResult {
    pub path: PathBuf,
    pub record_count: usize,
    pub scraped_at: String,
}

/// Write `records` as a new raw snapshot stamped with the current time.
pub fn write_raw_snapshot(
    layout: &StoreLayout,
    records: &[Value],
    date: Option<NaiveDate>,
    source: Option<&str>,
) -> Result<WriteRawResult, StoreError> {
    write_raw_snapshot_at(layout, records, Utc::now(), date, source)
}

/// Write `records` as a raw snapshot scraped at `scraped_at`.
///
/// The file lands in the day directory of `date` (default: the scrape day)
/// and is named after the scrape time.
pub fn write_raw_snapshot_at(
    layout: &StoreLayout,
    records: &[Value],
    scraped_at: DateTime<Utc>,
    date: Option<NaiveDate>,
    source: Option<&str>,
) -> Result<WriteRawResult, StoreError> {
    let scrape_date = date.unwrap_or_else(|| scraped_at.date_naive());
    let stamp = scraped_at.to_rfc3339_opts(SecondsFormat::Millis, true);

    let file = RawFile {
        metadata: RawMetadata {
            total_records: records.len(),
            scraped_at: stamp.clone(),
            scrape_date: scrape_date.to_string(),
            source: source.unwrap_or(DEFAULT_SOURCE).to_string(),
            version: RAW_VERSION.to_string(),
        },
        records: records.to_vec(),
    };

    let path = layout.raw_file(scrape_date, scraped_at.time());
    write_json_atomic(&path, &file)?;

    Ok(WriteRawResult {
        path,
        record_count: records.len(),
        scraped_at: stamp,
    })
}

fn write_json_atomic(path: &Path, file: &RawFile) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    let json = serde_json::to_vec_pretty(file)?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json).map_err(|e| StoreError::io(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        StoreError::io(path, e)
    })
}
