//! On-disk layout under `<base>/data/`.
//!
//! ```text
//! data/
//!   raw/<exchange>/YYYY/MM/DD/signals_HHMMSS.json
//!   cleaned/<exchange>/YYYY/MM/cleaned_YYYY-MM-DD.jsonl
//!   features/<exchange>/YYYY/MM/features_YYYY-MM-DD.jsonl
//!   historical/<exchange>_timeseries.jsonl
//!   .pipeline.lock
//! ```

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, NaiveTime};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    data_dir: PathBuf,
    exchange: String,
}

impl StoreLayout {
    pub fn new(base_path: impl AsRef<Path>, exchange: &str) -> Self {
        Self {
            data_dir: base_path.as_ref().join("data"),
            exchange: exchange.to_string(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    pub fn raw_root(&self) -> PathBuf {
        self.data_dir.join("raw").join(&self.exchange)
    }

    pub fn raw_day_dir(&self, date: NaiveDate) -> PathBuf {
        self.raw_root()
            .join(format!("{:04}", date.year()))
            .join(format!("{:02}", date.month()))
            .join(format!("{:02}", date.day()))
    }

    pub fn raw_file(&self, date: NaiveDate, time: NaiveTime) -> PathBuf {
        self.raw_day_dir(date)
            .join(format!("signals_{}.json", time.format("%H%M%S")))
    }

    pub fn cleaned_root(&self) -> PathBuf {
        self.data_dir.join("cleaned").join(&self.exchange)
    }

    pub fn cleaned_file(&self, date: NaiveDate) -> PathBuf {
        month_dir(&self.cleaned_root(), date).join(format!("cleaned_{date}.jsonl"))
    }

    pub fn featured_file(&self, date: NaiveDate) -> PathBuf {
        let root = self.data_dir.join("features").join(&self.exchange);
        month_dir(&root, date).join(format!("features_{date}.jsonl"))
    }

    pub fn historical_file(&self) -> PathBuf {
        self.data_dir
            .join("historical")
            .join(format!("{}_timeseries.jsonl", self.exchange))
    }

    pub fn lock_file(&self) -> PathBuf {
        self.data_dir.join(".pipeline.lock")
    }
}

fn month_dir(root: &Path, date: NaiveDate) -> PathBuf {
    root.join(format!("{:04}", date.year()))
        .join(format!("{:02}", date.month()))
}
