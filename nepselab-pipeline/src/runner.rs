//! Pipeline runner: one date from raw snapshots to the historical store.
//!
//! Two entry points:
//! - `run()`: discovers the date's raw files. Used by the CLI and backfill.
//! - `run_from_raw_records()`: takes in-memory records, skipping discovery.
//!
//! Both return a [`PipelineRunOutcome`]; failures become `error` outcomes
//! and never escape to the caller.

use std::time::Instant;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use nepselab_core::data::{
    build_raw_field_map, encode_signals, normalize_all, validate_records, NormalizeError,
};
use nepselab_core::domain::FeaturedSignal;
use nepselab_core::features::FeatureEngine;

use crate::aggregator::{dedup_by_key, Aggregator};
use crate::config::PipelineConfig;
use crate::historical::{HistoricalStats, HistoricalStore};
use crate::raw::{discover_raw_files, fingerprint_records, load_raw_records};
use crate::store::{StoreError, StoreLayout, StoreLock};

/// How many rejected records to quote in the log.
const LOGGED_INVALID: usize = 3;

/// Errors inside a run. Converted to an `error` outcome at the boundary.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No valid records found")]
    NoValidRecords,
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    NoNewData,
    Error,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Defaults to today (UTC).
    pub date: Option<NaiveDate>,
    /// Reprocess even if the date already has a cleaned store.
    pub force: bool,
    /// Stop after the cleaned store.
    pub skip_features: bool,
}

impl RunOptions {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::default()
        }
    }

    pub fn forced(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            force: true,
            skip_features: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRunOutcome {
    pub status: RunStatus,
    pub date: NaiveDate,
    /// Raw records loaded, valid or not.
    pub records_processed: usize,
    pub records_invalid: usize,
    pub records_cleaned: usize,
    pub records_featured: usize,
    pub historical_added: usize,
    pub duration_ms: u64,
    /// BLAKE3 of the raw input, when any was read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PipelineRunOutcome {
    fn empty(status: RunStatus, date: NaiveDate) -> Self {
        Self {
            status,
            date,
            records_processed: 0,
            records_invalid: 0,
            records_cleaned: 0,
            records_featured: 0,
            historical_added: 0,
            duration_ms: 0,
            input_hash: None,
            error: None,
        }
    }

    pub fn no_new_data(date: NaiveDate) -> Self {
        Self::empty(RunStatus::NoNewData, date)
    }

    pub fn error(date: NaiveDate, message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::empty(RunStatus::Error, date)
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }
}

/// Historical stats plus the latest date with a cleaned store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStatus {
    pub historical: HistoricalStats,
    pub last_processed: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct PipelineRunner {
    layout: StoreLayout,
    engine: FeatureEngine,
    aggregator: Aggregator,
    historical: HistoricalStore,
    config: PipelineConfig,
}

impl PipelineRunner {
    pub fn new(config: PipelineConfig) -> Self {
        let layout = config.layout();
        Self {
            engine: FeatureEngine::new(config.features),
            aggregator: Aggregator::new(layout.clone(), config.aggregation),
            historical: HistoricalStore::new(&layout),
            layout,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn historical(&self) -> &HistoricalStore {
        &self.historical
    }

    /// Process one date from its raw snapshot files.
    pub fn run(&self, options: RunOptions) -> PipelineRunOutcome {
        let started = Instant::now();
        let date = options.date.unwrap_or_else(|| Utc::now().date_naive());
        info!(%date, force = options.force, skip_features = options.skip_features, "pipeline run starting");

        let result = self.run_discovered(date, options);
        finish(date, started, result)
    }

    /// Process in-memory raw records as `options.date`. `force` is ignored:
    /// the caller supplies the input, so there is nothing to skip.
    pub fn run_from_raw_records(&self, records: &[Value], options: RunOptions) -> PipelineRunOutcome {
        let started = Instant::now();
        let date = options.date.unwrap_or_else(|| Utc::now().date_naive());
        info!(%date, records = records.len(), "pipeline run from in-memory records");

        let result = StoreLock::acquire(self.layout.lock_file())
            .map_err(PipelineError::from)
            .and_then(|_lock| {
                self.process(date, records, fingerprint_records(records), options.skip_features)
            });
        finish(date, started, result)
    }

    pub fn get_status(&self) -> Result<PipelineStatus, StoreError> {
        Ok(PipelineStatus {
            historical: self.historical.stats()?,
            last_processed: self.aggregator.last_processed(),
        })
    }

    fn run_discovered(
        &self,
        date: NaiveDate,
        options: RunOptions,
    ) -> Result<PipelineRunOutcome, PipelineError> {
        let _lock = StoreLock::acquire(self.layout.lock_file())?;

        if !options.force && self.aggregator.is_already_processed(date) {
            info!(%date, "already processed, skipping");
            return Ok(PipelineRunOutcome::no_new_data(date));
        }

        let files = discover_raw_files(&self.layout, date);
        if files.is_empty() {
            info!(%date, "no raw snapshots");
            return Ok(PipelineRunOutcome::no_new_data(date));
        }

        let input = load_raw_records(&files, date);
        self.process(date, &input.records, input.input_hash, options.skip_features)
    }

    /// validate → normalize → encode → aggregate → engineer → aggregate → merge
    fn process(
        &self,
        date: NaiveDate,
        records: &[Value],
        input_hash: String,
        skip_features: bool,
    ) -> Result<PipelineRunOutcome, PipelineError> {
        let side_table = build_raw_field_map(records.iter());
        let report = validate_records(records);

        if !report.invalid.is_empty() {
            let sample: Vec<String> = report
                .invalid
                .iter()
                .take(LOGGED_INVALID)
                .map(|r| r.errors.join(", "))
                .collect();
            warn!(%date, invalid = report.invalid.len(), sample = ?sample, "rejected invalid raw records");
        }
        if !report.has_valid() {
            return Err(PipelineError::NoValidRecords);
        }

        let cleaned = encode_signals(&normalize_all(&report.valid)?, &side_table);
        let aggregate = self.aggregator.aggregate_cleaned(&cleaned, date)?;

        let mut outcome = PipelineRunOutcome {
            records_processed: records.len(),
            records_invalid: report.invalid.len(),
            records_cleaned: aggregate.total_records,
            input_hash: Some(input_hash),
            ..PipelineRunOutcome::empty(RunStatus::Success, date)
        };

        if !skip_features {
            let (featured, _) = dedup_by_key(
                self.engine.engineer_batch(&cleaned),
                self.aggregator.policy().featured_dedup,
                FeaturedSignal::key,
            );
            self.aggregator.aggregate_features(&featured, date)?;
            let merge = self.historical.merge(&featured)?;

            outcome.records_featured = featured.len();
            outcome.historical_added = merge.added;
        }
        Ok(outcome)
    }
}

fn finish(
    date: NaiveDate,
    started: Instant,
    result: Result<PipelineRunOutcome, PipelineError>,
) -> PipelineRunOutcome {
    let mut outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(%date, error = %e, "pipeline run failed");
            PipelineRunOutcome::error(date, e.to_string())
        }
    };
    outcome.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    if outcome.is_success() {
        info!(
            %date,
            processed = outcome.records_processed,
            cleaned = outcome.records_cleaned,
            featured = outcome.records_featured,
            duration_ms = outcome.duration_ms,
            "pipeline run finished"
        );
    }
    outcome
}
