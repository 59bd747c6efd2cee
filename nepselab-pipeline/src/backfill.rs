//! Backfill and full reprocessing.
//!
//! Dates run strictly one after another: the historical merge is a
//! read-then-append and must not interleave with itself.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::raw::discover_raw_dates;
use crate::runner::{PipelineRunOutcome, PipelineRunner, RunOptions, RunStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateError {
    pub date: NaiveDate,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillResult {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days_processed: usize,
    /// Sum of raw records processed over successful days.
    pub total_records: usize,
    pub errors: Vec<DateError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReprocessResult {
    pub dates_found: usize,
    pub dates_updated: usize,
    pub errors: Vec<DateError>,
}

pub struct BackfillRunner {
    runner: PipelineRunner,
}

impl BackfillRunner {
    pub fn new(runner: PipelineRunner) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &PipelineRunner {
        &self.runner
    }

    /// Force-run every calendar date in `start..=end`. A failing date is
    /// recorded and the walk continues. An inverted range processes nothing.
    pub fn run(&self, start: NaiveDate, end: NaiveDate) -> BackfillResult {
        let mut result = BackfillResult {
            start_date: start,
            end_date: end,
            days_processed: 0,
            total_records: 0,
            errors: Vec::new(),
        };

        for date in start.iter_days().take_while(|d| *d <= end) {
            let outcome = self.runner.run(RunOptions::forced(date));
            match outcome.status {
                RunStatus::Success => {
                    result.days_processed += 1;
                    result.total_records += outcome.records_processed;
                }
                RunStatus::NoNewData => {}
                RunStatus::Error => result.errors.push(date_error(&outcome)),
            }
        }

        info!(
            start = %start,
            end = %end,
            days_processed = result.days_processed,
            total_records = result.total_records,
            failed = result.errors.len(),
            "backfill finished"
        );
        result
    }

    /// Force-run every date that has a raw snapshot directory, oldest first.
    /// Used to regenerate scores after a scoring change.
    pub fn reprocess_features(&self) -> ReprocessResult {
        let dates = discover_raw_dates(self.runner.layout());
        let mut result = ReprocessResult {
            dates_found: dates.len(),
            ..ReprocessResult::default()
        };

        for date in dates {
            let outcome = self.runner.run(RunOptions::forced(date));
            match outcome.status {
                RunStatus::Success => result.dates_updated += 1,
                RunStatus::NoNewData => {}
                RunStatus::Error => result.errors.push(date_error(&outcome)),
            }
        }

        info!(
            dates_found = result.dates_found,
            dates_updated = result.dates_updated,
            failed = result.errors.len(),
            "reprocess finished"
        );
        result
    }
}

fn date_error(outcome: &PipelineRunOutcome) -> DateError {
    let error = outcome
        .error
        .clone()
        .unwrap_or_else(|| "Unknown error".to_string());
    warn!(date = %outcome.date, %error, "date failed");
    DateError {
        date: outcome.date,
        error,
    }
}
