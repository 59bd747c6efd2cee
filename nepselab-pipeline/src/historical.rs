//! Cross-date historical store.
//!
//! Append-only: a merge appends only keys the store has never seen, so the
//! store grows monotonically and never holds a key twice.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use nepselab_core::data::normalize_symbol;
use nepselab_core::domain::{FeaturedSignal, SignalKey};

use crate::store::{JsonlStore, StoreError, StoreLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MergeResult {
    pub added: usize,
    pub skipped: usize,
}

/// Filters for [`HistoricalStore::query`]. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoricalQuery {
    /// Matched case-insensitively.
    pub symbol: Option<String>,
    pub sector: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// `None` or `Some(0)` means no limit.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HistoricalStats {
    pub total_records: usize,
    pub unique_symbols: usize,
    /// `None` for an empty store.
    pub date_range: Option<DateRange>,
    /// Sorted, distinct.
    pub sectors: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct HistoricalStore {
    store: JsonlStore<FeaturedSignal>,
}

impl HistoricalStore {
    pub fn new(layout: &StoreLayout) -> Self {
        Self {
            store: JsonlStore::new(layout.historical_file()),
        }
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }

    pub fn read_all(&self) -> Result<Vec<FeaturedSignal>, StoreError> {
        self.store.read_all()
    }

    /// Append the records whose keys are not yet in the store.
    ///
    /// Duplicate keys inside `signals` are also appended only once (the
    /// first one wins). Not safe against a concurrent merge; callers hold
    /// the store lock.
    pub fn merge(&self, signals: &[FeaturedSignal]) -> Result<MergeResult, StoreError> {
        let mut seen: HashSet<SignalKey> = self
            .store
            .read_all()?
            .iter()
            .map(FeaturedSignal::key)
            .collect();

        let fresh: Vec<FeaturedSignal> = signals
            .iter()
            .filter(|s| seen.insert(s.key()))
            .cloned()
            .collect();

        let result = MergeResult {
            added: fresh.len(),
            skipped: signals.len() - fresh.len(),
        };
        if !fresh.is_empty() {
            self.store.append(&fresh)?;
        }
        info!(added = result.added, skipped = result.skipped, "merged into historical store");
        Ok(result)
    }

    /// Filtered records, sorted by date ascending (stable within a date).
    pub fn query(&self, query: &HistoricalQuery) -> Result<Vec<FeaturedSignal>, StoreError> {
        let symbol = query.symbol.as_deref().map(normalize_symbol);
        let mut records: Vec<FeaturedSignal> = self
            .store
            .read_all()?
            .into_iter()
            .filter(|r| symbol.as_deref().map_or(true, |s| r.symbol() == s))
            .filter(|r| query.sector.as_deref().map_or(true, |s| r.sector() == s))
            .filter(|r| query.start_date.map_or(true, |d| r.signal.scrape_date >= d))
            .filter(|r| query.end_date.map_or(true, |d| r.signal.scrape_date <= d))
            .collect();

        records.sort_by_key(|r| r.signal.scrape_date);
        if let Some(limit) = query.limit.filter(|&n| n > 0) {
            records.truncate(limit);
        }
        Ok(records)
    }

    pub fn symbol_history(
        &self,
        symbol: &str,
        limit: Option<usize>,
    ) -> Result<Vec<FeaturedSignal>, StoreError> {
        self.query(&HistoricalQuery {
            symbol: Some(symbol.to_string()),
            limit,
            ..HistoricalQuery::default()
        })
    }

    /// Up to `limit` records of the most recent date, in store order.
    pub fn latest_records(&self, limit: usize) -> Result<Vec<FeaturedSignal>, StoreError> {
        let records = self.store.read_all()?;
        let Some(latest) = records.iter().map(|r| r.signal.scrape_date).max() else {
            return Ok(Vec::new());
        };
        Ok(records
            .into_iter()
            .filter(|r| r.signal.scrape_date == latest)
            .take(limit)
            .collect())
    }

    pub fn stats(&self) -> Result<HistoricalStats, StoreError> {
        let records = self.store.read_all()?;
        let symbols: HashSet<&str> = records.iter().map(|r| r.symbol()).collect();
        let sectors: BTreeSet<&str> = records.iter().map(|r| r.sector()).collect();
        let start = records.iter().map(|r| r.signal.scrape_date).min();
        let end = records.iter().map(|r| r.signal.scrape_date).max();

        Ok(HistoricalStats {
            total_records: records.len(),
            unique_symbols: symbols.len(),
            date_range: start.zip(end).map(|(start, end)| DateRange { start, end }),
            sectors: sectors.into_iter().map(str::to_string).collect(),
        })
    }
}
