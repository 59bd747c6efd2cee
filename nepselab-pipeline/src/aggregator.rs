//! Date-scoped cleaned and featured stores.
//!
//! A batch is deduplicated by `(symbol, scrape_date)` under the configured
//! [`DedupPolicy`] and written to the date's file. When the file already
//! holds some of the batch's keys (a forced re-run), the file is rewritten
//! with the old records for other keys followed by the new batch, so a key
//! never appears twice in one store.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use nepselab_core::domain::{CleanedSignal, FeaturedSignal, SignalKey};
use nepselab_core::features::{daily_stats, DailyFeatureStats};

use crate::config::{AggregationConfig, DedupPolicy};
use crate::store::{JsonlStore, StoreError, StoreLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AggregateResult {
    pub total_records: usize,
    pub unique_symbols: usize,
    pub duplicates_removed: usize,
}

/// Deduplicate by key. Survivors keep the position of the key's first
/// occurrence; under `KeepLast` that slot holds the last record seen.
/// Returns the survivors and the number of records dropped.
pub fn dedup_by_key<T, F>(items: Vec<T>, policy: DedupPolicy, key: F) -> (Vec<T>, usize)
where
    F: Fn(&T) -> SignalKey,
{
    let total = items.len();
    let mut slots: HashMap<SignalKey, usize> = HashMap::with_capacity(total);
    let mut out: Vec<T> = Vec::with_capacity(total);

    for item in items {
        match slots.get(&key(&item)) {
            Some(&slot) => {
                if policy == DedupPolicy::KeepLast {
                    out[slot] = item;
                }
            }
            None => {
                slots.insert(key(&item), out.len());
                out.push(item);
            }
        }
    }
    let removed = total - out.len();
    (out, removed)
}

#[derive(Debug, Clone)]
pub struct Aggregator {
    layout: StoreLayout,
    policy: AggregationConfig,
}

impl Aggregator {
    pub fn new(layout: StoreLayout, policy: AggregationConfig) -> Self {
        Self { layout, policy }
    }

    pub fn policy(&self) -> AggregationConfig {
        self.policy
    }

    pub fn cleaned_store(&self, date: NaiveDate) -> JsonlStore<CleanedSignal> {
        JsonlStore::new(self.layout.cleaned_file(date))
    }

    pub fn featured_store(&self, date: NaiveDate) -> JsonlStore<FeaturedSignal> {
        JsonlStore::new(self.layout.featured_file(date))
    }

    /// Deduplicate cleaned signals and write them to the date's cleaned store.
    pub fn aggregate_cleaned(
        &self,
        signals: &[CleanedSignal],
        date: NaiveDate,
    ) -> Result<AggregateResult, StoreError> {
        let (unique, duplicates_removed) =
            dedup_by_key(signals.to_vec(), self.policy.cleaned_dedup, CleanedSignal::key);
        let unique_symbols = unique.iter().map(|s| s.symbol.as_str()).collect::<HashSet<_>>().len();

        write_date_file(&self.cleaned_store(date), &unique, CleanedSignal::key)?;
        info!(%date, records = unique.len(), duplicates_removed, "aggregated cleaned records");

        Ok(AggregateResult {
            total_records: unique.len(),
            unique_symbols,
            duplicates_removed,
        })
    }

    /// Deduplicate featured signals and write them to the date's featured
    /// store. Returns the store path.
    pub fn aggregate_features(
        &self,
        signals: &[FeaturedSignal],
        date: NaiveDate,
    ) -> Result<PathBuf, StoreError> {
        let (unique, duplicates_removed) =
            dedup_by_key(signals.to_vec(), self.policy.featured_dedup, FeaturedSignal::key);
        let store = self.featured_store(date);

        write_date_file(&store, &unique, FeaturedSignal::key)?;
        info!(%date, records = unique.len(), duplicates_removed, "aggregated featured records");

        Ok(store.path().to_path_buf())
    }

    /// Whether the date already has a cleaned store.
    pub fn is_already_processed(&self, date: NaiveDate) -> bool {
        self.cleaned_store(date).exists()
    }

    pub fn cleaned_records(&self, date: NaiveDate) -> Result<Vec<CleanedSignal>, StoreError> {
        self.cleaned_store(date).read_all()
    }

    pub fn featured_records(&self, date: NaiveDate) -> Result<Vec<FeaturedSignal>, StoreError> {
        self.featured_store(date).read_all()
    }

    pub fn daily_stats(&self, date: NaiveDate) -> Result<DailyFeatureStats, StoreError> {
        Ok(daily_stats(date, &self.featured_records(date)?))
    }

    /// Dates with a cleaned store, ascending.
    pub fn processed_dates(&self) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let Ok(years) = fs::read_dir(self.layout.cleaned_root()) else {
            return dates;
        };
        for year in years.filter_map(Result::ok) {
            let Ok(months) = fs::read_dir(year.path()) else { continue };
            for month in months.filter_map(Result::ok) {
                let Ok(files) = fs::read_dir(month.path()) else { continue };
                dates.extend(files.filter_map(Result::ok).filter_map(|f| {
                    let name = f.file_name().to_str()?.to_string();
                    let date = name.strip_prefix("cleaned_")?.strip_suffix(".jsonl")?;
                    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
                }));
            }
        }
        dates.sort();
        dates
    }

    pub fn last_processed(&self) -> Option<NaiveDate> {
        self.processed_dates().into_iter().next_back()
    }
}

/// Append `batch`, or rewrite the file when it already holds any of the
/// batch's keys.
fn write_date_file<T, F>(store: &JsonlStore<T>, batch: &[T], key: F) -> Result<(), StoreError>
where
    T: Serialize + DeserializeOwned + Clone,
    F: Fn(&T) -> SignalKey,
{
    if !store.exists() {
        return store.append(batch);
    }

    let incoming: HashSet<SignalKey> = batch.iter().map(&key).collect();
    let existing = store.read_all()?;
    if !existing.iter().any(|r| incoming.contains(&key(r))) {
        return store.append(batch);
    }

    let superseded = existing.iter().filter(|r| incoming.contains(&key(r))).count();
    let mut merged: Vec<T> = existing
        .into_iter()
        .filter(|r| !incoming.contains(&key(r)))
        .collect();
    merged.extend_from_slice(batch);
    debug!(path = %store.path().display(), superseded, "rewriting date store");
    store.replace(&merged)
}
