//! NepseLab Pipeline: daily orchestration over the file-system stores.
//!
//! This crate builds on `nepselab-core` to provide:
//! - Store layout, typed JSONL stores and the single-writer lock
//! - Raw snapshot discovery, loading and writing
//! - Date-scoped aggregation with configurable dedup policy
//! - The append-only historical store and its queries
//! - The per-date pipeline runner and the backfill runner
//! - TOML configuration

pub mod aggregator;
pub mod backfill;
pub mod config;
pub mod historical;
pub mod raw;
pub mod runner;
pub mod store;

pub use aggregator::{dedup_by_key, AggregateResult, Aggregator};
pub use backfill::{BackfillResult, BackfillRunner, DateError, ReprocessResult};
pub use config::{AggregationConfig, ConfigError, DedupPolicy, PipelineConfig, StorageConfig};
pub use historical::{DateRange, HistoricalQuery, HistoricalStats, HistoricalStore, MergeResult};
pub use raw::{
    discover_raw_dates, discover_raw_files, load_raw_records, write_raw_snapshot,
    write_raw_snapshot_at, RawInput, WriteRawResult,
};
pub use runner::{
    PipelineError, PipelineRunOutcome, PipelineRunner, PipelineStatus, RunOptions, RunStatus,
};
pub use store::{JsonlStore, StoreError, StoreLayout, StoreLock};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn runners_are_send_sync() {
        assert_send::<PipelineRunner>();
        assert_sync::<PipelineRunner>();
        assert_send::<BackfillRunner>();
        assert_sync::<BackfillRunner>();
    }

    #[test]
    fn outcomes_are_send_sync() {
        assert_send::<PipelineRunOutcome>();
        assert_sync::<PipelineRunOutcome>();
        assert_send::<BackfillResult>();
        assert_sync::<BackfillResult>();
        assert_send::<PipelineStatus>();
        assert_sync::<PipelineStatus>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<PipelineError>();
        assert_sync::<PipelineError>();
        assert_send::<StoreError>();
        assert_sync::<StoreError>();
        assert_send::<ConfigError>();
        assert_sync::<ConfigError>();
    }
}
