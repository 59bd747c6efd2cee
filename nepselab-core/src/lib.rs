//! NepseLab Core: signal domain types and the pure record stages.
//!
//! This crate holds everything that does not touch the filesystem:
//! - Domain types (raw, cleaned and featured signals, keys, zones)
//! - Schema validation of loosely-typed raw records
//! - Normalization of percentage strings and dates
//! - Categorical encoding tables and the symbol-keyed side-table join
//! - The Feature Engine (momentum, trend, MA alignment, composite, volatility)

pub mod data;
pub mod domain;
pub mod features;
pub mod numeric;
