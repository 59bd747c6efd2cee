//! Record-level data stages: schema validation, normalization, encoding.

pub mod encode;
pub mod mappings;
pub mod normalize;
pub mod schema;

pub use encode::{build_raw_field_map, encode_signal, encode_signals, RawCategoricals, RawFieldMap};
pub use normalize::{normalize, normalize_all, normalize_symbol, NormalizeError};
pub use schema::{
    is_signal_valid, validate_metadata, validate_or_fail, validate_raw_signals, validate_records,
    validate_signal, InvalidRecord, ValidationError, ValidationReport,
};
