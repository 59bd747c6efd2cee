//! Uniqueness key shared by every store.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// `(symbol, scrape_date)`: at most one record per key in any store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SignalKey {
    pub symbol: String,
    pub scrape_date: NaiveDate,
}

impl SignalKey {
    pub fn new(symbol: &str, scrape_date: NaiveDate) -> Self {
        Self {
            symbol: symbol.to_string(),
            scrape_date,
        }
    }
}

/// Renders as `SYMBOL|YYYY-MM-DD`, the on-disk key format.
impl fmt::Display for SignalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.symbol, self.scrape_date.format("%Y-%m-%d"))
    }
}
