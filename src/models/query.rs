use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized search query, the unit of cache lookup and deduplication.
///
/// Raw inputs that differ only in case or surrounding whitespace map to the
/// same key, so `"Bananas"`, `" bananas "` and `"BANANAS"` share one cache
/// entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryKey(String);

impl QueryKey {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QueryKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
