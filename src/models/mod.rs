use serde::{Deserialize, Serialize};

pub mod product;
pub mod query;
pub mod source;

// Re-exports for convenience
pub use product::*;
pub use query::*;
pub use source::*;

/// Where a query result came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Cache,
    Live,
    Sample,
}
