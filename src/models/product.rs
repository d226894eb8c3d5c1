use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::extract::RawListing;
use crate::pricing;

/// A single price listing extracted from one source for one query.
///
/// Records only exist with a parsed, positive price: raw listings that fail
/// the numeric parse are discarded before they cross the fetch boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductRecord {
    pub name: String,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub savings: Decimal,
    pub source_id: String,
    pub image_url: Option<String>,
    pub captured_at: DateTime<Utc>,
}

impl ProductRecord {
    /// Build a record from a raw listing, or discard it when no valid
    /// positive price can be parsed out of the price text.
    ///
    /// An original price that fails to parse is treated as absent rather
    /// than invalidating the whole listing.
    pub fn from_listing(raw: &RawListing, source_id: &str) -> Option<Self> {
        let price = pricing::parse_price(&raw.price_text)?;
        let original_price = raw
            .original_price_text
            .as_deref()
            .and_then(pricing::parse_price);
        let savings = original_price
            .map(|original| original - price)
            .unwrap_or(Decimal::ZERO);

        Some(Self {
            name: raw.name.clone(),
            price,
            original_price,
            savings,
            source_id: source_id.to_string(),
            image_url: raw.image_url.clone(),
            captured_at: Utc::now(),
        })
    }
}
