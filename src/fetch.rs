//! One best-effort fetch attempt for one source and one query.

use std::time::Duration;

use tracing::{debug, warn};

use crate::extract::extract_listings;
use crate::models::{ProductRecord, SourceDescriptor};
use crate::scraper::PageFetcher;

/// Per-task bounds shared by every fetch in a batch.
#[derive(Debug, Clone, Copy)]
pub struct FetchLimits {
    pub load_timeout: Duration,
    pub max_items: usize,
}

/// Load one source's search page and extract records for the query.
///
/// Infallible at this boundary: every fault (navigation error, timeout,
/// selector miss, unparsable price) degrades to an empty sequence so one
/// bad source can never poison the rest of the batch.
pub async fn fetch_source(
    fetcher: &dyn PageFetcher,
    source: &SourceDescriptor,
    query: &str,
    limits: FetchLimits,
) -> Vec<ProductRecord> {
    let url = source.search_url(query);

    let html = match fetcher.fetch_page(&url, limits.load_timeout).await {
        Ok(html) => html,
        Err(e) => {
            warn!(source = %source.id, %url, error = %e, "page load failed");
            return Vec::new();
        }
    };

    let listings = extract_listings(&html, &source.selectors, limits.max_items);
    let records: Vec<ProductRecord> = listings
        .iter()
        .filter_map(|raw| ProductRecord::from_listing(raw, &source.id))
        .collect();

    debug!(
        source = %source.id,
        listings = listings.len(),
        records = records.len(),
        "fetch attempt finished"
    );

    records
}
