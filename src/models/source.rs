use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// CSS selectors used to pull listing fields out of one retailer's search
/// result page. `item` scopes a single product tile; the remaining selectors
/// are evaluated relative to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectorSet {
    pub item: String,
    pub name: String,
    pub price: String,
    pub original_price: Option<String>,
    pub image: Option<String>,
}

/// One external retailer's search endpoint plus its extraction rules.
///
/// Descriptors are immutable and loaded once at process start; the set of
/// sources is fixed for a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceDescriptor {
    pub id: String,
    pub display_name: String,
    pub search_url_template: String,
    pub selectors: SelectorSet,
}

impl SourceDescriptor {
    /// Substitute the percent-encoded query into the `{query}` placeholder
    /// of the search URL template.
    pub fn search_url(&self, query: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
        self.search_url_template.replace("{query}", &encoded)
    }
}
