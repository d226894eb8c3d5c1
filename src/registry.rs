//! Built-in table of retail sources.

use crate::models::{SelectorSet, SourceDescriptor};

/// Fixed set of fetch sources, loaded once at process start and read-only
/// thereafter.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: Vec<SourceDescriptor>,
}

impl SourceRegistry {
    pub fn new(sources: Vec<SourceDescriptor>) -> Self {
        Self { sources }
    }

    /// The built-in retailer table.
    pub fn builtin() -> Self {
        Self::new(builtin_sources())
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceDescriptor> {
        self.sources.iter()
    }

    pub fn get(&self, id: &str) -> Option<&SourceDescriptor> {
        self.sources.iter().find(|source| source.id == id)
    }

    /// The fixed prefix of the registry selected for one fetch batch.
    ///
    /// Which sources participate is a policy point; the first-N rule keeps
    /// per-query load bounded. TODO: rotate the prefix once per-source
    /// hit-rate stats exist to pick from.
    pub fn batch(&self, max_sources: usize) -> &[SourceDescriptor] {
        &self.sources[..self.sources.len().min(max_sources)]
    }
}

fn builtin_sources() -> Vec<SourceDescriptor> {
    vec![
        SourceDescriptor {
            id: "metro".to_string(),
            display_name: "Metro".to_string(),
            search_url_template: "https://www.metro.ca/en/online-grocery/search?filter={query}"
                .to_string(),
            selectors: SelectorSet {
                item: "div.default-product-tile".to_string(),
                name: "div.content__head__title".to_string(),
                price: "div.pricing__sale-price span.price-update".to_string(),
                original_price: Some("div.pricing__before-price span".to_string()),
                image: Some("picture img".to_string()),
            },
        },
        SourceDescriptor {
            id: "sobeys".to_string(),
            display_name: "Sobeys".to_string(),
            search_url_template: "https://www.sobeys.com/en/search/?q={query}".to_string(),
            selectors: SelectorSet {
                item: "div.product-tile".to_string(),
                name: "a.product-tile__name".to_string(),
                price: "span.product-tile__price".to_string(),
                original_price: Some("span.product-tile__price--original".to_string()),
                image: Some("img.product-tile__image".to_string()),
            },
        },
        SourceDescriptor {
            id: "walmart".to_string(),
            display_name: "Walmart".to_string(),
            search_url_template: "https://www.walmart.ca/search?q={query}".to_string(),
            selectors: SelectorSet {
                item: "div[data-item-id]".to_string(),
                name: "span[data-automation-id='product-title']".to_string(),
                price: "div[data-automation-id='product-price'] span".to_string(),
                original_price: Some("span.was-price".to_string()),
                image: Some("img[data-testid='productTileImage']".to_string()),
            },
        },
        SourceDescriptor {
            id: "loblaws".to_string(),
            display_name: "Loblaws".to_string(),
            search_url_template: "https://www.loblaws.ca/search?search-bar={query}".to_string(),
            selectors: SelectorSet {
                item: "div.product-tile".to_string(),
                name: "h3.product-name__item--name".to_string(),
                price: "span.selling-price-list__item__price--now-price__value".to_string(),
                original_price: Some(
                    "span.selling-price-list__item__price--was-price__value".to_string(),
                ),
                image: Some("div.responsive-image img".to_string()),
            },
        },
        SourceDescriptor {
            id: "nofrills".to_string(),
            display_name: "No Frills".to_string(),
            search_url_template: "https://www.nofrills.ca/search?search-bar={query}".to_string(),
            selectors: SelectorSet {
                item: "div.product-tile".to_string(),
                name: "h3.product-name__item--name".to_string(),
                price: "span.selling-price-list__item__price--now-price__value".to_string(),
                original_price: Some(
                    "span.selling-price-list__item__price--was-price__value".to_string(),
                ),
                image: Some("div.responsive-image img".to_string()),
            },
        },
        SourceDescriptor {
            id: "foodbasics".to_string(),
            display_name: "Food Basics".to_string(),
            search_url_template: "https://www.foodbasics.ca/search?filter={query}".to_string(),
            selectors: SelectorSet {
                item: "div.default-product-tile".to_string(),
                name: "div.content__head__title".to_string(),
                price: "div.pricing__sale-price span.price-update".to_string(),
                original_price: Some("div.pricing__before-price span".to_string()),
                image: Some("picture img".to_string()),
            },
        },
        SourceDescriptor {
            id: "freshco".to_string(),
            display_name: "FreshCo".to_string(),
            search_url_template: "https://freshco.com/?s={query}".to_string(),
            selectors: SelectorSet {
                item: "article.product".to_string(),
                name: "h2.product__title".to_string(),
                price: "span.product__price".to_string(),
                original_price: None,
                image: Some("img.product__image".to_string()),
            },
        },
        SourceDescriptor {
            id: "gianttiger".to_string(),
            display_name: "Giant Tiger".to_string(),
            search_url_template: "https://www.gianttiger.com/search?q={query}".to_string(),
            selectors: SelectorSet {
                item: "div.product-grid-item".to_string(),
                name: "a.product-grid-item__title".to_string(),
                price: "span.price__current".to_string(),
                original_price: Some("span.price__was".to_string()),
                image: Some("img.product-grid-item__image".to_string()),
            },
        },
    ]
}
