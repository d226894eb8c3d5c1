//! Pure DOM extraction over already-retrieved HTML.
//!
//! Extraction is decoupled from the browser call so selector behavior is
//! testable with plain string fixtures. Invalid selectors and missing
//! elements yield fewer (possibly zero) listings rather than an error.

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::models::SelectorSet;

/// One candidate listing pulled out of a search result page, before price
/// parsing and validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawListing {
    pub name: String,
    pub price_text: String,
    pub original_price_text: Option<String>,
    pub image_url: Option<String>,
}

/// Extract up to `max_items` raw listings using the source's selector set.
pub fn extract_listings(html: &str, selectors: &SelectorSet, max_items: usize) -> Vec<RawListing> {
    let Some(item_sel) = parse_selector(&selectors.item, "item") else {
        return Vec::new();
    };
    let Some(name_sel) = parse_selector(&selectors.name, "name") else {
        return Vec::new();
    };
    let Some(price_sel) = parse_selector(&selectors.price, "price") else {
        return Vec::new();
    };
    let original_sel = selectors
        .original_price
        .as_deref()
        .and_then(|s| parse_selector(s, "original_price"));
    let image_sel = selectors
        .image
        .as_deref()
        .and_then(|s| parse_selector(s, "image"));

    let document = Html::parse_document(html);
    let mut listings = Vec::new();

    for item in document.select(&item_sel).take(max_items) {
        // A tile without a name or price text is not a listing.
        let Some(name) = select_text(&item, &name_sel) else {
            continue;
        };
        let Some(price_text) = select_text(&item, &price_sel) else {
            continue;
        };

        let original_price_text = original_sel.as_ref().and_then(|sel| select_text(&item, sel));
        let image_url = image_sel.as_ref().and_then(|sel| select_attr(&item, sel, "src"));

        listings.push(RawListing {
            name,
            price_text,
            original_price_text,
            image_url,
        });
    }

    listings
}

fn parse_selector(selector: &str, field: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(%selector, field, error = ?e, "invalid CSS selector");
            None
        }
    }
}

fn select_text(item: &ElementRef, selector: &Selector) -> Option<String> {
    let element = item.select(selector).next()?;
    let text = element.text().collect::<Vec<_>>().join(" ").trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn select_attr(item: &ElementRef, selector: &Selector, attr: &str) -> Option<String> {
    item.select(selector)
        .next()
        .and_then(|element| element.value().attr(attr))
        .map(str::to_string)
}
