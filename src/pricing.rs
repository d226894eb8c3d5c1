//! Price parsing for free-form retail price text.
//!
//! Search result pages render prices as strings like `"$3.97 / each"`,
//! `"Now $5.00"` or `"$1,299.99"`. The parser pulls the first plausible
//! amount out of the text; anything without a valid positive number (for
//! example `"Call for price"`) yields `None` and the listing is dropped
//! upstream.

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::OnceLock;

fn price_regex() -> &'static Regex {
    static PRICE_RE: OnceLock<Regex> = OnceLock::new();
    PRICE_RE.get_or_init(|| {
        // Optional currency symbol, then either a comma-grouped amount or a
        // plain amount, with up to two decimal places.
        Regex::new(r"[\$£€¥]?\s*(\d{1,3}(?:,\d{3})+(?:\.\d{1,2})?|\d+(?:\.\d{1,2})?)").unwrap()
    })
}

/// Parse the first positive decimal amount out of free-form price text.
pub fn parse_price(text: &str) -> Option<Decimal> {
    let captures = price_regex().captures(text)?;
    let amount = captures.get(1)?.as_str().replace(',', "");
    let price = Decimal::from_str(&amount).ok()?;
    (price > Decimal::ZERO).then_some(price)
}
