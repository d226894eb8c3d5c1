//! Deterministic placeholder records, served when no live or cached data is
//! available for a query.

use chrono::Utc;
use rust_decimal::Decimal;

use crate::models::{ProductRecord, QueryKey};

/// Template shelf used to synthesize results. Names embed the query, prices
/// are fixed, and source identifiers stay constant across calls so
/// downstream consumers always see a stable shape.
const SAMPLE_SHELF: &[(&str, &str, i64, Option<i64>)] = &[
    // (name template, source id, price in cents, original price in cents)
    ("Selection {}", "metro", 397, Some(449)),
    ("Compliments {}", "sobeys", 417, None),
    ("Great Value {}", "walmart", 297, Some(349)),
    ("President's Choice {}", "loblaws", 429, None),
    ("No Name {}", "nofrills", 249, None),
    ("Irresistibles {}", "foodbasics", 379, Some(399)),
];

/// Synthesize placeholder records for a query, filtered to names containing
/// the query substring (case-insensitive). Pure function of the key: no
/// cache or live collaborator is ever consulted.
pub fn sample_records(key: &QueryKey) -> Vec<ProductRecord> {
    let query = key.as_str();
    let captured_at = Utc::now();

    SAMPLE_SHELF
        .iter()
        .map(|(template, source_id, price_cents, original_cents)| {
            let price = Decimal::new(*price_cents, 2);
            let original_price = original_cents.map(|cents| Decimal::new(cents, 2));
            let savings = original_price
                .map(|original| original - price)
                .unwrap_or(Decimal::ZERO);

            ProductRecord {
                name: template.replace("{}", query),
                price,
                original_price,
                savings,
                source_id: (*source_id).to_string(),
                image_url: None,
                captured_at,
            }
        })
        .filter(|record| record.name.to_lowercase().contains(query))
        .collect()
}
