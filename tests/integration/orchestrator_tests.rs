use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use price_scout::models::{Origin, QueryKey};
use price_scout::orchestrator::Orchestrator;
use price_scout::registry::SourceRegistry;
use price_scout::sample::sample_records;

use super::*;

fn orchestrator_with(
    sources: Vec<price_scout::models::SourceDescriptor>,
    fetcher: Arc<dyn price_scout::scraper::PageFetcher>,
) -> Orchestrator {
    Orchestrator::new(SourceRegistry::new(sources), fetcher, &test_config())
}

#[tokio::test]
async fn test_second_resolve_hits_cache_without_new_fetch() {
    let fetcher = Arc::new(StaticFetcher::single(
        "metro.test",
        search_page(&[tile("2% Milk 4L", "$3.97 / each", None)]),
    ));
    let orchestrator = orchestrator_with(
        vec![test_source("metro", "Metro", "metro.test")],
        fetcher.clone(),
    );

    let first = orchestrator.resolve("milk").await;
    assert_eq!(first.origin, Origin::Live);
    assert_eq!(first.records.len(), 1);
    assert_eq!(fetcher.call_count(), 1);

    let second = orchestrator.resolve("milk").await;
    assert_eq!(second.origin, Origin::Cache);
    assert_eq!(second.records, first.records);
    assert_eq!(fetcher.call_count(), 1, "cache hit must not launch a fetch");
}

#[tokio::test]
async fn test_query_normalization_shares_one_cache_entry() {
    let fetcher = Arc::new(StaticFetcher::single(
        "metro.test",
        search_page(&[tile("Bananas Bunch", "$1.99", None)]),
    ));
    let orchestrator = orchestrator_with(
        vec![test_source("metro", "Metro", "metro.test")],
        fetcher.clone(),
    );

    let first = orchestrator.resolve("Bananas").await;
    assert_eq!(first.origin, Origin::Live);

    for raw in [" bananas ", "BANANAS", "bananas"] {
        let result = orchestrator.resolve(raw).await;
        assert_eq!(result.origin, Origin::Cache, "raw input: {raw:?}");
        assert_eq!(result.records, first.records);
    }

    assert_eq!(fetcher.call_count(), 1);
}

#[tokio::test]
async fn test_failing_source_does_not_poison_batch() {
    // Source A has no fixture and fails every load; source B serves three
    // valid listings.
    let fetcher = Arc::new(StaticFetcher::single(
        "b.test",
        search_page(&[
            tile("2% Milk 4L", "$3.97", None),
            tile("Whole Milk 4L", "$4.27", None),
            tile("Oat Milk 2L", "$5.49", None),
        ]),
    ));
    let orchestrator = orchestrator_with(
        vec![
            test_source("a", "Store A", "a.test"),
            test_source("b", "Store B", "b.test"),
        ],
        fetcher,
    );

    let result = orchestrator.resolve("milk").await;

    assert_eq!(result.origin, Origin::Live);
    assert_eq!(result.records.len(), 3);
    assert!(result.records.iter().all(|r| r.source_id == "b"));
}

#[tokio::test]
async fn test_merge_preserves_source_launch_order() {
    let pages = HashMap::from([
        (
            "metro.test".to_string(),
            search_page(&[tile("2% Milk 4L", "$3.97", None)]),
        ),
        (
            "sobeys.test".to_string(),
            search_page(&[tile("Whole Milk 4L", "$4.17", None)]),
        ),
    ]);
    let fetcher = Arc::new(StaticFetcher::new(pages));
    let orchestrator = orchestrator_with(
        vec![
            test_source("metro", "Metro", "metro.test"),
            test_source("sobeys", "Sobeys", "sobeys.test"),
        ],
        fetcher,
    );

    let result = orchestrator.resolve("milk").await;

    assert_eq!(result.origin, Origin::Live);
    assert_eq!(result.records.len(), 2);
    assert_eq!(result.records[0].source_id, "metro");
    assert_eq!(result.records[0].price, Decimal::new(397, 2));
    assert_eq!(result.records[1].source_id, "sobeys");
    assert_eq!(result.records[1].price, Decimal::new(417, 2));

    // Re-query within TTL: same two records, now from cache.
    let cached = orchestrator.resolve("milk").await;
    assert_eq!(cached.origin, Origin::Cache);
    assert_eq!(cached.records, result.records);
}

#[tokio::test]
async fn test_empty_merge_falls_back_to_sample_data_and_is_not_cached() {
    let fetcher = Arc::new(StaticFetcher::single(
        "metro.test",
        search_page(&[]), // a results page with no listings
    ));
    let orchestrator = orchestrator_with(
        vec![test_source("metro", "Metro", "metro.test")],
        fetcher.clone(),
    );

    let result = orchestrator.resolve("unobtainium").await;
    assert_eq!(result.origin, Origin::Sample);

    let expected = sample_records(&QueryKey::new("unobtainium"));
    assert_eq!(result.records.len(), expected.len());
    for (got, want) in result.records.iter().zip(&expected) {
        assert_eq!(got.name, want.name);
        assert_eq!(got.price, want.price);
        assert_eq!(got.source_id, want.source_id);
    }

    // Sample data is never cached: the next resolve attempts a fresh batch.
    let again = orchestrator.resolve("unobtainium").await;
    assert_eq!(again.origin, Origin::Sample);
    assert_eq!(fetcher.call_count(), 2);
}

#[tokio::test]
async fn test_all_sources_failing_falls_back_to_sample_data() {
    let orchestrator = orchestrator_with(
        vec![
            test_source("a", "Store A", "a.test"),
            test_source("b", "Store B", "b.test"),
        ],
        Arc::new(FailingFetcher),
    );

    let result = orchestrator.resolve("milk").await;

    assert_eq!(result.origin, Origin::Sample);
    assert!(result.records.iter().all(|r| r.name.contains("milk")));
}

#[tokio::test]
async fn test_second_query_during_fetch_gets_sample_data_immediately() {
    let fetcher = Arc::new(BlockingFetcher::new(search_page(&[tile(
        "2% Milk 4L",
        "$3.97",
        None,
    )])));
    let gate = fetcher.gate.clone();
    let orchestrator = Arc::new(orchestrator_with(
        vec![test_source("metro", "Metro", "metro.test")],
        fetcher,
    ));

    let first = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.resolve("milk").await }
    });

    // Wait until the first batch actually holds the in-flight gate.
    let mut in_flight = false;
    for _ in 0..200 {
        if orchestrator.status().await.fetch_in_flight {
            in_flight = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(in_flight, "first batch never took the in-flight gate");

    // A distinct query while the batch is parked: sample data, no waiting.
    let second = orchestrator.resolve("eggs").await;
    assert_eq!(second.origin, Origin::Sample);

    // Release the parked batch; the first query still completes live.
    gate.add_permits(1);
    let first = first.await.unwrap();
    assert_eq!(first.origin, Origin::Live);
    assert_eq!(first.records.len(), 1);

    // The gate is released once the batch settles.
    assert!(!orchestrator.status().await.fetch_in_flight);
    assert_eq!(orchestrator.resolve("milk").await.origin, Origin::Cache);
}

#[tokio::test]
async fn test_savings_computed_from_was_price() {
    let fetcher = Arc::new(StaticFetcher::single(
        "metro.test",
        search_page(&[tile("2% Milk 4L", "$3.97", Some("$4.49"))]),
    ));
    let orchestrator = orchestrator_with(
        vec![test_source("metro", "Metro", "metro.test")],
        fetcher,
    );

    let result = orchestrator.resolve("milk").await;

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].original_price, Some(Decimal::new(449, 2)));
    assert_eq!(result.records[0].savings, Decimal::new(52, 2));
}

#[tokio::test]
async fn test_status_and_source_counts_reflect_cache_contents() {
    let fetcher = Arc::new(StaticFetcher::single(
        "metro.test",
        search_page(&[
            tile("2% Milk 4L", "$3.97", None),
            tile("Whole Milk 4L", "$4.27", None),
        ]),
    ));
    let orchestrator = orchestrator_with(
        vec![
            test_source("metro", "Metro", "metro.test"),
            test_source("sobeys", "Sobeys", "sobeys.test"),
        ],
        fetcher,
    );

    let before = orchestrator.status().await;
    assert_eq!(before.source_count, 2);
    assert_eq!(before.cached_query_count, 0);
    assert!(!before.fetch_in_flight);

    orchestrator.resolve("milk").await;

    let after = orchestrator.status().await;
    assert_eq!(after.cached_query_count, 1);
    assert!(!after.fetch_in_flight);

    let summaries = orchestrator.list_sources().await;
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].id, "metro");
    assert_eq!(summaries[0].live_record_count, 2);
    assert_eq!(summaries[1].id, "sobeys");
    assert_eq!(summaries[1].live_record_count, 0);
}

#[tokio::test]
async fn test_batch_is_limited_to_the_configured_source_prefix() {
    let pages = HashMap::from([
        ("a.test".to_string(), search_page(&[tile("Milk A", "$1.00", None)])),
        ("b.test".to_string(), search_page(&[tile("Milk B", "$2.00", None)])),
        ("c.test".to_string(), search_page(&[tile("Milk C", "$3.00", None)])),
    ]);
    let fetcher = Arc::new(StaticFetcher::new(pages));

    let mut config = test_config();
    config.fetch.max_sources_per_query = 2;

    let orchestrator = Orchestrator::new(
        SourceRegistry::new(vec![
            test_source("a", "Store A", "a.test"),
            test_source("b", "Store B", "b.test"),
            test_source("c", "Store C", "c.test"),
        ]),
        fetcher.clone(),
        &config,
    );

    let result = orchestrator.resolve("milk").await;

    assert_eq!(fetcher.call_count(), 2, "only the prefix may be fetched");
    assert_eq!(result.records.len(), 2);
    assert_eq!(result.records[0].source_id, "a");
    assert_eq!(result.records[1].source_id, "b");
}
