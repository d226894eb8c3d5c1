//! Query resolution: cache first, then at most one live fetch batch
//! system-wide, then deterministic sample data.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::QueryCache;
use crate::config::AppConfig;
use crate::fetch::{fetch_source, FetchLimits};
use crate::models::{Origin, ProductRecord, QueryKey};
use crate::registry::SourceRegistry;
use crate::sample::sample_records;
use crate::scraper::PageFetcher;

/// Extra headroom on top of the page-load timeout before a spawned fetch
/// task is abandoned. Covers extraction and parsing on slow hosts.
const TASK_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub records: Vec<ProductRecord>,
    pub origin: Origin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSummary {
    pub id: String,
    pub display_name: String,
    pub live_record_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatus {
    pub source_count: usize,
    pub cached_query_count: usize,
    pub fetch_in_flight: bool,
}

/// Releases the in-flight gate when dropped, so the gate cannot stay held
/// across any exit path of a fetch batch, including panics and cancelled
/// requests.
struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> FlightGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then_some(Self { flag })
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct Orchestrator {
    registry: SourceRegistry,
    cache: QueryCache,
    fetcher: Arc<dyn PageFetcher>,
    limits: FetchLimits,
    max_sources_per_query: usize,
    fetch_in_flight: AtomicBool,
}

impl Orchestrator {
    pub fn new(registry: SourceRegistry, fetcher: Arc<dyn PageFetcher>, config: &AppConfig) -> Self {
        Self {
            registry,
            cache: QueryCache::new(Duration::from_secs(config.cache.ttl_secs)),
            fetcher,
            limits: FetchLimits {
                load_timeout: Duration::from_secs(config.scraper.load_timeout_secs),
                max_items: config.fetch.max_items_per_source,
            },
            max_sources_per_query: config.fetch.max_sources_per_query,
            fetch_in_flight: AtomicBool::new(false),
        }
    }

    /// Resolve a raw query to a record set and its origin.
    ///
    /// Never fails: every degradation path lands on cached, live, or sample
    /// data. Latency is bounded by the slowest task of a single batch.
    pub async fn resolve(&self, raw_query: &str) -> QueryResult {
        let key = QueryKey::new(raw_query);

        if let Some(records) = self.cache.get(&key).await {
            counter!("scout_cache_hits_total").increment(1);
            debug!(query = %key, records = records.len(), "cache hit");
            return QueryResult {
                records,
                origin: Origin::Cache,
            };
        }
        counter!("scout_cache_misses_total").increment(1);

        let merged = match FlightGuard::try_acquire(&self.fetch_in_flight) {
            Some(_guard) => self.run_batch(&key).await,
            None => {
                // A batch already owns the browsers; this query gets sample
                // data this round instead of queuing behind it.
                counter!("scout_throttle_skips_total").increment(1);
                debug!(query = %key, "fetch already in flight, skipping live attempt");
                Vec::new()
            }
        };

        if merged.is_empty() {
            counter!("scout_sample_fallbacks_total").increment(1);
            debug!(query = %key, "no live data, serving sample records");
            return QueryResult {
                records: sample_records(&key),
                origin: Origin::Sample,
            };
        }

        self.cache.put(key, merged.clone()).await;
        QueryResult {
            records: merged,
            origin: Origin::Live,
        }
    }

    /// Launch one fetch task per selected source and merge their results in
    /// launch order. Holding the in-flight gate is the caller's concern.
    async fn run_batch(&self, key: &QueryKey) -> Vec<ProductRecord> {
        counter!("scout_fetch_batches_total").increment(1);

        let selected = self.registry.batch(self.max_sources_per_query);
        info!(query = %key, sources = selected.len(), "launching fetch batch");

        let task_budget = self.limits.load_timeout + TASK_GRACE;
        let handles: Vec<_> = selected
            .iter()
            .map(|source| {
                let fetcher = Arc::clone(&self.fetcher);
                let source = source.clone();
                let query = key.as_str().to_string();
                let limits = self.limits;
                tokio::spawn(async move {
                    match tokio::time::timeout(
                        task_budget,
                        fetch_source(fetcher.as_ref(), &source, &query, limits),
                    )
                    .await
                    {
                        Ok(records) => records,
                        Err(_) => {
                            // A hung task must settle as empty, or the
                            // in-flight gate would starve later queries.
                            warn!(
                                source = %source.id,
                                budget_secs = task_budget.as_secs(),
                                "fetch task timed out"
                            );
                            Vec::new()
                        }
                    }
                })
            })
            .collect();

        let outcomes = join_all(handles).await;

        let mut merged = Vec::new();
        for (source, outcome) in selected.iter().zip(outcomes) {
            match outcome {
                Ok(records) => merged.extend(records),
                Err(join_err) => {
                    warn!(source = %source.id, error = %join_err, "fetch task failed");
                }
            }
        }

        info!(query = %key, records = merged.len(), "fetch batch settled");
        merged
    }

    pub async fn list_sources(&self) -> Vec<SourceSummary> {
        let mut summaries = Vec::with_capacity(self.registry.len());
        for source in self.registry.iter() {
            summaries.push(SourceSummary {
                id: source.id.clone(),
                display_name: source.display_name.clone(),
                live_record_count: self.cache.count_by_source(&source.id).await,
            });
        }
        summaries
    }

    pub async fn status(&self) -> SystemStatus {
        SystemStatus {
            source_count: self.registry.len(),
            cached_query_count: self.cache.live_len().await,
            fetch_in_flight: self.fetch_in_flight.load(Ordering::Acquire),
        }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }
}
