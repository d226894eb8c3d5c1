// Integration tests for Price Scout
// These tests verify that all components work together correctly

pub mod orchestrator_tests;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use price_scout::config::{
    AppConfig, CacheConfig, FetchConfig, MetricsConfig, ScraperConfig, ServerConfig,
};
use price_scout::models::{SelectorSet, SourceDescriptor};
use price_scout::scraper::PageFetcher;
use price_scout::{AppError, Result};

/// Test configuration for integration tests
pub fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Use random port for testing
        },
        scraper: ScraperConfig {
            user_agent: "PriceScout-Test/1.0".to_string(),
            chrome_path: None,
            pool_size: 1,
            load_timeout_secs: 5,
        },
        fetch: FetchConfig {
            max_sources_per_query: 4,
            max_items_per_source: 10,
        },
        cache: CacheConfig { ttl_secs: 600 },
        metrics: MetricsConfig {
            enabled: false,
            port: 9001,
        },
    }
}

/// A source whose search URL points at a fake host, so fixtures can be keyed
/// by host substring.
pub fn test_source(id: &str, display_name: &str, host: &str) -> SourceDescriptor {
    SourceDescriptor {
        id: id.to_string(),
        display_name: display_name.to_string(),
        search_url_template: format!("https://{host}/search?q={{query}}"),
        selectors: SelectorSet {
            item: "div.product-tile".to_string(),
            name: "span.product-name".to_string(),
            price: "span.price".to_string(),
            original_price: Some("span.was-price".to_string()),
            image: Some("img.product-image".to_string()),
        },
    }
}

pub fn tile(name: &str, price: &str, was_price: Option<&str>) -> String {
    let was_span = was_price
        .map(|was| format!(r#"<span class="was-price">{was}</span>"#))
        .unwrap_or_default();
    format!(
        r#"<div class="product-tile">
            <span class="product-name">{name}</span>
            <span class="price">{price}</span>
            {was_span}
            <img class="product-image" src="/images/{name}.jpg"/>
        </div>"#
    )
}

pub fn search_page(tiles: &[String]) -> String {
    format!("<html><body>{}</body></html>", tiles.join("\n"))
}

/// Serves canned HTML keyed by URL host substring; counts every fetch.
/// URLs with no matching fixture fail like a navigation error would.
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn new(pages: HashMap<String, String>) -> Self {
        Self {
            pages,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn single(host: &str, html: String) -> Self {
        Self::new(HashMap::from([(host.to_string(), html)]))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch_page(&self, url: &str, _timeout: Duration) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .iter()
            .find(|(host, _)| url.contains(host.as_str()))
            .map(|(_, html)| html.clone())
            .ok_or_else(|| AppError::Scraping(format!("navigation to {url} failed")))
    }
}

/// Always fails, like a navigation timeout would.
pub struct FailingFetcher;

#[async_trait]
impl PageFetcher for FailingFetcher {
    async fn fetch_page(&self, url: &str, _timeout: Duration) -> Result<String> {
        Err(AppError::Scraping(format!("navigation to {url} timed out")))
    }
}

/// Parks every fetch on a closed gate until permits are added; used to hold
/// a batch in flight while another query arrives.
pub struct BlockingFetcher {
    pub gate: Arc<Semaphore>,
    html: String,
}

impl BlockingFetcher {
    pub fn new(html: String) -> Self {
        Self {
            gate: Arc::new(Semaphore::new(0)),
            html,
        }
    }
}

#[async_trait]
impl PageFetcher for BlockingFetcher {
    async fn fetch_page(&self, _url: &str, _timeout: Duration) -> Result<String> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| AppError::Scraping("gate closed".to_string()))?;
        Ok(self.html.clone())
    }
}
