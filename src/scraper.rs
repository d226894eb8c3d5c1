//! Browser-automation collaborator: loads a search result page and returns
//! its rendered HTML.
//!
//! The orchestration tier only depends on the [`PageFetcher`] trait;
//! production uses a small pool of headless Chrome instances, tests
//! substitute canned fixtures.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use tracing::debug;

use crate::config::ScraperConfig;
use crate::utils::error::{AppError, Result};

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Load `url` and return the rendered page HTML, failing on navigation
    /// errors or when the load exceeds `timeout`.
    async fn fetch_page(&self, url: &str, timeout: Duration) -> Result<String>;
}

pub struct BrowserPool {
    browsers: Vec<Arc<Browser>>,
    current_index: AtomicUsize,
}

impl BrowserPool {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let mut browsers = Vec::new();

        // Each batch may touch several sources at once, but browsers are
        // heavyweight; cap the pool regardless of configuration.
        for _ in 0..config.pool_size.clamp(1, 3) {
            let mut launch_options = LaunchOptions::default_builder()
                .headless(true)
                .sandbox(false) // Often needed in containerized environments
                .args(vec![
                    std::ffi::OsStr::new("--no-sandbox"),
                    std::ffi::OsStr::new("--disable-dev-shm-usage"),
                    std::ffi::OsStr::new("--disable-gpu"),
                    std::ffi::OsStr::new("--disable-extensions"),
                ])
                .build()
                .map_err(|e| AppError::Browser(format!("failed to create launch options: {e}")))?;

            if let Some(chrome_path) = &config.chrome_path {
                launch_options.path = Some(std::path::PathBuf::from(chrome_path));
            }

            let browser = Browser::new(launch_options)
                .map_err(|e| AppError::Browser(format!("failed to launch browser: {e}")))?;

            browsers.push(Arc::new(browser));
        }

        Ok(Self {
            browsers,
            current_index: AtomicUsize::new(0),
        })
    }

    pub fn get_browser(&self) -> Arc<Browser> {
        let index = self.current_index.fetch_add(1, Ordering::Relaxed) % self.browsers.len();
        self.browsers[index].clone()
    }
}

/// Production [`PageFetcher`] backed by a round-robin pool of headless
/// Chrome instances. Each call opens a fresh tab and closes it afterwards.
pub struct ChromeFetcher {
    pool: Arc<BrowserPool>,
    user_agent: String,
}

impl ChromeFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            pool: Arc::new(BrowserPool::new(config)?),
            user_agent: config.user_agent.clone(),
        })
    }
}

#[async_trait]
impl PageFetcher for ChromeFetcher {
    async fn fetch_page(&self, url: &str, timeout: Duration) -> Result<String> {
        let browser = self.pool.get_browser();
        let url = url.to_string();
        let user_agent = self.user_agent.clone();

        // Tab navigation in headless_chrome is blocking; keep it off the
        // async runtime.
        let load = tokio::task::spawn_blocking(move || -> Result<String> {
            let tab = browser
                .new_tab()
                .map_err(|e| AppError::Browser(format!("failed to open tab: {e}")))?;

            tab.set_default_timeout(timeout);
            tab.set_user_agent(&user_agent, None, None)
                .map_err(|e| AppError::Browser(format!("failed to set user agent: {e}")))?;

            tab.navigate_to(&url)
                .map_err(|e| AppError::Scraping(format!("navigation to {url} failed: {e}")))?;
            tab.wait_until_navigated()
                .map_err(|e| AppError::Scraping(format!("page load for {url} failed: {e}")))?;

            let html = tab
                .get_content()
                .map_err(|e| AppError::Scraping(format!("failed to read content of {url}: {e}")))?;

            // Close the tab to free renderer resources.
            let _ = tab.close(true);

            Ok(html)
        });

        match tokio::time::timeout(timeout, load).await {
            Ok(Ok(result)) => {
                if let Ok(html) = &result {
                    debug!(bytes = html.len(), "page loaded");
                }
                result
            }
            Ok(Err(join_err)) => Err(AppError::Browser(format!(
                "page load task failed: {join_err}"
            ))),
            Err(_) => Err(AppError::Scraping(format!(
                "page load timed out after {}s",
                timeout.as_secs()
            ))),
        }
    }
}
