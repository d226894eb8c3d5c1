use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub scraper: ScraperConfig,
    pub fetch: FetchConfig,
    pub cache: CacheConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub user_agent: String,
    pub chrome_path: Option<String>,
    pub pool_size: usize,
    pub load_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Sources selected per cache-miss query; a prefix of the registry.
    pub max_sources_per_query: usize,
    /// Cap on extracted listings per source per query.
    pub max_items_per_source: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Add environment-specific config
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Add local config (ignored by git)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix "SCOUT_"
            .add_source(Environment::with_prefix("SCOUT").separator("__"))
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        // Add Chrome path from environment if not set
        if config.scraper.chrome_path.is_none() {
            config.scraper.chrome_path = env::var("CHROME_PATH").ok();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message(
                "Server port must be greater than 0".into(),
            ));
        }

        if self.scraper.pool_size == 0 {
            return Err(ConfigError::Message(
                "Scraper pool_size must be greater than 0".into(),
            ));
        }

        if self.scraper.load_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "Scraper load_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.fetch.max_sources_per_query == 0 {
            return Err(ConfigError::Message(
                "Fetch max_sources_per_query must be greater than 0".into(),
            ));
        }

        if self.fetch.max_items_per_source == 0 {
            return Err(ConfigError::Message(
                "Fetch max_items_per_source must be greater than 0".into(),
            ));
        }

        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::Message(
                "Cache ttl_secs must be greater than 0".into(),
            ));
        }

        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(ConfigError::Message(
                "Metrics port must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}
