pub mod cache;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod orchestrator;
pub mod pricing;
pub mod registry;
pub mod sample;
pub mod scraper;
pub mod utils;
pub mod web;

// Re-export commonly used types
pub use config::AppConfig;
pub use orchestrator::{Orchestrator, QueryResult};
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
