use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use price_scout::config::AppConfig;
use price_scout::orchestrator::Orchestrator;
use price_scout::registry::SourceRegistry;
use price_scout::scraper::ChromeFetcher;
use price_scout::web::{create_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "price-scout", version, about = "Grocery price aggregation service")]
struct Cli {
    /// Override the configured listen port.
    #[arg(long)]
    port: Option<u16>,

    /// Load and validate configuration, then exit.
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("price_scout=debug".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if cli.check_config {
        info!("Configuration OK");
        return Ok(());
    }

    info!("Starting Price Scout...");

    if config.metrics.enabled {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.metrics.port));
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
        info!(port = config.metrics.port, "Prometheus exporter listening");
    }

    let registry = SourceRegistry::builtin();
    info!(sources = registry.len(), "source registry loaded");

    let fetcher = Arc::new(ChromeFetcher::new(&config.scraper)?);
    let orchestrator = Arc::new(Orchestrator::new(registry, fetcher, &config));

    let router = create_router(AppState { orchestrator });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
