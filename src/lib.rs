pub mod api;
pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod db;
pub mod entities;
pub mod models;
pub mod security;
pub mod services;
pub mod state;

use std::sync::Arc;
use tokio::signal;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use clients::storage::ensure_bucket_with_retry;
pub use config::Config;
use db::Store;
use metrics_exporter_prometheus::PrometheusHandle;
use state::SharedState;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

pub async fn run(config: Config) -> anyhow::Result<()> {
    config.validate()?;

    let cli = Cli::parse();

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        Some(handle)
    } else {
        None
    };

    init_tracing(&config)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(config, prometheus_handle).await,

        Commands::Init => {
            if Config::create_default_if_missing()? {
                println!("✓ Config file created. Edit config.toml and run again.");
            } else {
                println!("Config file already exists, nothing to do.");
            }
            Ok(())
        }

        Commands::Migrate => {
            let store = Store::with_pool_options(
                &config.general.database_url,
                config.general.max_db_connections,
                config.general.min_db_connections,
            )
            .await?;
            store.seed_catalogs().await?;
            println!("✓ Database migrated and catalogs seeded.");
            Ok(())
        }

        Commands::CheckConfig => {
            println!("{}", toml::to_string_pretty(&config.redacted())?);
            Ok(())
        }
    }
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer());

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let mut builder = tracing_loki::builder();
        for (key, value) in &config.observability.loki_labels {
            builder = builder.label(key.as_str(), value.as_str())?;
        }
        let (layer, task) = builder.build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    Ok(())
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<()> {
    info!(
        "userservice v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let port = config.server.port;
    let shared = Arc::new(SharedState::new(config).await?);

    // Object storage may come up after us; uploads fail until it does.
    let objects = shared.objects.clone();
    tokio::spawn(async move {
        if !ensure_bucket_with_retry(objects.as_ref()).await {
            warn!("Object storage bucket could not be ensured; photo uploads will fail");
        }
    });

    if !shared.notifications.is_enabled() {
        warn!("Notification service URL not set; reset tokens will not be delivered");
    }

    let app = api::router(api::create_app_state(shared, prometheus_handle));

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}
