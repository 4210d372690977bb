mod cli;

use crate::cli::{CacheBackendArg, StorageBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use jiff::Timestamp;
use snowlink_cache::{MokaUrlCache, RedisUrlCache};
use snowlink_core::{ReadRepository, Repository, UrlCache};
use snowlink_flake::{Snowflake, SnowflakeSettings};
use snowlink_gateway::state::{DynRedirector, DynShortener};
use snowlink_gateway::{App, AppState};
use snowlink_generator::Generator;
use snowlink_redirector::RedirectorService;
use snowlink_shortener::{ShortenerService, ShortenerSettings};
use snowlink_storage::{InMemoryRepository, MySqlRepository};
use snowlink_telemetry::TelemetryConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// The same store behind its write and read-only interfaces.
struct Store {
    repository: Arc<dyn Repository>,
    reader: Arc<dyn ReadRepository>,
}

impl Store {
    fn new<S: Repository>(store: S) -> Self {
        let store = Arc::new(store);
        Self {
            repository: store.clone(),
            reader: store,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::try_parse()?;

    let _telemetry = snowlink_telemetry::init(
        TelemetryConfig::builder()
            .service_name("snowlink-gateway")
            .format(config.log_format)
            .otlp_endpoint(config.otlp_endpoint.clone())
            .build(),
    )?;

    info!(
        listen_addr = %config.listen_addr,
        node_id = config.node_id,
        storage_backend = %config.storage,
        cache_backend = %config.cache,
        "starting gateway server"
    );

    let generator = build_generator(&config)?;
    let store = build_store(&config).await?;
    let cache = build_cache(&config).await?;

    let settings = ShortenerSettings::builder()
        .base_url(config.base_url.clone())
        .ttl(Duration::from_secs(config.ttl_secs))
        .build();
    settings
        .expire_at(Timestamp::now())
        .with_context(|| format!("invalid mapping lifetime of {}s", config.ttl_secs))?;
    let shortener: Arc<DynShortener> = Arc::new(ShortenerService::new(
        store.repository.clone(),
        generator,
        settings,
    ));
    let redirector: Arc<DynRedirector> =
        Arc::new(RedirectorService::new(store.reader.clone(), cache.clone()));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, App::router(AppState::new(shortener, redirector)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("closing cache and store");
    cache.close().await;
    store.reader.close().await;
    info!("gateway stopped");

    Ok(())
}

fn build_generator(config: &CLI) -> anyhow::Result<Arc<dyn Generator>> {
    let start_epoch = Timestamp::from_millisecond(config.epoch_ms)
        .with_context(|| format!("invalid epoch {}", config.epoch_ms))?;
    let settings = SnowflakeSettings::builder()
        .node_id(config.node_id)
        .start_epoch(start_epoch)
        .build();
    let snowflake = Snowflake::new(settings).context("failed to create snowflake generator")?;
    Ok(Arc::new(snowflake))
}

async fn build_store(config: &CLI) -> anyhow::Result<Store> {
    match config.storage {
        StorageBackendArg::InMemory => Ok(Store::new(InMemoryRepository::new())),
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect(mysql_dsn).await?;
            repository.ensure_schema().await?;
            Ok(Store::new(repository))
        }
    }
}

async fn build_cache(config: &CLI) -> anyhow::Result<Arc<dyn UrlCache>> {
    match config.cache {
        CacheBackendArg::Moka => Ok(Arc::new(MokaUrlCache::with_capacity(
            config.cache_capacity,
        ))),
        CacheBackendArg::Redis => {
            let redis_url = config
                .redis_url
                .as_deref()
                .context("redis url is required when cache backend is redis")?;
            Ok(Arc::new(RedisUrlCache::connect(redis_url).await?))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
