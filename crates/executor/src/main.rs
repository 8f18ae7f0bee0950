use std::{env, sync::Arc};

use anyhow::Context;
use dotenvy::dotenv;
use tracing::{debug, error, info};

use common::config::{Config, ENV_CONFIG_PATH};
use common::{EXCHANGE_SYMBOL, logger};
use exchange::BinanceFuturesClient;
use signal::{QuantityMapper, SignalParser};

use crate::remote::RedisSignalSource;
use crate::services::execution_service::TradeExecutor;
use crate::services::listener_service::SignalListener;
use crate::services::signal_pipeline::SignalPipeline;

mod remote;
mod services;
mod traits;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config_path = env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| "config.toml".to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path))?;

    logger::setup_logger(&config.log_level);
    debug!("System starting up...");
    info!(
        "Config loaded from {}: channel={} leverage={}x levels={}",
        config_path,
        config.redis.channel,
        config.binance.leverage,
        config.quantity_mapping.len()
    );

    let client =
        BinanceFuturesClient::new(&config.binance).context("Failed to build Binance client")?;
    let executor = TradeExecutor::new(
        Arc::new(client),
        EXCHANGE_SYMBOL,
        config.binance.order_timeout(),
    );
    executor.prepare(config.binance.leverage).await;

    let parser = SignalParser::new(QuantityMapper::new(config.quantity_mapping.clone()));
    let pipeline = SignalPipeline::new(parser, executor);

    let source = RedisSignalSource::new(&config.redis).context("Invalid Redis settings")?;
    let listener = SignalListener::new(
        source,
        config.redis.channel.clone(),
        pipeline,
        &config.listener,
    );

    info!("Press Ctrl+C to stop the service");
    listener.run(shutdown_signal()).await?;

    info!("Service stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl-C received"),
        _ = terminate => info!("SIGTERM received"),
    }
}
