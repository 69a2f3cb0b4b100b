//! Outbox Relay - outbox 事件中继入口

use std::sync::Arc;

use bootstrap::{init_database, init_runtime, outbox, shutdown_signal};
use config::AppConfig;
use outbox_relay::{LogSink, OutboxPublisher, OutboxPublisherConfig};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load("config")?;
    init_runtime(&config)?;

    let pool = init_database(&config.database).await?;

    let publisher = Arc::new(OutboxPublisher::new(
        Arc::new(outbox(pool.clone(), &config.outbox)),
        Arc::new(LogSink),
        OutboxPublisherConfig::try_from(&config.outbox)?,
    ));

    let shutdown = CancellationToken::new();
    let handle = publisher.start(shutdown.clone());

    shutdown_signal().await;
    shutdown.cancel();
    handle.await?;

    pool.close().await;
    info!("Outbox relay stopped");

    Ok(())
}
