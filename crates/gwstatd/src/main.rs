//! gwstatd - gateway connectivity telemetry bridge
//!
//! Subscribes to the network server's event stream, keeps the latest
//! connection statistics per gateway in memory, and serves them as
//! Prometheus gauges on `/metrics`.
//!
//! Configuration comes from the environment; see `config.rs`.

mod config;

use std::sync::Arc;

use anyhow::Context;
use gwstat_client::{EventsClient, ReconnectingConsumer};
use gwstat_core::{GatewayStateStore, Reporter, StatsEvent};
use gwstat_metrics::{create_router, install_recorder, PrometheusSink};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;

/// Capacity of the consumer → reporter handoff channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gwstatd=info,gwstat_client=info,gwstat_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting gwstatd (gateway connectivity telemetry bridge)");

    let config = Config::from_env()?;

    let client = Arc::new(
        EventsClient::new(&config.server, &config.api_key)
            .context("building events client")?,
    );

    // A fixed subscription set for the process lifetime: either the
    // configured list or a one-shot discovery call.
    let gateway_ids = if config.gateway_ids.is_empty() {
        tracing::info!(server = %config.server, "no gateway list configured, discovering");
        client
            .list_gateways()
            .await
            .context("listing gateways")?
    } else {
        config.gateway_ids.clone()
    };
    tracing::info!(gateways = gateway_ids.len(), "subscribing to event stream");

    let handle = install_recorder().context("installing metrics recorder")?;
    let store = GatewayStateStore::new();

    let (tx, rx) = mpsc::channel::<StatsEvent>(EVENT_CHANNEL_CAPACITY);

    let consumer = ReconnectingConsumer::new(client, gateway_ids);
    let mut consumer_task = tokio::spawn(consumer.run(tx));

    let reporter = Reporter::new(store.clone(), Arc::new(PrometheusSink::new()));
    let reporter_task = tokio::spawn(reporter.run(rx));

    let app = create_router(handle, store);
    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("binding {}", config.listen))?;
    tracing::info!("metrics listening on http://{}", config.listen);

    let result = tokio::select! {
        res = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()) => {
            // Shutdown path: stop the consumer and join it before exit
            consumer_task.abort();
            let _ = (&mut consumer_task).await;
            res.context("metrics server failed")
        }
        res = &mut consumer_task => {
            // The consumer only returns on fatal failure; stale gauges
            // must not keep being scraped as if they were live.
            match res {
                Ok(Ok(())) => Err(anyhow::anyhow!("event consumer stopped unexpectedly")),
                Ok(Err(e)) => Err(anyhow::Error::new(e).context("event consumer failed")),
                Err(e) => Err(anyhow::Error::new(e).context("event consumer panicked")),
            }
        }
    };

    // The consumer's channel handle closed with it, which ends the
    // reporter once it has drained the remaining events.
    let _ = reporter_task.await;

    tracing::info!("gwstatd stopped");
    result
}

/// Resolves on ctrl-c, triggering graceful shutdown
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
