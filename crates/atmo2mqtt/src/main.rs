//! atmo2mqtt -- poll the vendor cloud API, republish telemetry over MQTT.

mod cli;
mod config;
mod error;
mod mqtt;

use std::error::Error as _;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser as _;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use atmo_api::{ApiClient, Credentials, TransportConfig};
use atmo_core::Poller;

use crate::cli::Cli;
use crate::error::BridgeError;
use crate::mqtt::MqttSink;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    init_tracing();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            let mut cause = e.source();
            while let Some(err) = cause {
                eprintln!("  because: {err}");
                cause = err.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Cli) -> Result<(), BridgeError> {
    let config = config::load(&args)?;

    // Credential validation is the fail-fast gate: no network activity
    // happens with an incomplete tuple.
    let credentials = Credentials::new(
        &config.client_id,
        &config.client_secret,
        &config.username,
        &config.password,
    )?;

    let transport = TransportConfig {
        timeout: Duration::from_secs(config.timeout_secs),
        ..TransportConfig::default()
    };
    let client = Arc::new(ApiClient::new(credentials, &transport)?);

    let mqtt_cancel = CancellationToken::new();
    let (sink, driver) = MqttSink::connect(&config, mqtt_cancel.clone())?;
    let sink = Arc::new(sink);
    sink.publish_availability(true).await?;

    let poller = Poller::new(client, Arc::clone(&sink))
        .with_interval(Duration::from_secs(config.interval_secs));
    let handle = poller.start_polling().await?;
    info!(
        mqtt_url = %config.mqtt_url,
        base_topic = %config.base_topic,
        "bridge running"
    );

    shutdown_signal().await;
    info!("shutting down");

    // Stop the schedule first so no record races the offline marker.
    handle.stop().await;
    if let Err(e) = sink.publish_availability(false).await {
        warn!(error = %e, "could not publish offline state");
    }
    if let Err(e) = sink.disconnect().await {
        warn!(error = %e, "mqtt disconnect failed");
    }
    mqtt_cancel.cancel();
    let _ = driver.await;

    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            warn!(error = %e, "SIGTERM handler unavailable; ctrl-c only");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
