//! Clap derive structures for the `atmo2mqtt` binary.
//!
//! Flags override the layered configuration (defaults < TOML file <
//! `ATMO2MQTT_*` environment < flags); see `config.rs`.

use std::path::PathBuf;

use clap::Parser;

/// atmo2mqtt -- poll the vendor cloud API and republish device telemetry
/// over MQTT
#[derive(Debug, Parser)]
#[command(
    name = "atmo2mqtt",
    version,
    about = "Bridge weather and air-quality telemetry to MQTT",
    long_about = "Polls the vendor cloud API on a fixed interval, flattens each \
        device's telemetry into a single record, and publishes it to an MQTT \
        broker under a per-device topic."
)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, short = 'c', env = "ATMO2MQTT_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// OAuth2 client id
    #[arg(long, value_name = "ID")]
    pub client_id: Option<String>,

    /// OAuth2 client secret
    #[arg(long, value_name = "SECRET")]
    pub client_secret: Option<String>,

    /// Vendor account username
    #[arg(long, value_name = "USER")]
    pub username: Option<String>,

    /// Vendor account password
    #[arg(long, value_name = "PASS")]
    pub password: Option<String>,

    /// MQTT broker URL, e.g. `mqtt://localhost:1883?client_id=atmo2mqtt`
    /// or `mqtts://...` for TLS
    #[arg(long, short = 'm', value_name = "URL")]
    pub mqtt_url: Option<String>,

    /// MQTT username (together with --mqtt-password)
    #[arg(long, requires = "mqtt_password")]
    pub mqtt_user: Option<String>,

    /// MQTT password (together with --mqtt-user)
    #[arg(long, requires = "mqtt_user")]
    pub mqtt_password: Option<String>,

    /// Topic prefix records are published under
    #[arg(long, value_name = "TOPIC")]
    pub base_topic: Option<String>,

    /// Seconds between polling passes
    #[arg(long, value_name = "SECS")]
    pub interval_secs: Option<u64>,

    /// Per-request HTTP timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}
