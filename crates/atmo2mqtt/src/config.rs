//! Layered runtime configuration.
//!
//! Resolution order: built-in defaults < TOML file < `ATMO2MQTT_*`
//! environment variables < CLI flags. Credential completeness is enforced
//! by `Credentials::new` before any network activity, so a broken config
//! fails at startup rather than at poll time.

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::error::BridgeError;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub mqtt_url: String,
    pub mqtt_user: Option<String>,
    pub mqtt_password: Option<String>,
    pub base_topic: String,
    pub interval_secs: u64,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            username: String::new(),
            password: String::new(),
            mqtt_url: "mqtt://localhost:1883?client_id=atmo2mqtt".into(),
            mqtt_user: None,
            mqtt_password: None,
            base_topic: "atmo".into(),
            interval_secs: 60,
            timeout_secs: 10,
        }
    }
}

/// Resolve the effective configuration for this invocation.
pub fn load(cli: &Cli) -> Result<Config, BridgeError> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));
    if let Some(ref path) = cli.config {
        figment = figment.merge(Toml::file(path));
    }
    figment = figment.merge(Env::prefixed("ATMO2MQTT_"));

    let mut config: Config = figment.extract().map_err(BridgeError::Config)?;
    apply_cli_overrides(&mut config, cli);
    Ok(config)
}

fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(ref v) = cli.client_id {
        config.client_id.clone_from(v);
    }
    if let Some(ref v) = cli.client_secret {
        config.client_secret.clone_from(v);
    }
    if let Some(ref v) = cli.username {
        config.username.clone_from(v);
    }
    if let Some(ref v) = cli.password {
        config.password.clone_from(v);
    }
    if let Some(ref v) = cli.mqtt_url {
        config.mqtt_url.clone_from(v);
    }
    if cli.mqtt_user.is_some() {
        config.mqtt_user.clone_from(&cli.mqtt_user);
    }
    if cli.mqtt_password.is_some() {
        config.mqtt_password.clone_from(&cli.mqtt_password);
    }
    if let Some(ref v) = cli.base_topic {
        config.base_topic.clone_from(v);
    }
    if let Some(v) = cli.interval_secs {
        config.interval_secs = v;
    }
    if let Some(v) = cli.timeout_secs {
        config.timeout_secs = v;
    }
}
