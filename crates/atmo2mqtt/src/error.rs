use thiserror::Error;

/// Failures that end the bridge process.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("could not load configuration")]
    Config(#[source] figment::Error),

    #[error("vendor API error")]
    Api(#[from] atmo_api::Error),

    #[error("bridge core error")]
    Core(#[from] atmo_core::CoreError),

    #[error("could not parse the MQTT broker URL")]
    ParseMqttUrl(#[source] rumqttc::v5::OptionError),

    #[error("could not publish to the MQTT broker")]
    Mqtt(#[source] rumqttc::v5::ClientError),
}
