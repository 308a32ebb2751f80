//! MQTT publish sink.
//!
//! Each record is published, retained, to `{base_topic}/{id}`; bridge
//! liveness is tracked on `{base_topic}/bridge/availability` with a last
//! will so the broker flips it to `offline` if the process dies without
//! saying goodbye.

use std::time::Duration;

use rumqttc::v5::mqttbytes::QoS;
use rumqttc::v5::mqttbytes::v5::{LastWill, Packet};
use rumqttc::v5::{AsyncClient, Event, MqttOptions};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use atmo_core::{CoreError, Frame, FrameSink};

use crate::config::Config;
use crate::error::BridgeError;

const CHANNEL_CAPACITY: usize = 64;

pub struct MqttSink {
    client: AsyncClient,
    base_topic: String,
}

impl MqttSink {
    /// Build the client and spawn the event-loop driver task.
    ///
    /// The driver owns the broker connection (rumqttc reconnects on the
    /// next poll after an error) and runs until the token is cancelled.
    pub fn connect(
        config: &Config,
        cancel: CancellationToken,
    ) -> Result<(Self, JoinHandle<()>), BridgeError> {
        let mut options =
            MqttOptions::parse_url(&config.mqtt_url).map_err(BridgeError::ParseMqttUrl)?;
        if let (Some(user), Some(password)) = (&config.mqtt_user, &config.mqtt_password) {
            options.set_credentials(user, password);
        }

        options.set_last_will(LastWill::new(
            availability_topic(&config.base_topic),
            "offline",
            QoS::AtLeastOnce,
            true,
            None,
        ));

        let (client, mut eventloop) = AsyncClient::new(options, CHANNEL_CAPACITY);

        let driver = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    event = eventloop.poll() => match event {
                        Ok(Event::Incoming(Packet::ConnAck(_))) => {
                            debug!("connected to MQTT broker");
                        }
                        Ok(event) => trace!(?event, "mqtt event"),
                        Err(e) => {
                            warn!(error = %e, "mqtt connection error; reconnecting");
                            tokio::time::sleep(Duration::from_secs(1)).await;
                        }
                    },
                }
            }
            debug!("mqtt driver stopped");
        });

        Ok((
            Self {
                client,
                base_topic: config.base_topic.clone(),
            },
            driver,
        ))
    }

    /// Mark the bridge online/offline on the availability topic.
    pub async fn publish_availability(&self, online: bool) -> Result<(), BridgeError> {
        let payload = if online { "online" } else { "offline" };
        self.client
            .publish(
                availability_topic(&self.base_topic),
                QoS::AtLeastOnce,
                true,
                payload,
            )
            .await
            .map_err(BridgeError::Mqtt)
    }

    pub async fn disconnect(&self) -> Result<(), BridgeError> {
        self.client.disconnect().await.map_err(BridgeError::Mqtt)
    }
}

impl FrameSink for MqttSink {
    async fn emit(&self, frame: Frame) -> Result<(), CoreError> {
        let topic = match frame.id() {
            Some(id) => format!("{}/{id}", self.base_topic),
            None => return Err(CoreError::publish("record has no id")),
        };
        let payload = serde_json::to_vec(&frame).map_err(CoreError::publish)?;

        debug!(topic, "publishing record");
        self.client
            .publish(topic, QoS::AtLeastOnce, true, payload)
            .await
            .map_err(CoreError::publish)
    }
}

fn availability_topic(base_topic: &str) -> String {
    format!("{base_topic}/bridge/availability")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_topic_is_scoped_under_base() {
        assert_eq!(availability_topic("atmo"), "atmo/bridge/availability");
    }
}
