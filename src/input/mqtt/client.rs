//! MQTT client wrapper for zigbee2mqtt communication.

use crate::config::MqttConfig;
use crate::error::Result;
use async_trait::async_trait;
use log::{debug, error, info, warn};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Message received from MQTT broker.
#[derive(Debug, Clone)]
pub struct MqttMessage {
    pub topic: String,
    pub payload: String,
}

/// MQTT client for zigbee2mqtt communication.
pub struct MqttClient {
    client: AsyncClient,
    event_loop: EventLoop,
}

impl MqttClient {
    /// Create a new MQTT client from configuration.
    pub fn new(config: &MqttConfig) -> Self {
        let mut options =
            MqttOptions::new(&config.client_id, &config.broker_host, config.broker_port);
        options.set_keep_alive(Duration::from_secs(30));

        // Set credentials if provided
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(options, 100);

        Self { client, event_loop }
    }

    /// Run the MQTT event loop and forward messages to the provided channel.
    ///
    /// `sessions` counts ConnAcks: it is bumped on every (re)connect, since
    /// the broker drops subscriptions with the clean session. Runs until the
    /// message channel is closed; connection errors are retried after a
    /// back-off.
    pub async fn run(mut self, tx: mpsc::Sender<MqttMessage>, sessions: watch::Sender<u64>) {
        info!("Starting MQTT event loop");

        loop {
            match self.event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    sessions.send_modify(|count| *count += 1);
                    info!("[MQTT] Connected to broker (session {})", *sessions.borrow());
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let topic = publish.topic.clone();
                    let payload = match String::from_utf8(publish.payload.to_vec()) {
                        Ok(s) => s,
                        Err(e) => {
                            warn!("Invalid UTF-8 in MQTT payload: {}", e);
                            continue;
                        }
                    };

                    debug!("Received MQTT message on {}: {}", topic, payload);

                    let msg = MqttMessage { topic, payload };
                    if tx.send(msg).await.is_err() {
                        error!("MQTT message channel closed");
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    error!("MQTT connection error: {:?}", e);
                    // Wait before reconnecting
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    }

    /// Get a clone of the async client for publishing from other tasks.
    pub fn client(&self) -> AsyncClient {
        self.client.clone()
    }
}

/// Requests issued to the broker whenever a session is (re)established.
#[async_trait]
pub trait BrokerSession: Send + Sync {
    async fn subscribe_topic(&self, topic: &str) -> Result<()>;

    async fn publish_retained(&self, topic: &str, payload: Vec<u8>) -> Result<()>;
}

#[async_trait]
impl BrokerSession for AsyncClient {
    async fn subscribe_topic(&self, topic: &str) -> Result<()> {
        self.subscribe(topic, QoS::AtMostOnce).await?;
        Ok(())
    }

    async fn publish_retained(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        self.publish(topic, QoS::AtLeastOnce, true, payload).await?;
        Ok(())
    }
}
