//! MQTT Integration orchestrator for Hue remotes.
//!
//! Routes raw `notification` frames received over MQTT to one
//! [`RemoteEventDispatcher`] per remote and publishes the resulting device
//! events back to the broker.
//!
//! ## Topics
//! - `{base}/{remote}/notification` - inbound frames, JSON
//!   `{"tsn": 12, "command_id": 0, "args": [1, 0, 0, 0, 0, 0]}` or with the
//!   raw ZCL payload as hex, `"payload": "0100000000000000"` (a byte array
//!   is accepted too)
//! - `{base}/{remote}/action` - outbound events, JSON
//! - `{base}/{remote}/triggers` - retained trigger table, JSON

use super::client::{BrokerSession, MqttClient, MqttMessage};
use crate::config::{Config, MqttConfig, RemotesConfig};
use crate::error::{HueError, Result};
use crate::hue::{
    ChannelListener, EmittedEvent, NotificationArgs, RemoteEventDispatcher, ZclHeader,
    device_triggers,
};
use log::{debug, info, warn};
use rumqttc::{AsyncClient, QoS};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Topic carrying raw notification frames for a remote.
pub fn notification_topic(base_topic: &str, friendly_name: &str) -> String {
    format!("{}/{}/notification", base_topic, friendly_name)
}

/// Topic the bridge publishes a remote's events to.
pub fn action_topic(base_topic: &str, friendly_name: &str) -> String {
    format!("{}/{}/action", base_topic, friendly_name)
}

/// Retained topic describing the triggers a remote supports.
pub fn triggers_topic(base_topic: &str, friendly_name: &str) -> String {
    format!("{}/{}/triggers", base_topic, friendly_name)
}

/// Inbound notification frame.
#[derive(Debug, Deserialize)]
pub struct NotificationMessage {
    #[serde(default)]
    pub tsn: u8,
    #[serde(default)]
    pub command_id: u8,
    /// Positional arguments
    #[serde(default)]
    pub args: Option<Vec<u32>>,
    /// Raw ZCL payload
    #[serde(default)]
    pub payload: Option<RawPayload>,
}

/// Raw ZCL payload of a notification frame.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawPayload {
    Hex(String),
    Bytes(Vec<u8>),
}

impl RawPayload {
    pub fn decode(&self) -> Result<NotificationArgs> {
        match self {
            RawPayload::Hex(hex) => NotificationArgs::from_hex(hex),
            RawPayload::Bytes(bytes) => NotificationArgs::from_bytes(bytes),
        }
    }
}

impl NotificationMessage {
    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Header and arguments; positional `args` win over a raw `payload`.
    pub fn decode(&self) -> Result<(ZclHeader, NotificationArgs)> {
        let header = ZclHeader::new(self.tsn, self.command_id);
        let args = match (&self.args, &self.payload) {
            (Some(args), _) => NotificationArgs::from_slice(args)?,
            (None, Some(payload)) => payload.decode()?,
            (None, None) => return Err(HueError::ArgumentCount(0)),
        };
        Ok((header, args))
    }
}

/// One bridged remote with its own dispatcher.
pub struct HueRemote {
    friendly_name: String,
    notification_topic: String,
    dispatcher: RemoteEventDispatcher,
}

impl HueRemote {
    pub fn new(
        friendly_name: impl Into<String>,
        base_topic: &str,
        debounce: Duration,
        events: mpsc::UnboundedSender<EmittedEvent>,
    ) -> Self {
        let friendly_name = friendly_name.into();
        let listener = ChannelListener::new(friendly_name.clone(), events);
        Self {
            notification_topic: notification_topic(base_topic, &friendly_name),
            dispatcher: RemoteEventDispatcher::with_threshold(Arc::new(listener), debounce),
            friendly_name,
        }
    }

    pub fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    pub fn notification_topic(&self) -> &str {
        &self.notification_topic
    }

    /// Process a message and feed it to the dispatcher if applicable.
    /// Returns true if the message was for this remote.
    pub fn process_message(&self, topic: &str, payload: &str) -> bool {
        if topic != self.notification_topic {
            return false;
        }

        match NotificationMessage::parse(payload).and_then(|msg| msg.decode()) {
            Ok((header, args)) => {
                self.dispatcher.handle_cluster_request(&header, &args);
            }
            Err(e) => {
                warn!(
                    "[MQTT] Dropping malformed notification for {}: {}",
                    self.friendly_name, e
                );
            }
        }
        true
    }
}

/// Per-session broker setup for the bridged remotes.
///
/// The broker forgets subscriptions whenever the client reconnects with a
/// clean session, so the notification topics are subscribed again (and the
/// trigger tables republished) for every session counted by `sessions`.
pub struct SessionSetup {
    subscriptions: Vec<String>,
    retained: Vec<(String, Vec<u8>)>,
}

impl SessionSetup {
    pub fn new(base_topic: &str, friendly_names: &[String]) -> Result<Self> {
        let triggers = serde_json::to_vec(&device_triggers())?;
        Ok(Self {
            subscriptions: friendly_names
                .iter()
                .map(|name| notification_topic(base_topic, name))
                .collect(),
            retained: friendly_names
                .iter()
                .map(|name| (triggers_topic(base_topic, name), triggers.clone()))
                .collect(),
        })
    }

    /// Issue all subscriptions and retained publishes once.
    pub async fn apply(&self, session: &impl BrokerSession) {
        for topic in &self.subscriptions {
            if let Err(e) = session.subscribe_topic(topic).await {
                warn!("[MQTT] Failed to subscribe to {}: {}", topic, e);
            }
        }
        for (topic, payload) in &self.retained {
            if let Err(e) = session.publish_retained(topic, payload.clone()).await {
                warn!("[MQTT] Failed to publish {}: {}", topic, e);
            }
        }
    }

    /// Apply the setup for the current session and again after every
    /// reconnect, until the session counter is dropped.
    pub async fn maintain(
        &self,
        session: &impl BrokerSession,
        mut sessions: watch::Receiver<u64>,
    ) {
        loop {
            let current = *sessions.borrow_and_update();
            if current > 0 {
                self.apply(session).await;
                info!(
                    "[MQTT] Subscribed {} topic(s) for session {}",
                    self.subscriptions.len(),
                    current
                );
            }
            if sessions.changed().await.is_err() {
                break;
            }
        }
    }
}

/// MQTT Integration orchestrator.
///
/// Manages the MQTT client, remote subscriptions and event publishing,
/// keeping MQTT internals out of main.rs.
pub struct MqttIntegration {
    config: MqttConfig,
    remotes: RemotesConfig,
}

impl MqttIntegration {
    pub fn new(config: Config) -> Self {
        Self {
            config: config.mqtt,
            remotes: config.remotes,
        }
    }

    /// Start the MQTT integration.
    ///
    /// Spawns a background task that connects to the broker, subscribes to
    /// remote topics, and routes messages to the appropriate handlers.
    /// Returns a JoinHandle that can be used to abort the task on shutdown.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(self) {
        if self.remotes.friendly_names.is_empty() {
            info!("[MQTT] No remotes configured, skipping MQTT integration");
            return;
        }

        info!(
            "[MQTT] Connecting to {}:{}",
            self.config.broker_host, self.config.broker_port
        );

        let setup =
            match SessionSetup::new(&self.config.base_topic, &self.remotes.friendly_names) {
                Ok(setup) => setup,
                Err(e) => {
                    warn!("[MQTT] Failed to prepare trigger tables: {}", e);
                    return;
                }
            };

        let mqtt_client = MqttClient::new(&self.config);
        let client = mqtt_client.client();

        let (msg_tx, mut msg_rx) = mpsc::channel::<MqttMessage>(64);
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<EmittedEvent>();
        let (sessions_tx, mut sessions_rx) = watch::channel(0u64);

        // Start MQTT event loop FIRST (so it can establish connection)
        let mqtt_loop = tokio::spawn(async move {
            mqtt_client.run(msg_tx, sessions_tx).await;
        });

        let connected = tokio::time::timeout(
            Duration::from_secs(10),
            sessions_rx.wait_for(|count| *count > 0),
        )
        .await
        .map(|signal| signal.map(|_| ()));
        match connected {
            Ok(Ok(())) => {
                info!("[MQTT] Connection established, subscribing to topics");
            }
            Ok(Err(_)) => {
                warn!("[MQTT] Connection signal channel dropped");
                return;
            }
            Err(_) => {
                warn!("[MQTT] Connection timeout after 10 seconds");
                mqtt_loop.abort();
                return;
            }
        }

        let remotes: Vec<HueRemote> = self
            .remotes
            .friendly_names
            .iter()
            .map(|name| {
                HueRemote::new(
                    name.as_str(),
                    &self.config.base_topic,
                    self.remotes.debounce(),
                    event_tx.clone(),
                )
            })
            .collect();

        let session_client = client.clone();
        let session_task = tokio::spawn(async move {
            setup.maintain(&session_client, sessions_rx).await;
        });

        info!(
            "[MQTT] Integration started with {} Hue remote(s)",
            remotes.len()
        );

        loop {
            tokio::select! {
                msg = msg_rx.recv() => {
                    let Some(msg) = msg else { break };
                    if !remotes.iter().any(|r| r.process_message(&msg.topic, &msg.payload)) {
                        debug!("[MQTT] Ignoring message on {}", msg.topic);
                    }
                }
                Some(event) = event_rx.recv() => {
                    if let Err(e) = publish_event(&client, &self.config.base_topic, &event).await {
                        warn!("[MQTT] Failed to publish {} event: {}", event.source, e);
                    }
                }
            }
        }

        session_task.abort();
        mqtt_loop.abort();
    }
}

async fn publish_event(
    client: &AsyncClient,
    base_topic: &str,
    event: &EmittedEvent,
) -> Result<()> {
    let topic = action_topic(base_topic, &event.source);
    let payload = serde_json::to_string(event)?;

    info!("[MQTT] {} action: {}", event.source, event.action);
    client
        .publish(topic, QoS::AtMostOnce, false, payload.into_bytes())
        .await?;
    Ok(())
}
