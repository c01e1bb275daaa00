//! MQTT input source for Hue remotes.
//!
//! This module provides MQTT client functionality to receive raw remote
//! notifications from the broker and publish the resulting device events.

mod client;
mod integration;

pub use client::{BrokerSession, MqttClient, MqttMessage};
pub use integration::{
    HueRemote, MqttIntegration, NotificationMessage, RawPayload, SessionSetup, action_topic,
    notification_topic, triggers_topic,
};
