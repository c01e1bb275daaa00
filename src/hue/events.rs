//! Outbound device events.
//!
//! The remote handler reports semantic actions through an [`EventListener`].
//! [`ChannelListener`] forwards them to a tokio channel so they can be
//! consumed outside the debounce timer (e.g. published to MQTT).

use super::codes::{ButtonCode, MultiPress, PressLabel};
use log::warn;
use serde::Serialize;
use strum::{Display, IntoStaticStr};
use tokio::sync::mpsc;

/// Kind marker passed along with every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr, Serialize)]
pub enum EventKind {
    /// Device automation trigger (`zha_send_event`)
    #[strum(serialize = "zha_send_event")]
    #[serde(rename = "zha_send_event")]
    SendEvent,
}

/// Payload of a remote button event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteEvent {
    pub button: ButtonCode,
    /// Decoded press type, or the multi-press label for settled bursts
    pub press_type: PressLabel,
    pub command_id: u8,
    pub args: Vec<u32>,
}

/// Receives events emitted by a device handler.
pub trait EventListener: Send + Sync {
    fn listener_event(&self, kind: EventKind, action: &str, payload: &RemoteEvent);
}

/// An event as delivered through a [`ChannelListener`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmittedEvent {
    /// Friendly name of the device that emitted the event
    #[serde(skip)]
    pub source: String,
    pub kind: EventKind,
    pub action: String,
    #[serde(flatten)]
    pub payload: RemoteEvent,
}

/// Forwards events into an unbounded tokio channel.
#[derive(Clone)]
pub struct ChannelListener {
    source: String,
    tx: mpsc::UnboundedSender<EmittedEvent>,
}

impl ChannelListener {
    pub fn new(source: impl Into<String>, tx: mpsc::UnboundedSender<EmittedEvent>) -> Self {
        Self {
            source: source.into(),
            tx,
        }
    }

    /// Create a listener together with the receiving end.
    pub fn channel(
        source: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<EmittedEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(source, tx), rx)
    }
}

impl EventListener for ChannelListener {
    fn listener_event(&self, kind: EventKind, action: &str, payload: &RemoteEvent) {
        let event = EmittedEvent {
            source: self.source.clone(),
            kind,
            action: action.to_string(),
            payload: payload.clone(),
        };
        if self.tx.send(event).is_err() {
            warn!("[Hue] {} event channel closed, dropping {}", self.source, action);
        }
    }
}
