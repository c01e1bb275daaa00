//! Hue Remote Bridge library.
//!
//! Adapts Philips/Signify Hue Zigbee remotes and sensors: patched cluster
//! schemas, the bind-time Philips configuration write, and multi-press
//! detection for dimmer remote buttons, exposed over MQTT.

pub mod config;
pub mod error;
pub mod hue;
pub mod input;
