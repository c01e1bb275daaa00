//! Input sources feeding device notifications into the bridge.

pub mod mqtt;
