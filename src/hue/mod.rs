//! Philips/Signify Hue device support.
//!
//! Cluster patches, trigger tables and the multi-press aware remote handler
//! for Hue dimmer remotes and motion sensors.

pub mod clusters;
pub mod codes;
pub mod debounce;
pub mod events;
pub mod notification;
pub mod remote;
pub mod triggers;

pub use clusters::{PhilipsBasicCluster, PhilipsOccupancySensing, ZclTransport};
pub use codes::{ButtonCode, HueButton, MultiPress, PressLabel, PressType, PressTypeCode};
pub use debounce::PressDebouncer;
pub use events::{ChannelListener, EmittedEvent, EventKind, EventListener, RemoteEvent};
pub use notification::{NotificationArgs, ZclHeader};
pub use remote::RemoteEventDispatcher;
pub use triggers::{DeviceTrigger, TriggerKind, TriggerSubtype, device_triggers};
