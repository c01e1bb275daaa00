//! Device automation triggers for the Hue dimmer remote.
//!
//! Maps `(trigger kind, subtype)` pairs, as presented to automation UIs, to the
//! action strings emitted by [`RemoteEventDispatcher`](super::RemoteEventDispatcher).

use super::codes::{HueButton, MultiPress, PressType};
use serde::{Serialize, Serializer};
use std::fmt::Display as FmtDisplay;
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

/// What happened to the button.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum TriggerKind {
    #[strum(serialize = "remote_button_short_press")]
    ShortPress,
    #[strum(serialize = "remote_button_long_press")]
    LongPress,
    #[strum(serialize = "remote_button_double_press")]
    DoublePress,
    #[strum(serialize = "remote_button_triple_press")]
    TriplePress,
    #[strum(serialize = "remote_button_quadruple_press")]
    QuadruplePress,
    #[strum(serialize = "remote_button_quintuple_press")]
    QuintuplePress,
    #[strum(serialize = "remote_button_short_release")]
    ShortRelease,
    #[strum(serialize = "remote_button_long_release")]
    LongRelease,
}

impl TriggerKind {
    /// Press-type part of the action string.
    fn action_suffix(self) -> &'static str {
        match self {
            TriggerKind::ShortPress => MultiPress::Press.into(),
            TriggerKind::LongPress => PressType::Hold.into(),
            TriggerKind::DoublePress => MultiPress::DoublePress.into(),
            TriggerKind::TriplePress => MultiPress::TriplePress.into(),
            TriggerKind::QuadruplePress => MultiPress::QuadruplePress.into(),
            TriggerKind::QuintuplePress => MultiPress::QuintuplePress.into(),
            TriggerKind::ShortRelease => PressType::ShortRelease.into(),
            TriggerKind::LongRelease => PressType::LongRelease.into(),
        }
    }
}

/// Which button the trigger refers to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum TriggerSubtype {
    TurnOn,
    TurnOff,
    DimUp,
    DimDown,
}

impl TriggerSubtype {
    pub fn button(self) -> HueButton {
        match self {
            TriggerSubtype::TurnOn => HueButton::On,
            TriggerSubtype::TurnOff => HueButton::Off,
            TriggerSubtype::DimUp => HueButton::Up,
            TriggerSubtype::DimDown => HueButton::Down,
        }
    }
}

/// One entry of the trigger table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DeviceTrigger {
    #[serde(rename = "type", serialize_with = "as_label")]
    pub kind: TriggerKind,
    #[serde(serialize_with = "as_label")]
    pub subtype: TriggerSubtype,
    pub command: String,
}

fn as_label<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: FmtDisplay,
    S: Serializer,
{
    serializer.collect_str(value)
}

/// Action string emitted for a trigger.
pub fn action_for(kind: TriggerKind, subtype: TriggerSubtype) -> String {
    format!("{}_{}", subtype.button(), kind.action_suffix())
}

/// All triggers supported by the remote.
pub fn device_triggers() -> Vec<DeviceTrigger> {
    TriggerKind::iter()
        .flat_map(|kind| {
            TriggerSubtype::iter().map(move |subtype| DeviceTrigger {
                kind,
                subtype,
                command: action_for(kind, subtype),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_size_and_uniqueness() {
        let triggers = device_triggers();
        assert_eq!(triggers.len(), 32);

        let commands: HashSet<_> = triggers.iter().map(|t| t.command.as_str()).collect();
        assert_eq!(commands.len(), 32);
    }

    #[test]
    fn test_known_entries() {
        assert_eq!(
            action_for(TriggerKind::ShortPress, TriggerSubtype::TurnOn),
            "on_press"
        );
        assert_eq!(
            action_for(TriggerKind::LongPress, TriggerSubtype::DimUp),
            "up_hold"
        );
        assert_eq!(
            action_for(TriggerKind::QuintuplePress, TriggerSubtype::DimDown),
            "down_quintuple_press"
        );
        assert_eq!(
            action_for(TriggerKind::LongRelease, TriggerSubtype::TurnOff),
            "off_long_release"
        );
        assert_eq!(
            TriggerKind::DoublePress.to_string(),
            "remote_button_double_press"
        );
        assert_eq!(TriggerSubtype::DimDown.to_string(), "dim_down");
    }

    #[test]
    fn test_every_emitted_action_has_a_trigger() {
        let commands: HashSet<String> =
            device_triggers().into_iter().map(|t| t.command).collect();

        for button in HueButton::iter() {
            for press_type in PressType::iter().filter(|p| *p != PressType::Press) {
                assert!(commands.contains(&format!("{}_{}", button, press_type)));
            }
            for label in MultiPress::iter() {
                assert!(commands.contains(&format!("{}_{}", button, label)));
            }
        }
    }

    #[test]
    fn test_trigger_json() {
        let trigger = &device_triggers()[0];
        assert_eq!(
            serde_json::to_value(trigger).unwrap(),
            serde_json::json!({
                "type": "remote_button_short_press",
                "subtype": "turn_on",
                "command": "on_press",
            })
        );
    }
}
