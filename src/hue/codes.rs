//! Code tables for the Hue remote `notification` command.
//!
//! Known codes map to named values; anything else is kept as the raw code so
//! undocumented buttons and press types still flow through unchanged.

use serde::{Serialize, Serializer};
use std::fmt;
use strum::{Display, EnumIter, FromRepr, IntoStaticStr};

/// Buttons of the Hue dimmer remote.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, FromRepr, Display, EnumIter, IntoStaticStr)]
#[repr(u8)]
#[strum(serialize_all = "snake_case")]
pub enum HueButton {
    On = 1,
    Up = 2,
    Down = 3,
    Off = 4,
}

/// Press types reported by the remote.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, FromRepr, Display, EnumIter, IntoStaticStr)]
#[repr(u8)]
#[strum(serialize_all = "snake_case")]
pub enum PressType {
    Press = 0,
    Hold = 1,
    ShortRelease = 2,
    LongRelease = 3,
}

/// Label for a settled burst of presses.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum MultiPress {
    Press,
    DoublePress,
    TriplePress,
    QuadruplePress,
    /// Five or more presses
    QuintuplePress,
}

impl MultiPress {
    /// Label for a click count; zero clicks has no label.
    pub fn from_count(count: u32) -> Option<Self> {
        match count {
            0 => None,
            1 => Some(MultiPress::Press),
            2 => Some(MultiPress::DoublePress),
            3 => Some(MultiPress::TriplePress),
            4 => Some(MultiPress::QuadruplePress),
            _ => Some(MultiPress::QuintuplePress),
        }
    }
}

/// A decoded code, or the raw value when the code is not in the table.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Decoded<T> {
    Known(T),
    Raw(u8),
}

impl<T> Decoded<T> {
    /// Decode `code` with a table lookup such as `HueButton::from_repr`.
    pub fn new(code: u8, lookup: impl FnOnce(u8) -> Option<T>) -> Self {
        match lookup(code) {
            Some(value) => Decoded::Known(value),
            None => Decoded::Raw(code),
        }
    }

    pub fn known(&self) -> Option<&T> {
        match self {
            Decoded::Known(value) => Some(value),
            Decoded::Raw(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        match self {
            Decoded::Known(value) => Decoded::Known(f(value)),
            Decoded::Raw(code) => Decoded::Raw(code),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Decoded<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decoded::Known(value) => value.fmt(f),
            Decoded::Raw(code) => write!(f, "{}", code),
        }
    }
}

/// Known values serialize as their label, raw codes as numbers.
impl<T: fmt::Display> Serialize for Decoded<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Decoded::Known(value) => serializer.collect_str(value),
            Decoded::Raw(code) => serializer.serialize_u8(*code),
        }
    }
}

pub type ButtonCode = Decoded<HueButton>;
pub type PressTypeCode = Decoded<PressType>;

/// Press type as reported in event payloads: a [`PressType`] or
/// [`MultiPress`] label, or the raw code.
pub type PressLabel = Decoded<&'static str>;

impl From<PressTypeCode> for PressLabel {
    fn from(code: PressTypeCode) -> Self {
        code.map(<&'static str>::from)
    }
}

impl From<MultiPress> for PressLabel {
    fn from(label: MultiPress) -> Self {
        Decoded::Known(label.into())
    }
}

impl ButtonCode {
    pub fn from_code(code: u8) -> Self {
        Decoded::new(code, HueButton::from_repr)
    }
}

impl PressTypeCode {
    pub fn from_code(code: u8) -> Self {
        Decoded::new(code, PressType::from_repr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_codes() {
        assert_eq!(ButtonCode::from_code(1), Decoded::Known(HueButton::On));
        assert_eq!(ButtonCode::from_code(4), Decoded::Known(HueButton::Off));
        assert_eq!(ButtonCode::from_code(9), Decoded::Raw(9));
        assert_eq!(ButtonCode::from_code(3).to_string(), "down");
        assert_eq!(ButtonCode::from_code(0).to_string(), "0");
    }

    #[test]
    fn test_press_type_codes() {
        assert_eq!(PressTypeCode::from_code(0), Decoded::Known(PressType::Press));
        assert_eq!(PressTypeCode::from_code(2).to_string(), "short_release");
        assert_eq!(PressTypeCode::from_code(3).to_string(), "long_release");
        assert_eq!(PressTypeCode::from_code(7), Decoded::Raw(7));
        assert!(PressTypeCode::from_code(7).known().is_none());
    }

    #[test]
    fn test_multi_press_labels() {
        assert_eq!(MultiPress::from_count(0), None);
        assert_eq!(MultiPress::from_count(1).unwrap().to_string(), "press");
        assert_eq!(MultiPress::from_count(2).unwrap().to_string(), "double_press");
        assert_eq!(MultiPress::from_count(3).unwrap().to_string(), "triple_press");
        assert_eq!(
            MultiPress::from_count(4).unwrap().to_string(),
            "quadruple_press"
        );
        assert_eq!(MultiPress::from_count(5), Some(MultiPress::QuintuplePress));
        assert_eq!(MultiPress::from_count(42), Some(MultiPress::QuintuplePress));
    }

    #[test]
    fn test_serialize_known_and_raw() {
        let json = serde_json::to_string(&[ButtonCode::from_code(2), ButtonCode::from_code(12)])
            .unwrap();
        assert_eq!(json, r#"["up",12]"#);
    }

    #[test]
    fn test_press_labels_keep_raw_codes_numeric() {
        let labels = [
            PressLabel::from(PressTypeCode::from_code(1)),
            PressLabel::from(PressTypeCode::from_code(5)),
            PressLabel::from(MultiPress::TriplePress),
        ];
        assert_eq!(labels[0], Decoded::Known("hold"));
        assert_eq!(labels[1], Decoded::Raw(5));

        let json = serde_json::to_value(labels).unwrap();
        assert_eq!(json, serde_json::json!(["hold", 5, "triple_press"]));
    }
}
