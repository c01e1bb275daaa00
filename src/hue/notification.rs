//! Manufacturer-specific `notification` command of the Hue remote cluster.
//!
//! Payload layout (ZCL, little-endian):
//!
//! | field      | type   |
//! |------------|--------|
//! | button     | uint8  |
//! | param2     | uint24 |
//! | press_type | uint8  |
//! | param4     | uint8  |
//! | param5     | uint8  |
//! | param6     | uint8  |

use crate::error::{HueError, Result};
use serde::{Deserialize, Serialize};

/// Encoded length of a notification payload.
pub const NOTIFICATION_LEN: usize = 8;

/// Number of positional arguments in a notification.
pub const NOTIFICATION_ARGS: usize = 6;

const UINT24_MAX: u32 = 0x00FF_FFFF;

/// The parts of the ZCL header the remote handler looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZclHeader {
    /// Transaction sequence number
    pub tsn: u8,
    pub command_id: u8,
}

impl ZclHeader {
    pub fn new(tsn: u8, command_id: u8) -> Self {
        Self { tsn, command_id }
    }
}

/// Decoded arguments of a `notification` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NotificationArgs {
    pub button: u8,
    pub param2: u32,
    pub press_type: u8,
    pub param4: u8,
    pub param5: u8,
    pub param6: u8,
}

impl NotificationArgs {
    /// Arguments for a plain button report with the remaining params zeroed.
    pub fn new(button: u8, press_type: u8) -> Self {
        Self {
            button,
            press_type,
            ..Self::default()
        }
    }

    /// Decode a raw ZCL payload. Trailing bytes are ignored.
    pub fn from_bytes(payload: &[u8]) -> Result<Self> {
        if payload.len() < NOTIFICATION_LEN {
            return Err(HueError::Truncated {
                expected: NOTIFICATION_LEN,
                actual: payload.len(),
            });
        }

        Ok(Self {
            button: payload[0],
            param2: u32::from_le_bytes([payload[1], payload[2], payload[3], 0]),
            press_type: payload[4],
            param4: payload[5],
            param5: payload[6],
            param6: payload[7],
        })
    }

    /// Decode a ZCL payload given as a hex string, e.g. `"0400000003000000"`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        Self::from_bytes(&decode_hex(hex)?)
    }

    /// Encode as a ZCL payload.
    pub fn to_bytes(&self) -> [u8; NOTIFICATION_LEN] {
        let p2 = self.param2.to_le_bytes();
        [
            self.button,
            p2[0],
            p2[1],
            p2[2],
            self.press_type,
            self.param4,
            self.param5,
            self.param6,
        ]
    }

    /// Build from the positional argument list
    /// `[button, param2, press_type, param4, param5, param6]`.
    pub fn from_slice(args: &[u32]) -> Result<Self> {
        let [button, param2, press_type, param4, param5, param6] = args else {
            return Err(HueError::ArgumentCount(args.len()));
        };

        if *param2 > UINT24_MAX {
            return Err(HueError::ArgumentRange {
                name: "param2",
                value: *param2,
            });
        }

        Ok(Self {
            button: narrow("button", *button)?,
            param2: *param2,
            press_type: narrow("press_type", *press_type)?,
            param4: narrow("param4", *param4)?,
            param5: narrow("param5", *param5)?,
            param6: narrow("param6", *param6)?,
        })
    }

    /// Positional argument list, as carried in emitted events.
    pub fn to_vec(&self) -> Vec<u32> {
        vec![
            self.button.into(),
            self.param2,
            self.press_type.into(),
            self.param4.into(),
            self.param5.into(),
            self.param6.into(),
        ]
    }
}

fn decode_hex(hex: &str) -> Result<Vec<u8>> {
    let hex = hex.trim();
    if hex.len() % 2 != 0 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(HueError::InvalidHex(hex.to_string()));
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| HueError::InvalidHex(hex.to_string()))
        })
        .collect()
}

fn narrow(name: &'static str, value: u32) -> Result<u8> {
    u8::try_from(value).map_err(|_| HueError::ArgumentRange { name, value })
}
