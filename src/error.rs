use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum HueError {
    #[error("Notification payload truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Notification expects 6 arguments, got {0}")]
    ArgumentCount(usize),

    #[error("Notification argument {name} out of range: {value}")]
    ArgumentRange { name: &'static str, value: u32 },

    #[error("Invalid hex payload: {0:?}")]
    InvalidHex(String),

    #[error("Zigbee transport error: {0}")]
    Transport(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    MqttClientError(#[from] rumqttc::ClientError),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HueError>;
