use crate::error::{HueError, Result};
use crate::hue::debounce::DEFAULT_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Load environment variables from .env file with robust parsing.
/// Handles values with spaces without requiring quotes.
///
/// Returns whether a `.env` file was found. Called before the logger is
/// set up, so read errors are handed back to the caller to report.
pub fn load_dotenv() -> Result<bool> {
    load_dotenv_from(Path::new(".env"))
}

fn load_dotenv_from(env_path: &Path) -> Result<bool> {
    if !env_path.exists() {
        return Ok(false);
    }

    let content = fs::read_to_string(env_path)?;

    for (key, value) in parse_dotenv(&content) {
        // Only set if not already set (env vars take precedence)
        if std::env::var(key).is_err() {
            // SAFETY: We're single-threaded at this point (called before any async runtime)
            unsafe { std::env::set_var(key, value) };
        }
    }
    Ok(true)
}

/// Split `.env` content into key/value pairs, skipping blanks and comments.
fn parse_dotenv(content: &str) -> Vec<(&str, &str)> {
    let mut pairs = Vec::new();

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Find the first '=' and split there
        if let Some(eq_pos) = line.find('=') {
            let key = line[..eq_pos].trim();
            let mut value = line[eq_pos + 1..].trim();

            // Remove surrounding quotes if present
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = &value[1..value.len() - 1];
            }

            pairs.push((key, value));
        }
    }

    pairs
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub mqtt: MqttConfig,
    pub remotes: RemotesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttConfig {
    pub broker_host: String,
    pub broker_port: u16,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Topic prefix shared with zigbee2mqtt (e.g. "zigbee2mqtt")
    pub base_topic: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemotesConfig {
    /// Friendly names of the Hue remotes to bridge
    pub friendly_names: Vec<String>,
    /// Debounce window for multi-press detection, in milliseconds
    pub debounce_ms: u64,
}

impl RemotesConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mqtt: MqttConfig {
                broker_host: "10.0.0.2".to_string(),
                broker_port: 1883,
                client_id: "hue-remote-bridge".to_string(),
                username: None,
                password: None,
                base_topic: "zigbee2mqtt".to_string(),
            },
            remotes: RemotesConfig {
                friendly_names: Vec::new(),
                debounce_ms: DEFAULT_THRESHOLD.as_millis() as u64,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        // MQTT configuration
        if let Some(host) = lookup("MQTT_BROKER_HOST") {
            config.mqtt.broker_host = host;
        }
        if let Some(port) = lookup("MQTT_BROKER_PORT")
            && let Ok(p) = port.parse()
        {
            config.mqtt.broker_port = p;
        }
        if let Some(client_id) = lookup("MQTT_CLIENT_ID") {
            config.mqtt.client_id = client_id;
        }
        if let Some(username) = lookup("MQTT_USERNAME") {
            config.mqtt.username = Some(username);
        }
        if let Some(password) = lookup("MQTT_PASSWORD") {
            config.mqtt.password = Some(password);
        }
        if let Some(base_topic) = lookup("MQTT_BASE_TOPIC") {
            config.mqtt.base_topic = base_topic.trim_end_matches('/').to_string();
        }

        // Hue remotes
        if let Some(names) = lookup("HUE_REMOTES") {
            config.remotes.friendly_names = names
                .split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(ms) = lookup("HUE_DEBOUNCE_MS")
            && let Ok(ms) = ms.parse()
        {
            config.remotes.debounce_ms = ms;
        }

        config
    }

    /// Reject configurations the bridge cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.remotes.friendly_names.is_empty() {
            return Err(HueError::InvalidConfig(
                "HUE_REMOTES must name at least one remote".to_string(),
            ));
        }
        if self.remotes.debounce_ms == 0 {
            return Err(HueError::InvalidConfig(
                "HUE_DEBOUNCE_MS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
