//! Press simulator for the Hue remote bridge.
//!
//! Publishes synthetic `notification` frames to a remote's notification
//! topic, so multi-press detection can be exercised without hardware.
//!
//! Usage:
//!   cargo run --bin press-sim -- --remote "Hallway Dimmer" press on --count 3
//!   cargo run --bin press-sim -- --remote "Hallway Dimmer" hold up

use clap::{Parser, ValueEnum};
use hue_remote_bridge::config::{self, Config};
use hue_remote_bridge::hue::{HueButton, NotificationArgs, PressType};
use hue_remote_bridge::input::mqtt::{MqttClient, notification_topic};
use log::{error, info, warn};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

#[derive(Parser)]
#[command(name = "press-sim")]
#[command(about = "Publish synthetic Hue remote notifications over MQTT")]
struct Cli {
    /// Friendly name of the remote to simulate
    #[arg(long, env = "HUE_SIM_REMOTE")]
    remote: String,

    /// Press type to report
    #[arg(value_enum)]
    press_type: SimPressType,

    /// Button to report
    #[arg(value_enum)]
    button: SimButton,

    /// Number of notifications to send
    #[arg(long, default_value_t = 1)]
    count: u8,

    /// Gap between notifications in milliseconds
    #[arg(long, default_value_t = 150)]
    gap_ms: u64,

    /// Send the raw ZCL payload as hex instead of positional args
    #[arg(long)]
    raw: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum SimButton {
    On,
    Up,
    Down,
    Off,
}

impl From<SimButton> for HueButton {
    fn from(button: SimButton) -> Self {
        match button {
            SimButton::On => HueButton::On,
            SimButton::Up => HueButton::Up,
            SimButton::Down => HueButton::Down,
            SimButton::Off => HueButton::Off,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SimPressType {
    Press,
    Hold,
    ShortRelease,
    LongRelease,
}

impl From<SimPressType> for PressType {
    fn from(press_type: SimPressType) -> Self {
        match press_type {
            SimPressType::Press => PressType::Press,
            SimPressType::Hold => PressType::Hold,
            SimPressType::ShortRelease => PressType::ShortRelease,
            SimPressType::LongRelease => PressType::LongRelease,
        }
    }
}

#[tokio::main]
async fn main() {
    let dotenv = config::load_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = dotenv {
        warn!("Ignoring .env: {}", e);
    }

    let cli = Cli::parse();
    let mut config = Config::from_env();
    config.mqtt.client_id = format!("{}-press-sim", config.mqtt.client_id);

    let topic = notification_topic(&config.mqtt.base_topic, &cli.remote);
    let button = HueButton::from(cli.button);
    let press_type = PressType::from(cli.press_type);
    let args = NotificationArgs::new(button as u8, press_type as u8);

    info!(
        "Connecting to MQTT broker at {}:{}",
        config.mqtt.broker_host, config.mqtt.broker_port
    );

    let mqtt_client = MqttClient::new(&config.mqtt);
    let client = mqtt_client.client();
    let (msg_tx, _msg_rx) = mpsc::channel(1);
    let (sessions_tx, mut sessions_rx) = watch::channel(0u64);
    let mqtt_loop = tokio::spawn(async move {
        mqtt_client.run(msg_tx, sessions_tx).await;
    });

    let connected = tokio::time::timeout(
        Duration::from_secs(10),
        sessions_rx.wait_for(|count| *count > 0),
    )
    .await
    .map(|signal| signal.is_ok());
    if !matches!(connected, Ok(true)) {
        error!("Connection timeout after 10 seconds");
        std::process::exit(1);
    }

    for tsn in 0..cli.count {
        let frame = if cli.raw {
            let hex: String = args.to_bytes().iter().map(|b| format!("{:02x}", b)).collect();
            serde_json::json!({
                "tsn": tsn,
                "command_id": 0,
                "payload": hex,
            })
        } else {
            serde_json::json!({
                "tsn": tsn,
                "command_id": 0,
                "args": args.to_vec(),
            })
        };
        info!("Sending {} {} ({}/{})", button, press_type, tsn + 1, cli.count);
        if let Err(e) = client
            .publish(
                &topic,
                rumqttc::QoS::AtLeastOnce,
                false,
                frame.to_string().as_bytes(),
            )
            .await
        {
            warn!("Failed to publish to {}: {}", topic, e);
        }
        tokio::time::sleep(Duration::from_millis(cli.gap_ms)).await;
    }

    // Give the event loop time to flush outgoing publishes
    tokio::time::sleep(Duration::from_millis(500)).await;
    mqtt_loop.abort();
    info!("Done.");
}
