use hue_remote_bridge::config::{self, Config};
use hue_remote_bridge::input::mqtt::MqttIntegration;
use log::{error, info, warn};
use tokio::signal;

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

#[tokio::main]
async fn main() {
    // Load .env file before anything else
    let dotenv = config::load_dotenv();
    init_logger();
    info!("Starting Hue Remote Bridge");
    if let Err(e) = dotenv {
        warn!("Ignoring .env: {}", e);
    }

    let config = Config::from_env();
    if let Err(e) = config.validate() {
        error!("{}", e);
        std::process::exit(1);
    }

    info!("Configuration loaded:");
    info!(
        "  MQTT Broker: {}:{}",
        config.mqtt.broker_host, config.mqtt.broker_port
    );
    info!("  Base Topic: {}", config.mqtt.base_topic);
    info!("  Remotes: {}", config.remotes.friendly_names.join(", "));
    info!("  Debounce: {} ms", config.remotes.debounce_ms);

    let mut mqtt_task = MqttIntegration::new(config).start();

    info!("Hue Remote Bridge is running");
    info!("  - Press Ctrl+C to exit");

    tokio::select! {
        result = signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Received shutdown signal"),
                Err(e) => error!("Failed to listen for shutdown signal: {}", e),
            }
        }
        _ = &mut mqtt_task => {
            error!("MQTT integration stopped unexpectedly");
        }
    }

    mqtt_task.abort();
    info!("Hue Remote Bridge stopped");
}
