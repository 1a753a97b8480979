//! Credentials and broker settings baked in at build time by `build.rs`

use ratedeck_core::config::{BrokerConfig, Config, InternetConfig};

pub const WIFI_SSID: &str = match option_env!("WIFI_SSID") {
    Some(ssid) => ssid,
    None => "",
};

pub const WIFI_PASSWORD: &str = match option_env!("WIFI_PASSWORD") {
    Some(password) => password,
    None => "",
};

const MQTT_HOST: Option<&str> = option_env!("MQTT_HOST");
const MQTT_PORT: Option<&str> = option_env!("MQTT_PORT");
const MQTT_TOPIC: Option<&str> = option_env!("MQTT_TOPIC");
const MQTT_CLIENT_ID: Option<&str> = option_env!("MQTT_CLIENT_ID");

/// Device configuration, with broker defaults filling anything not set
pub fn config() -> Config<'static> {
    let defaults = BrokerConfig::default();
    Config {
        internet: InternetConfig {
            ssid: WIFI_SSID,
            password: WIFI_PASSWORD,
        },
        broker: BrokerConfig {
            host: MQTT_HOST.unwrap_or(defaults.host),
            port: MQTT_PORT
                .and_then(|port| port.parse().ok())
                .unwrap_or(defaults.port),
            topic: MQTT_TOPIC.unwrap_or(defaults.topic),
            client_id: MQTT_CLIENT_ID.unwrap_or(defaults.client_id),
            ..defaults
        },
    }
}
