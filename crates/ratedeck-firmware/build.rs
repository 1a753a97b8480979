//! Bakes WiFi credentials and broker settings into the firmware.
//!
//! Values come from the process environment or a `.env` file. Only the WiFi
//! credentials are required; missing broker settings fall back to the
//! defaults in `ratedeck_core::config::BrokerConfig`.

const KEYS: [&str; 6] = [
    "WIFI_SSID",
    "WIFI_PASSWORD",
    "MQTT_HOST",
    "MQTT_PORT",
    "MQTT_TOPIC",
    "MQTT_CLIENT_ID",
];

fn main() {
    println!("cargo:rerun-if-changed=.env");
    // Existing environment variables win over the file
    let _ = dotenvy::dotenv();

    for key in KEYS {
        println!("cargo:rerun-if-env-changed={key}");
        match std::env::var(key) {
            Ok(value) => println!("cargo:rustc-env={key}={value}"),
            Err(_) if key.starts_with("WIFI_") => {
                println!("cargo:warning={key} is not set; add it to .env");
            }
            Err(_) => {}
        }
    }

    println!("cargo:rustc-link-arg=-Tlinkall.x");
}
