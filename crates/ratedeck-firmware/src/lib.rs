//! ESP32 firmware-specific modules for ratedeck
//!
//! This crate contains hardware-specific code that cannot compile on desktop
//! targets: peripheral initialization, the APDS-9960 and SSD1306 drivers,
//! WiFi and broker session tasks, and the build-time credentials.

#![no_std]

extern crate alloc;

pub mod apds9960;
pub mod app_state;
pub mod display;
pub mod network;
pub mod wifi_secrets;
