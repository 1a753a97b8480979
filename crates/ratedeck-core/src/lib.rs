//! Hardware-independent core library for ratedeck
//!
//! This crate contains all platform-agnostic logic for the ratedeck currency
//! display: the currency table, the shared rate store, inbound message
//! ingestion, the periodic selection publisher, a small MQTT 3.1.1 client,
//! gesture decoding, and the page state machine that drives the character
//! display.
//!
//! It is `#![no_std]` so it compiles on both the ESP32 target and desktop
//! hosts (for the simulator and tests).

#![cfg_attr(not(test), no_std)]

pub mod app_state;
pub mod config;
pub mod currency;
pub mod gesture;
pub mod ingest;
pub mod mqtt;
pub mod pages;
pub mod publisher;
pub mod rates;
pub mod ui;

#[cfg(test)]
mod test_support;
