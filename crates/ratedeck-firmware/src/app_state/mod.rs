//! Firmware-specific application state extensions
//!
//! Re-exports the hardware-independent app state from `ratedeck_core` and
//! adds the ESP32 peripheral setup plus the single shared state instance.

mod hardware;

pub use hardware::*;

// Re-export all shared app state types from ratedeck-core
pub use ratedeck_core::app_state::*;

/// Quotes and selection shared by the UI, ingest and publisher flows
pub static SHARED_STATE: SharedState = SharedState::new();
