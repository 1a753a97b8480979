// src/ui/mod.rs
//! Ratedeck UI system for a 128x64 monochrome character display
//!
//! This module provides:
//! - Navigation actions and page identifiers
//! - A character-cell [`Screen`] frame with inverse-video rows
//! - Rendering of frames onto any `embedded_graphics` target
//! - The [`TextDisplay`] trait implemented by each display backend

pub mod core;
pub mod display;
pub mod screen;

// Re-export commonly used items
pub use self::core::{Action, PageId};
pub use display::TextDisplay;
pub use screen::{Line, Row, SCREEN_COLUMNS, SCREEN_ROWS, Screen, draw_screen};
