// src/pages/page.rs
//! Core page abstraction and enum wrapper for the UI page system.
//!
//! This module defines the [`Page`] trait that every screen implements,
//! along with [`PageWrapper`], an enum over the concrete page types so the
//! [`PageManager`](super::page_manager::PageManager) can hold the active
//! page without dynamic dispatch (`dyn`).

use crate::app_state::SharedState;
use crate::gesture::Gesture;
use crate::ui::core::{Action, PageId};
use crate::ui::screen::Screen;

// ---------------------------------------------------------------------------
// Page trait
// ---------------------------------------------------------------------------

/// Trait that all navigable UI pages must implement.
///
/// The [`PageManager`](super::page_manager::PageManager) drives a page in a
/// fixed order:
///
/// 1. **`render`** into a frame, which is pushed to the display.
/// 2. **`settle_delay_ms`** of quiet time before the sensor is read again.
/// 3. **`handle_gesture`** for the gesture that ends the wait.
pub trait Page {
    /// Unique identifier used for navigation and lookup.
    fn id(&self) -> PageId;

    /// Human-readable title used in debug logs.
    fn title(&self) -> &str;

    /// Process a gesture and optionally return a navigation [`Action`].
    fn handle_gesture(&mut self, gesture: Gesture) -> Option<Action>;

    /// Write the page into `screen`, reading whatever shared state it shows.
    fn render(&self, state: &SharedState, screen: &mut Screen);

    /// Pause after rendering before the next gesture is accepted.
    fn settle_delay_ms(&self) -> u32 {
        0
    }
}

// ---------------------------------------------------------------------------
// PageWrapper
// ---------------------------------------------------------------------------

/// Enum-based wrapper that stores one of the concrete page types.
///
/// When adding a new page to the application, add a variant here and
/// implement the delegation in the [`Page`] impl below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageWrapper {
    Welcome(crate::pages::welcome::WelcomePage),
    Menu(crate::pages::menu::MenuPage),
    Detail(crate::pages::detail::DetailPage),
}

impl Page for PageWrapper {
    fn id(&self) -> PageId {
        match self {
            PageWrapper::Welcome(page) => page.id(),
            PageWrapper::Menu(page) => page.id(),
            PageWrapper::Detail(page) => page.id(),
        }
    }

    fn title(&self) -> &str {
        match self {
            PageWrapper::Welcome(page) => page.title(),
            PageWrapper::Menu(page) => page.title(),
            PageWrapper::Detail(page) => page.title(),
        }
    }

    fn handle_gesture(&mut self, gesture: Gesture) -> Option<Action> {
        match self {
            PageWrapper::Welcome(page) => page.handle_gesture(gesture),
            PageWrapper::Menu(page) => page.handle_gesture(gesture),
            PageWrapper::Detail(page) => page.handle_gesture(gesture),
        }
    }

    fn render(&self, state: &SharedState, screen: &mut Screen) {
        match self {
            PageWrapper::Welcome(page) => page.render(state, screen),
            PageWrapper::Menu(page) => page.render(state, screen),
            PageWrapper::Detail(page) => page.render(state, screen),
        }
    }

    fn settle_delay_ms(&self) -> u32 {
        match self {
            PageWrapper::Welcome(page) => page.settle_delay_ms(),
            PageWrapper::Menu(page) => page.settle_delay_ms(),
            PageWrapper::Detail(page) => page.settle_delay_ms(),
        }
    }
}
