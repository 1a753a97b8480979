//! Welcome page
//!
//! Shown at startup: a lit screen with a prompt. Any swipe opens the menu.

use log::info;

use crate::app_state::SharedState;
use crate::gesture::Gesture;
use crate::pages::{BODY_ROW, Page};
use crate::ui::core::{Action, PageId};
use crate::ui::screen::{SCREEN_ROWS, Screen};

const PROMPT: &str = "Swipe to launch";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WelcomePage;

impl WelcomePage {
    pub fn new() -> Self {
        Self
    }
}

impl Page for WelcomePage {
    fn id(&self) -> PageId {
        PageId::Welcome
    }

    fn title(&self) -> &str {
        "Welcome"
    }

    fn handle_gesture(&mut self, gesture: Gesture) -> Option<Action> {
        info!("Gesture: {}", gesture.label());
        Some(Action::NavigateToPage(PageId::Menu))
    }

    fn render(&self, _state: &SharedState, screen: &mut Screen) {
        for row in 0..SCREEN_ROWS {
            screen.set_row(row, "", true);
        }
        screen.set_row(BODY_ROW, PROMPT, true);
    }
}
