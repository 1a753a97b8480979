//! Currency menu page
//!
//! Lists the five currency codes with the cursor row highlighted. UP and
//! DOWN move the cursor cyclically, LEFT commits the highlighted currency,
//! RIGHT leaves for the welcome page.

use log::info;

use crate::app_state::SharedState;
use crate::currency::{CURRENCY_COUNT, Currency};
use crate::gesture::Gesture;
use crate::pages::{MENU_FIRST_ROW, Page, TITLE_ROW};
use crate::ui::core::{Action, PageId};
use crate::ui::screen::Screen;

/// Quiet time after drawing the menu so one swipe is not read twice
pub const MENU_SETTLE_MS: u32 = 500;

const MENU_TITLE: &str = "     Menu     ";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuPage {
    cursor: usize,
}

impl MenuPage {
    pub fn new() -> Self {
        Self::with_cursor(0)
    }

    /// Open the menu with the cursor on a given row (wrapped into range)
    pub fn with_cursor(cursor: usize) -> Self {
        Self {
            cursor: cursor % CURRENCY_COUNT,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Currency under the cursor
    pub fn highlighted(&self) -> Currency {
        Currency::from_index(self.cursor).unwrap_or_default()
    }
}

impl Page for MenuPage {
    fn id(&self) -> PageId {
        PageId::Menu
    }

    fn title(&self) -> &str {
        "Menu"
    }

    fn handle_gesture(&mut self, gesture: Gesture) -> Option<Action> {
        info!("Gesture: {}", gesture.label());
        match gesture {
            Gesture::Up => {
                self.cursor = (self.cursor + 1) % CURRENCY_COUNT;
                None
            }
            Gesture::Down => {
                self.cursor = (self.cursor + CURRENCY_COUNT - 1) % CURRENCY_COUNT;
                None
            }
            Gesture::Left => Some(Action::SelectCurrency(self.highlighted())),
            Gesture::Right => Some(Action::NavigateToPage(PageId::Welcome)),
        }
    }

    fn render(&self, _state: &SharedState, screen: &mut Screen) {
        screen.set_row(TITLE_ROW, MENU_TITLE, false);
        for (i, currency) in Currency::ALL.iter().enumerate() {
            screen.set_row(MENU_FIRST_ROW + i, currency.code(), i == self.cursor);
        }
    }

    fn settle_delay_ms(&self) -> u32 {
        MENU_SETTLE_MS
    }
}
