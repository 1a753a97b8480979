//! Single-currency detail page
//!
//! Shows the currency code as an inverse title and its latest quote as the
//! body. UP and DOWN redraw with the current quote, RIGHT goes back to the
//! menu. LEFT is logged and otherwise ignored, which differs from the menu
//! where LEFT commits; see DESIGN.md before changing it.

use log::info;

use crate::app_state::SharedState;
use crate::currency::Currency;
use crate::gesture::Gesture;
use crate::pages::{BODY_ROW, Page, TITLE_ROW};
use crate::ui::core::{Action, PageId};
use crate::ui::screen::{Line, Screen};

const TITLE_PADDING: &str = "     ";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailPage {
    currency: Currency,
}

impl DetailPage {
    pub fn new(currency: Currency) -> Self {
        Self { currency }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    fn heading(&self) -> Line {
        let mut heading = Line::new();
        for part in [TITLE_PADDING, self.currency.code(), TITLE_PADDING] {
            let _ = heading.push_str(part);
        }
        heading
    }
}

impl Page for DetailPage {
    fn id(&self) -> PageId {
        PageId::Detail(self.currency)
    }

    fn title(&self) -> &str {
        self.currency.code()
    }

    fn handle_gesture(&mut self, gesture: Gesture) -> Option<Action> {
        info!("Gesture: {}", gesture.label());
        match gesture {
            // Nothing changes; the manager redraws with the latest quote
            Gesture::Up | Gesture::Down => None,
            Gesture::Left => {
                info!("LEFT has no action on the {} page", self.currency);
                None
            }
            Gesture::Right => Some(Action::GoBack),
        }
    }

    fn render(&self, state: &SharedState, screen: &mut Screen) {
        screen.set_row(TITLE_ROW, &self.heading(), true);
        screen.set_row(BODY_ROW, &state.quote(self.currency), false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_title_and_quote() {
        let state = SharedState::new();
        state.update_rates(|book| {
            book.set(Currency::Eth, "2'247.84USD");
        });

        let mut screen = Screen::new();
        DetailPage::new(Currency::Eth).render(&state, &mut screen);

        assert_eq!(screen.text(TITLE_ROW), "     ETH     ");
        assert!(screen.is_inverse(TITLE_ROW));
        assert_eq!(screen.text(BODY_ROW), "2'247.84USD");
        assert!(!screen.is_inverse(BODY_ROW));
    }

    #[test]
    fn test_long_quote_is_cut_to_row() {
        let state = SharedState::new();
        state.update_rates(|book| {
            book.set(Currency::Rub, "0.0110000000000000000USD");
        });

        let mut screen = Screen::new();
        DetailPage::new(Currency::Rub).render(&state, &mut screen);
        assert_eq!(screen.text(BODY_ROW), "0.01100000000000");
    }

    #[test]
    fn test_gesture_mapping() {
        let mut page = DetailPage::new(Currency::Czk);
        assert_eq!(page.handle_gesture(Gesture::Up), None);
        assert_eq!(page.handle_gesture(Gesture::Down), None);
        // LEFT does not commit here, unlike on the menu
        assert_eq!(page.handle_gesture(Gesture::Left), None);
        assert_eq!(page.handle_gesture(Gesture::Right), Some(Action::GoBack));
        assert_eq!(page.id(), PageId::Detail(Currency::Czk));
    }
}
