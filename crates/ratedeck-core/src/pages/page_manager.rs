// src/pages/page_manager.rs
//! Page manager with navigation and gesture dispatching.
//!
//! The manager owns the active page and turns the [`Action`]s pages return
//! into navigation. Its async loop is the whole UI flow: draw the active page,
//! wait out the page's settle delay, block until the next gesture, dispatch.

use core::convert::Infallible;

use embedded_hal_async::delay::DelayNs;
use log::{debug, info};

use crate::app_state::SharedState;
use crate::gesture::{Gesture, GestureSource, wait_for_gesture};
use crate::pages::detail::DetailPage;
use crate::pages::menu::MenuPage;
use crate::pages::page::{Page, PageWrapper};
use crate::pages::welcome::WelcomePage;
use crate::ui::core::{Action, PageId};
use crate::ui::display::TextDisplay;
use crate::ui::screen::Screen;

/// Manages page navigation, rendering, and gesture dispatching.
pub struct PageManager<'a> {
    state: &'a SharedState,
    current: PageWrapper,
    /// Menu cursor when the menu was last left for a detail page
    menu_cursor: usize,
    frame: Screen,
    /// Last frame pushed to the display
    shown: Option<Screen>,
}

impl<'a> PageManager<'a> {
    /// Start on the welcome page
    pub fn new(state: &'a SharedState) -> Self {
        Self {
            state,
            current: PageWrapper::Welcome(WelcomePage::new()),
            menu_cursor: 0,
            frame: Screen::new(),
            shown: None,
        }
    }

    /// Get current page ID
    pub fn current_page_id(&self) -> PageId {
        self.current.id()
    }

    pub fn current_page(&self) -> &PageWrapper {
        &self.current
    }

    /// Navigate to a specific page. The menu always opens at cursor 0.
    pub fn navigate_to(&mut self, page_id: PageId) {
        let page = match page_id {
            PageId::Welcome => PageWrapper::Welcome(WelcomePage::new()),
            PageId::Menu => PageWrapper::Menu(MenuPage::new()),
            PageId::Detail(currency) => PageWrapper::Detail(DetailPage::new(currency)),
        };
        self.activate(page);
    }

    /// Leave the current page for the one it was opened from
    pub fn go_back(&mut self) {
        let page = match self.current {
            PageWrapper::Detail(_) => PageWrapper::Menu(MenuPage::with_cursor(self.menu_cursor)),
            PageWrapper::Menu(_) | PageWrapper::Welcome(_) => {
                PageWrapper::Welcome(WelcomePage::new())
            }
        };
        self.activate(page);
    }

    fn activate(&mut self, page: PageWrapper) {
        debug!("Navigating from {} to {}", self.current.title(), page.title());
        self.current = page;
    }

    /// Dispatch a gesture to the current page and carry out its action
    pub fn handle_gesture(&mut self, gesture: Gesture) -> Option<Action> {
        let action = self.current.handle_gesture(gesture);
        debug!("Gesture result: {:?}", action);
        match action {
            Some(Action::NavigateToPage(page_id)) => self.navigate_to(page_id),
            Some(Action::SelectCurrency(currency)) => {
                info!("Selected {}", currency);
                self.state.select(currency);
                if let PageWrapper::Menu(menu) = &self.current {
                    self.menu_cursor = menu.cursor();
                }
                self.navigate_to(PageId::Detail(currency));
            }
            Some(Action::GoBack) => self.go_back(),
            None => {}
        }
        action
    }

    /// Render the current page into the frame buffer and return it
    pub fn render(&mut self) -> &Screen {
        self.frame.clear();
        self.current.render(self.state, &mut self.frame);
        &self.frame
    }

    /// Render and push the frame unless the display already shows it.
    ///
    /// Returns whether a frame was pushed.
    pub fn draw<T: TextDisplay>(&mut self, display: &mut T) -> Result<bool, T::Error> {
        self.render();
        if self.shown.as_ref() == Some(&self.frame) {
            return Ok(false);
        }
        display.show(&self.frame)?;
        self.shown = Some(self.frame.clone());
        Ok(true)
    }

    /// One pass of the UI loop: draw, settle, wait for a gesture, dispatch
    pub async fn step<G, T, D>(
        &mut self,
        gestures: &mut G,
        display: &mut T,
        delay: &mut D,
    ) -> Result<Gesture, T::Error>
    where
        G: GestureSource,
        T: TextDisplay,
        D: DelayNs,
    {
        self.draw(display)?;

        let settle_ms = self.current.settle_delay_ms();
        if settle_ms > 0 {
            delay.delay_ms(settle_ms).await;
        }

        let gesture = wait_for_gesture(gestures, delay).await;
        self.handle_gesture(gesture);
        Ok(gesture)
    }

    /// Run the UI forever. Returns only if the display fails.
    pub async fn run<G, T, D>(
        &mut self,
        gestures: &mut G,
        display: &mut T,
        delay: &mut D,
    ) -> Result<Infallible, T::Error>
    where
        G: GestureSource,
        T: TextDisplay,
        D: DelayNs,
    {
        info!("UI started on {}", self.current.title());
        loop {
            self.step(gestures, display, delay).await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::{CURRENCY_COUNT, Currency};
    use crate::pages::menu::MENU_SETTLE_MS;
    use crate::publisher::selection_message;
    use crate::test_support::RecordingDelay;
    use embassy_futures::block_on;
    use proptest::prelude::*;
    use std::collections::VecDeque;
    use std::vec::Vec;

    const ALL_GESTURES: [Gesture; 4] = [Gesture::Up, Gesture::Down, Gesture::Left, Gesture::Right];

    fn menu_cursor(manager: &PageManager<'_>) -> Option<usize> {
        match manager.current_page() {
            PageWrapper::Menu(menu) => Some(menu.cursor()),
            _ => None,
        }
    }

    fn gesture_strategy() -> impl Strategy<Value = Gesture> {
        prop::sample::select(ALL_GESTURES.to_vec())
    }

    /// Sensor that replays a script and then stays silent
    struct ScriptedGestures(VecDeque<Gesture>);

    impl GestureSource for ScriptedGestures {
        type Error = Infallible;

        async fn read_gesture(&mut self) -> Result<Option<Gesture>, Self::Error> {
            Ok(self.0.pop_front())
        }
    }

    /// Display that keeps every frame, optionally failing on the nth push
    #[derive(Default)]
    struct RecordingDisplay {
        frames: Vec<Screen>,
        fail_on: Option<usize>,
    }

    impl TextDisplay for RecordingDisplay {
        type Error = &'static str;

        fn show(&mut self, screen: &Screen) -> Result<(), Self::Error> {
            if self.fail_on == Some(self.frames.len()) {
                return Err("spi");
            }
            self.frames.push(screen.clone());
            Ok(())
        }
    }

    #[test]
    fn test_starts_on_welcome() {
        let state = SharedState::new();
        let manager = PageManager::new(&state);
        assert_eq!(manager.current_page_id(), PageId::Welcome);
    }

    #[test]
    fn test_commit_selects_and_opens_detail() {
        let state = SharedState::new();
        let mut manager = PageManager::new(&state);

        manager.handle_gesture(Gesture::Right);
        manager.handle_gesture(Gesture::Up);
        manager.handle_gesture(Gesture::Up);
        let action = manager.handle_gesture(Gesture::Left);

        assert_eq!(action, Some(Action::SelectCurrency(Currency::Czk)));
        assert_eq!(manager.current_page_id(), PageId::Detail(Currency::Czk));
        assert_eq!(state.selected(), Currency::Czk);
        assert_eq!(selection_message(state.selected()).as_str(), "[CURRENCY] CZK");
    }

    #[test]
    fn test_back_from_detail_restores_menu_cursor() {
        let state = SharedState::new();
        let mut manager = PageManager::new(&state);

        manager.handle_gesture(Gesture::Up);
        manager.handle_gesture(Gesture::Down);
        manager.handle_gesture(Gesture::Down);
        manager.handle_gesture(Gesture::Left);
        assert_eq!(manager.current_page_id(), PageId::Detail(Currency::Btc));

        manager.handle_gesture(Gesture::Right);
        assert_eq!(manager.current_page_id(), PageId::Menu);
        assert_eq!(menu_cursor(&manager), Some(3));
    }

    #[test]
    fn test_detail_ignores_left_and_refresh_gestures() {
        let state = SharedState::new();
        let mut manager = PageManager::new(&state);
        manager.navigate_to(PageId::Detail(Currency::Eur));

        for gesture in [Gesture::Left, Gesture::Up, Gesture::Down] {
            assert_eq!(manager.handle_gesture(gesture), None);
            assert_eq!(manager.current_page_id(), PageId::Detail(Currency::Eur));
        }
        assert_eq!(state.selected(), Currency::Rub);
    }

    #[test]
    fn test_welcome_reopens_menu_at_zero() {
        let state = SharedState::new();
        let mut manager = PageManager::new(&state);

        manager.handle_gesture(Gesture::Left);
        manager.handle_gesture(Gesture::Up);
        manager.handle_gesture(Gesture::Right);
        assert_eq!(manager.current_page_id(), PageId::Welcome);

        manager.handle_gesture(Gesture::Down);
        assert_eq!(menu_cursor(&manager), Some(0));
    }

    #[test]
    fn test_step_draws_settles_and_dispatches() {
        let state = SharedState::new();
        let mut manager = PageManager::new(&state);
        let mut gestures = ScriptedGestures([Gesture::Up, Gesture::Up].into());
        let mut display = RecordingDisplay::default();
        let mut delay = RecordingDelay::default();

        // Welcome has no settle delay
        block_on(manager.step(&mut gestures, &mut display, &mut delay)).unwrap();
        assert!(delay.0.is_empty());
        assert_eq!(display.frames.len(), 1);
        assert_eq!(display.frames[0].text(4), "Swipe to launch");

        // Menu waits before reading the sensor
        block_on(manager.step(&mut gestures, &mut display, &mut delay)).unwrap();
        assert_eq!(delay.0, [MENU_SETTLE_MS]);
        assert_eq!(display.frames.len(), 2);
        assert!(display.frames[1].is_inverse(1));
        assert_eq!(menu_cursor(&manager), Some(1));
    }

    #[test]
    fn test_identical_frames_are_not_pushed() {
        let state = SharedState::new();
        let mut manager = PageManager::new(&state);
        manager.navigate_to(PageId::Detail(Currency::Btc));
        let mut display = RecordingDisplay::default();

        assert_eq!(manager.draw(&mut display), Ok(true));
        assert_eq!(manager.draw(&mut display), Ok(false));

        state.update_rates(|book| {
            book.set(Currency::Btc, "42'155.80USD");
        });
        assert_eq!(manager.draw(&mut display), Ok(true));
        assert_eq!(display.frames.len(), 2);
        assert_eq!(display.frames[1].text(4), "42'155.80USD");
    }

    #[test]
    fn test_run_stops_on_display_error() {
        let state = SharedState::new();
        let mut manager = PageManager::new(&state);
        let mut gestures = ScriptedGestures([Gesture::Left, Gesture::Left].into());
        let mut display = RecordingDisplay {
            fail_on: Some(2),
            ..RecordingDisplay::default()
        };
        let mut delay = RecordingDelay::default();

        let result = block_on(manager.run(&mut gestures, &mut display, &mut delay));
        assert_eq!(result, Err("spi"));
        // Welcome, then menu, then the detail frame failed
        assert_eq!(display.frames.len(), 2);
        assert_eq!(manager.current_page_id(), PageId::Detail(Currency::Rub));
    }

    proptest! {
        #[test]
        fn prop_first_gesture_opens_menu_at_zero(first in gesture_strategy()) {
            let state = SharedState::new();
            let mut manager = PageManager::new(&state);
            manager.handle_gesture(first);
            prop_assert_eq!(manager.current_page_id(), PageId::Menu);
            prop_assert_eq!(menu_cursor(&manager), Some(0));
        }

        #[test]
        fn prop_right_leaves_detail_and_menu(
            cursor_moves in 0usize..CURRENCY_COUNT * 2,
            commit in any::<bool>(),
        ) {
            let state = SharedState::new();
            let mut manager = PageManager::new(&state);
            manager.handle_gesture(Gesture::Up);
            for _ in 0..cursor_moves {
                manager.handle_gesture(Gesture::Up);
            }
            if commit {
                manager.handle_gesture(Gesture::Left);
                prop_assert!(matches!(manager.current_page_id(), PageId::Detail(_)));
                manager.handle_gesture(Gesture::Right);
                prop_assert_eq!(manager.current_page_id(), PageId::Menu);
                prop_assert_eq!(menu_cursor(&manager), Some(cursor_moves % CURRENCY_COUNT));
            }
            manager.handle_gesture(Gesture::Right);
            prop_assert_eq!(manager.current_page_id(), PageId::Welcome);
        }

        #[test]
        fn prop_any_sequence_keeps_selection_valid(gestures in proptest::collection::vec(gesture_strategy(), 0..64)) {
            let state = SharedState::new();
            let mut manager = PageManager::new(&state);
            let mut expected = Currency::Rub;
            for gesture in gestures {
                let action = manager.handle_gesture(gesture);
                if let Some(Action::SelectCurrency(currency)) = action {
                    expected = currency;
                }
                if let Some(cursor) = menu_cursor(&manager) {
                    prop_assert!(cursor < CURRENCY_COUNT);
                }
            }
            prop_assert_eq!(state.selected(), expected);
        }
    }
}
