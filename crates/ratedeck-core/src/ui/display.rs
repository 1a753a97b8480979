// src/ui/display.rs
//! Display sink abstraction

use super::screen::Screen;

/// A device that can present a full [`Screen`] frame.
///
/// The firmware implements this for the SSD1306 panel and the simulator for
/// the terminal.
pub trait TextDisplay {
    type Error: core::fmt::Debug;

    fn show(&mut self, screen: &Screen) -> Result<(), Self::Error>;
}

impl<T: TextDisplay> TextDisplay for &mut T {
    type Error = T::Error;

    fn show(&mut self, screen: &Screen) -> Result<(), Self::Error> {
        (**self).show(screen)
    }
}
