//! SSD1306 128x64 OLED behind the core `TextDisplay` trait

use display_interface::{DisplayError, WriteOnlyDataCommand};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::info;
use ratedeck_core::ui::{Screen, TextDisplay, draw_screen};
use ssd1306::Ssd1306;
use ssd1306::mode::{BufferedGraphicsMode, DisplayConfig};
use ssd1306::rotation::DisplayRotation;
use ssd1306::size::DisplaySize128x64;

type Driver<DI> = Ssd1306<DI, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

/// Buffered OLED driver; every [`TextDisplay::show`] redraws the buffer and
/// flushes it in one transfer.
///
/// The reset pin is kept so the line stays driven high.
pub struct OledDisplay<DI, RST> {
    driver: Driver<DI>,
    _rst: RST,
}

impl<DI, RST> OledDisplay<DI, RST>
where
    DI: WriteOnlyDataCommand,
    RST: OutputPin,
{
    /// Pulse the reset line, initialise the controller and blank the panel
    pub fn new<D: DelayNs>(interface: DI, mut rst: RST, delay: &mut D) -> Result<Self, DisplayError> {
        let mut driver = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();

        driver
            .reset(&mut rst, delay)
            .map_err(|_| DisplayError::RSError)?;
        driver.init()?;
        driver.clear_buffer();
        driver.flush()?;

        info!("SSD1306 initialized");
        Ok(Self { driver, _rst: rst })
    }
}

impl<DI, RST> TextDisplay for OledDisplay<DI, RST>
where
    DI: WriteOnlyDataCommand,
{
    type Error = DisplayError;

    fn show(&mut self, screen: &Screen) -> Result<(), Self::Error> {
        draw_screen(screen, &mut self.driver)?;
        self.driver.flush()
    }
}
