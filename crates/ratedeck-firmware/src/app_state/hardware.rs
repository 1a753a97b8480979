//! Hardware initialization for the ratedeck board
//!
//! Pin map (ESP32 DevKit):
//!
//! | Signal        | GPIO |
//! |---------------|------|
//! | OLED MOSI     | 23   |
//! | OLED SCLK     | 18   |
//! | OLED CS       | 5    |
//! | OLED DC       | 27   |
//! | OLED RESET    | 17   |
//! | APDS-9960 SDA | 25   |
//! | APDS-9960 SCL | 26   |
//!
//! Every function here panics on failure: without the display or the
//! gesture sensor the device has nothing to do, and the panic handler
//! resets the chip.

use display_interface_spi::SPIInterface;
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::spi::master::{Config as SpiConfig, Spi};
use esp_hal::time::Rate;
use esp_hal::{Async, Blocking};
use log::info;

use crate::apds9960::Apds9960;
use crate::display::OledDisplay;

/// I2C bus speed for the gesture sensor
pub const I2C_FREQUENCY_KHZ: u32 = 100;

/// SPI clock for the OLED
pub const SPI_FREQUENCY_MHZ: u32 = 8;

pub type GestureI2c = I2c<'static, Async>;
pub type OledSpi = ExclusiveDevice<Spi<'static, Blocking>, Output<'static>, NoDelay>;
pub type OledInterface = SPIInterface<OledSpi, Output<'static>>;
pub type Oled = OledDisplay<OledInterface, Output<'static>>;

/// Create the I2C bus the gesture sensor sits on
pub fn create_i2c_bus(
    i2c0: esp_hal::peripherals::I2C0<'static>,
    sda: esp_hal::peripherals::GPIO25<'static>,
    scl: esp_hal::peripherals::GPIO26<'static>,
) -> GestureI2c {
    I2c::new(
        i2c0,
        I2cConfig::default().with_frequency(Rate::from_khz(I2C_FREQUENCY_KHZ)),
    )
    .expect("Failed to configure I2C bus")
    .with_sda(sda)
    .with_scl(scl)
    .into_async()
}

/// Bring up the APDS-9960 in gesture mode
pub async fn init_gesture_sensor(i2c: GestureI2c) -> Apds9960<GestureI2c> {
    let mut sensor = Apds9960::new(i2c);
    sensor
        .init()
        .await
        .expect("Failed to initialize APDS-9960 gesture sensor");
    info!("Gesture sensor ready");
    sensor
}

/// Bring up the SSD1306 on the SPI bus
pub fn init_display(
    spi2: esp_hal::peripherals::SPI2<'static>,
    sclk: esp_hal::peripherals::GPIO18<'static>,
    mosi: esp_hal::peripherals::GPIO23<'static>,
    cs: esp_hal::peripherals::GPIO5<'static>,
    dc: esp_hal::peripherals::GPIO27<'static>,
    rst: esp_hal::peripherals::GPIO17<'static>,
) -> Oled {
    // 1. Configure SPI bus
    let spi_bus = Spi::new(
        spi2,
        SpiConfig::default().with_frequency(Rate::from_mhz(SPI_FREQUENCY_MHZ)),
    )
    .expect("Failed to configure SPI bus")
    .with_sck(sclk)
    .with_mosi(mosi);

    // 2. Wrap the bus and chip select as a SPI device
    let cs = Output::new(cs, Level::High, OutputConfig::default());
    let spi_device =
        ExclusiveDevice::new_no_delay(spi_bus, cs).expect("Failed to create SPI device");

    // 3. Data/command and reset lines
    let dc = Output::new(dc, Level::Low, OutputConfig::default());
    let rst = Output::new(rst, Level::High, OutputConfig::default());

    let interface = SPIInterface::new(spi_device, dc);
    OledDisplay::new(interface, rst, &mut embassy_time::Delay)
        .expect("Failed to initialize display")
}
