use embedded_hal_async::i2c::I2c;
use log::{debug, info};
use ratedeck_core::gesture::{
    FifoStatus, FifoStep, Gesture, GestureDecoder, GestureSample, GestureSource,
};

// =============================================================================
// I2C Address
// =============================================================================

/// APDS-9960 I2C address
pub const I2C_ADDR: u8 = 0x39;

/// Values the ID register reports on genuine parts and common clones
pub const DEVICE_IDS: [u8; 3] = [0xAB, 0x9C, 0xA8];

// =============================================================================
// Register Addresses
// =============================================================================

pub const ADDR_ENABLE: u8 = 0x80;
pub const ADDR_ATIME: u8 = 0x81;
pub const ADDR_WTIME: u8 = 0x83;
pub const ADDR_PPULSE: u8 = 0x8E;
pub const ADDR_CONTROL: u8 = 0x8F;
pub const ADDR_CONFIG1: u8 = 0x8D;
pub const ADDR_CONFIG2: u8 = 0x90;
pub const ADDR_ID: u8 = 0x92;
pub const ADDR_POFFSET_UR: u8 = 0x9D;
pub const ADDR_POFFSET_DL: u8 = 0x9E;
pub const ADDR_CONFIG3: u8 = 0x9F;

// Gesture engine
pub const ADDR_GPENTH: u8 = 0xA0;
pub const ADDR_GEXTH: u8 = 0xA1;
pub const ADDR_GCONF1: u8 = 0xA2;
pub const ADDR_GCONF2: u8 = 0xA3;
pub const ADDR_GOFFSET_U: u8 = 0xA4;
pub const ADDR_GOFFSET_D: u8 = 0xA5;
pub const ADDR_GPULSE: u8 = 0xA6;
pub const ADDR_GOFFSET_L: u8 = 0xA7;
pub const ADDR_GOFFSET_R: u8 = 0xA9;
pub const ADDR_GCONF3: u8 = 0xAA;
pub const ADDR_GCONF4: u8 = 0xAB;
pub const ADDR_GFLVL: u8 = 0xAE;
pub const ADDR_GSTATUS: u8 = 0xAF;
pub const ADDR_GFIFO_U: u8 = 0xFC;

// =============================================================================
// Register Values
// =============================================================================

/// Power on, wait, proximity and gesture engines enabled
pub const ENABLE_GESTURE: u8 = 0x4D;
pub const ATIME_DEFAULT: u8 = 219;
pub const WTIME_DEFAULT: u8 = 246;
/// 16us pulse length, 8 pulses
pub const PPULSE_DEFAULT: u8 = 0x87;
pub const CONFIG1_DEFAULT: u8 = 0x60;
/// 100mA LED drive, 4x proximity gain, 4x ALS gain
pub const CONTROL_DEFAULT: u8 = 0x09;
/// 300% LED boost
pub const CONFIG2_DEFAULT: u8 = 0x31;
/// Proximity level that enters the gesture engine
pub const GPENTH_DEFAULT: u8 = 40;
/// Proximity level that exits the gesture engine
pub const GEXTH_DEFAULT: u8 = 30;
/// Interrupt after 4 datasets
pub const GCONF1_DEFAULT: u8 = 0x40;
/// 4x gain, 100mA drive, 2.8ms wait between datasets
pub const GCONF2_DEFAULT: u8 = 0x41;
/// 32us pulse length, 10 pulses
pub const GPULSE_DEFAULT: u8 = 0xC9;
/// GMODE set: run the gesture state machine
pub const GCONF4_GMODE: u8 = 0x01;
/// Writing this bit empties the gesture FIFO
pub const GCONF4_GFIFO_CLR: u8 = 0x04;
pub const GSTATUS_GVALID: u8 = 0x01;

/// Depth of the gesture FIFO in datasets
pub const FIFO_DEPTH: usize = 32;

// =============================================================================
// Driver Error Type
// =============================================================================

/// Errors that can occur during APDS-9960 operations
#[derive(Debug)]
pub enum Error<E> {
    /// I2C communication error
    I2c(E),
    /// Invalid data received from device
    InvalidData,
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Self::I2c(e)
    }
}

// =============================================================================
// Driver Implementation
// =============================================================================

/// APDS-9960 proximity and gesture sensor driver with async I2C interface.
///
/// Only the gesture engine is used. Each [`GestureSource::read_gesture`]
/// call samples GSTATUS, GCONF4 and GFLVL and lets [`FifoStatus`] decide
/// whether to drain the FIFO. A gesture is reported once the engine has
/// left gesture mode and the FIFO is empty.
pub struct Apds9960<I2C> {
    i2c: I2C,
    decoder: GestureDecoder,
}

impl<I2C> Apds9960<I2C>
where
    I2C: I2c,
{
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            decoder: GestureDecoder::new(),
        }
    }

    // =========================================================================
    // Private I2C Helper Methods
    // =========================================================================

    async fn read_byte(&mut self, addr: u8) -> Result<u8, Error<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(I2C_ADDR, &[addr], &mut buf).await?;
        Ok(buf[0])
    }

    async fn write_byte(&mut self, addr: u8, data: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c.write(I2C_ADDR, &[addr, data]).await?;
        Ok(())
    }

    // =========================================================================
    // Setup
    // =========================================================================

    /// Read the device ID register
    pub async fn read_id(&mut self) -> Result<u8, Error<I2C::Error>> {
        self.read_byte(ADDR_ID).await
    }

    /// Check the part, load the gesture configuration and start the engine
    pub async fn init(&mut self) -> Result<(), Error<I2C::Error>> {
        let id = self.read_id().await?;
        if !DEVICE_IDS.contains(&id) {
            return Err(Error::InvalidData);
        }
        info!("APDS-9960 found (id {:#04x})", id);

        // Everything off while configuring
        self.write_byte(ADDR_ENABLE, 0x00).await?;

        let settings = [
            (ADDR_ATIME, ATIME_DEFAULT),
            (ADDR_WTIME, WTIME_DEFAULT),
            (ADDR_PPULSE, PPULSE_DEFAULT),
            (ADDR_POFFSET_UR, 0),
            (ADDR_POFFSET_DL, 0),
            (ADDR_CONFIG1, CONFIG1_DEFAULT),
            (ADDR_CONTROL, CONTROL_DEFAULT),
            (ADDR_CONFIG2, CONFIG2_DEFAULT),
            (ADDR_CONFIG3, 0),
            (ADDR_GPENTH, GPENTH_DEFAULT),
            (ADDR_GEXTH, GEXTH_DEFAULT),
            (ADDR_GCONF1, GCONF1_DEFAULT),
            (ADDR_GCONF2, GCONF2_DEFAULT),
            (ADDR_GOFFSET_U, 0),
            (ADDR_GOFFSET_D, 0),
            (ADDR_GOFFSET_L, 0),
            (ADDR_GOFFSET_R, 0),
            (ADDR_GPULSE, GPULSE_DEFAULT),
            (ADDR_GCONF3, 0),
        ];
        for (addr, value) in settings {
            self.write_byte(addr, value).await?;
        }

        self.write_byte(ADDR_GCONF4, GCONF4_GFIFO_CLR | GCONF4_GMODE).await?;
        self.write_byte(ADDR_ENABLE, ENABLE_GESTURE).await?;
        Ok(())
    }

    // =========================================================================
    // Gesture FIFO
    // =========================================================================

    /// Sample the gesture engine state
    pub async fn fifo_status(&mut self) -> Result<FifoStatus, Error<I2C::Error>> {
        let status = self.read_byte(ADDR_GSTATUS).await?;
        let conf4 = self.read_byte(ADDR_GCONF4).await?;
        let level = self.read_byte(ADDR_GFLVL).await?;
        Ok(FifoStatus {
            valid: status & GSTATUS_GVALID != 0,
            engine_active: conf4 & GCONF4_GMODE != 0,
            level,
        })
    }

    /// Read `level` datasets from the FIFO into the decoder
    async fn drain_fifo(&mut self, level: u8) -> Result<(), Error<I2C::Error>> {
        let level = level as usize;
        if level > FIFO_DEPTH {
            return Err(Error::InvalidData);
        }

        let mut buf = [0u8; FIFO_DEPTH * 4];
        let bytes = &mut buf[..level * 4];
        self.i2c.write_read(I2C_ADDR, &[ADDR_GFIFO_U], bytes).await?;

        for dataset in bytes.chunks_exact(4) {
            self.decoder
                .push(GestureSample::from_fifo([dataset[0], dataset[1], dataset[2], dataset[3]]));
        }
        Ok(())
    }
}

impl<I2C> GestureSource for Apds9960<I2C>
where
    I2C: I2c,
{
    type Error = Error<I2C::Error>;

    async fn read_gesture(&mut self) -> Result<Option<Gesture>, Self::Error> {
        let status = self.fifo_status().await?;
        match status.next_step() {
            FifoStep::Drain => {
                self.drain_fifo(status.level).await?;
                debug!("Read {} gesture datasets", status.level);
                Ok(None)
            }
            FifoStep::Finish if self.decoder.has_samples() => {
                let gesture = self.decoder.finish();
                debug!("Sweep classified as {:?}", gesture);
                Ok(gesture)
            }
            FifoStep::Finish | FifoStep::Wait => Ok(None),
        }
    }
}
