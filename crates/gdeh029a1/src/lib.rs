#![cfg_attr(not(test), no_std)]

//! GDEH029A1 (2.9" 128x296 black/white e-paper) driver primitives.

mod framebuffer;
pub mod protocol;

#[cfg(feature = "embedded-graphics")]
mod graphics;

pub use framebuffer::{FrameBuffer, Rotation};

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiDevice,
};

use protocol::cmd;

/// Driver configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// Expected SPI clock in Hz (documented for board glue).
    pub spi_hz: u32,
    /// Upper bound on one BUSY wait.
    pub busy_timeout_ms: u32,
    /// Hold time for each edge of the hardware reset pulse.
    pub reset_pulse_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spi_hz: 4_000_000,
            busy_timeout_ms: 5_000,
            reset_pulse_ms: 10,
        }
    }
}

/// Driver errors.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Error<SpiErr, PinErr> {
    /// SPI transaction failed.
    Spi(SpiErr),
    /// DC, RST or BUSY pin operation failed.
    Pin(PinErr),
    /// BUSY stayed high past `Config::busy_timeout_ms`.
    BusyTimeout,
}

pub type DriverResult<SpiErr, PinErr> = Result<(), Error<SpiErr, PinErr>>;

/// GDEH029A1 driver. BUSY is active high.
#[derive(Debug)]
pub struct Gdeh029a1<SPI, DC, RST, BUSY> {
    spi: SPI,
    dc: DC,
    rst: RST,
    busy: BUSY,
    config: Config,
    initialized: bool,
}

impl<SPI, DC, RST, BUSY, PinErr> Gdeh029a1<SPI, DC, RST, BUSY>
where
    SPI: SpiDevice<u8>,
    DC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    BUSY: InputPin<Error = PinErr>,
{
    pub fn new(spi: SPI, dc: DC, rst: RST, busy: BUSY, config: Config) -> Self {
        Self {
            spi,
            dc,
            rst,
            busy,
            config,
            initialized: false,
        }
    }

    pub fn config(&self) -> Config {
        self.config
    }

    /// Releases owned bus and pins.
    pub fn release(self) -> (SPI, DC, RST, BUSY) {
        (self.spi, self.dc, self.rst, self.busy)
    }

    /// Whether the controller has been configured since the last reset or sleep.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Pulses RST low.
    pub fn hard_reset(&mut self, delay: &mut impl DelayNs) -> DriverResult<SPI::Error, PinErr> {
        self.rst.set_low().map_err(Error::Pin)?;
        delay.delay_ms(self.config.reset_pulse_ms);
        self.rst.set_high().map_err(Error::Pin)?;
        delay.delay_ms(self.config.reset_pulse_ms);
        Ok(())
    }

    /// Resets the controller and loads the full-refresh configuration.
    pub fn init(&mut self, delay: &mut impl DelayNs) -> DriverResult<SPI::Error, PinErr> {
        self.hard_reset(delay)?;
        self.command(cmd::SW_RESET)?;
        self.wait_until_idle(delay)?;

        for &(command, data) in protocol::INIT_SEQUENCE {
            self.command_with_data(command, data)?;
        }

        self.wait_until_idle(delay)?;
        self.initialized = true;
        Ok(())
    }

    /// Copies `buffer` into controller RAM without refreshing.
    pub fn write_frame(&mut self, buffer: &FrameBuffer) -> DriverResult<SPI::Error, PinErr> {
        let x_end = protocol::WIDTH as u16 - 1;
        let y_end = protocol::HEIGHT as u16 - 1;

        self.command_with_data(cmd::SET_RAMXPOS, &protocol::ram_x_window(0, x_end))?;
        self.command_with_data(cmd::SET_RAMYPOS, &protocol::ram_y_window(0, y_end))?;
        self.command_with_data(cmd::SET_RAMX_COUNTER, &[0x00])?;
        self.command_with_data(cmd::SET_RAMY_COUNTER, &protocol::ram_y_counter(0))?;
        self.command_with_data(cmd::WRITE_BW_DATA, buffer.bytes())
    }

    /// Runs a full refresh and blocks until BUSY drops.
    pub fn refresh(&mut self, delay: &mut impl DelayNs) -> DriverResult<SPI::Error, PinErr> {
        self.command_with_data(cmd::DISPLAY_UPDATE_CTRL2, &[protocol::UPDATE_SEQUENCE_FULL])?;
        self.command(cmd::MASTER_ACTIVATE)?;
        self.command(cmd::NOP)?;
        self.wait_until_idle(delay)
    }

    /// Initializes if needed, writes `buffer` and refreshes.
    pub fn display(
        &mut self,
        buffer: &FrameBuffer,
        delay: &mut impl DelayNs,
    ) -> DriverResult<SPI::Error, PinErr> {
        if !self.initialized {
            self.init(delay)?;
        }
        self.write_frame(buffer)?;
        self.refresh(delay)
    }

    /// Enters deep sleep. Only a hardware reset wakes the controller.
    pub fn sleep(&mut self) -> DriverResult<SPI::Error, PinErr> {
        self.command_with_data(cmd::DEEP_SLEEP, &[protocol::DEEP_SLEEP_MODE_1])?;
        self.initialized = false;
        Ok(())
    }

    fn wait_until_idle(&mut self, delay: &mut impl DelayNs) -> DriverResult<SPI::Error, PinErr> {
        let mut waited_ms = 0;
        while self.busy.is_high().map_err(Error::Pin)? {
            if waited_ms >= self.config.busy_timeout_ms {
                return Err(Error::BusyTimeout);
            }
            delay.delay_ms(1);
            waited_ms += 1;
        }
        Ok(())
    }

    fn command(&mut self, command: u8) -> DriverResult<SPI::Error, PinErr> {
        self.dc.set_low().map_err(Error::Pin)?;
        self.spi.write(&[command]).map_err(Error::Spi)
    }

    fn command_with_data(&mut self, command: u8, data: &[u8]) -> DriverResult<SPI::Error, PinErr> {
        self.command(command)?;
        self.dc.set_high().map_err(Error::Pin)?;
        self.spi.write(data).map_err(Error::Spi)
    }
}
