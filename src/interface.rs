//! SPI and GPIO control interface for the panel controller
//!
//! [`DisplayInterface`] is the seam between the SSD1677 command layer in
//! [`driver`](crate::driver) and the board. [`Interface`] implements it for
//! any embedded-hal 1.0 SPI device plus three GPIO lines:
//!
//! - **DC**: data/command select (output, low = command)
//! - **RST**: reset (output, active low)
//! - **BUSY**: controller busy (input, active high on SSD1677)
//!
//! The interface has to be brought up with [`DisplayInterface::begin`] before
//! any command is sent, and released with [`DisplayInterface::end`].

use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

/// Board-level access to the panel controller
///
/// ## Implementing
///
/// [`Interface`] covers the usual wiring. Implement this yourself when the
/// board needs something else, for example a chip select driven by hand or a
/// power-enable line switched in `begin`/`end`.
pub trait DisplayInterface {
    /// Error type for interface operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Claim the bus and put the control lines in their idle state
    ///
    /// # Errors
    ///
    /// Fails if the interface is already claimed or a line cannot be driven.
    fn begin(&mut self) -> Result<(), Self::Error>;

    /// Release the bus
    ///
    /// Safe to call when not claimed.
    fn end(&mut self);

    /// Send one command byte (DC low)
    fn send_command(&mut self, command: u8) -> Result<(), Self::Error>;

    /// Send parameter or pixel bytes (DC high)
    fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Pulse RST low for at least 10 ms, then give the controller 10 ms
    fn reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Self::Error>;

    /// Poll BUSY until the controller is idle
    ///
    /// # Errors
    ///
    /// Returns a timeout error if BUSY stays asserted for longer than the
    /// implementation's limit.
    fn busy_wait<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Self::Error>;
}

/// Errors raised by [`Interface`]
#[derive(Debug)]
pub enum InterfaceError<SpiErr, PinErr> {
    /// SPI transfer failed
    Spi(SpiErr),
    /// GPIO access failed
    Pin(PinErr),
    /// BUSY stayed asserted past the timeout
    Timeout,
    /// `begin` was called while already claimed
    AlreadyActive,
    /// A transfer was attempted before `begin`
    NotActive,
}

impl<SpiErr: Debug, PinErr: Debug> core::fmt::Display for InterfaceError<SpiErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Spi(e) => write!(f, "SPI error: {e:?}"),
            Self::Pin(e) => write!(f, "Pin error: {e:?}"),
            Self::Timeout => write!(f, "Timeout waiting for display"),
            Self::AlreadyActive => write!(f, "Display interface already active"),
            Self::NotActive => write!(f, "Display interface not initialized"),
        }
    }
}

impl<SpiErr: Debug, PinErr: Debug> core::error::Error for InterfaceError<SpiErr, PinErr> {}

/// Default BUSY timeout in milliseconds
///
/// A full refresh of the 4.26" panel takes a few seconds; this leaves margin.
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 30_000;

/// Reset pulse width and recovery time in milliseconds
pub const RESET_PULSE_MS: u32 = 10;

/// [`DisplayInterface`] over embedded-hal SPI and GPIO
///
/// ## Example
///
/// ```rust,no_run
/// use http_image_display::{DisplayInterface, Interface};
/// # use core::convert::Infallible;
/// # use embedded_hal::digital::{InputPin, OutputPin};
/// # use embedded_hal::spi::{Operation, SpiDevice};
/// # struct MockSpi;
/// # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
/// # impl SpiDevice for MockSpi {
/// #     fn transaction(
/// #         &mut self,
/// #         _operations: &mut [Operation<'_, u8>],
/// #     ) -> Result<(), Self::Error> {
/// #         Ok(())
/// #     }
/// # }
/// # struct MockPin;
/// # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
/// # impl OutputPin for MockPin {
/// #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
/// #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
/// # }
/// # impl InputPin for MockPin {
/// #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(false) }
/// #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(true) }
/// # }
/// let mut interface = Interface::new(MockSpi, MockPin, MockPin, MockPin);
/// if interface.begin().is_ok() {
///     let _ = interface.send_command(0x12);
///     interface.end();
/// }
/// ```
#[derive(Debug)]
pub struct Interface<SPI, DC, RST, BUSY> {
    spi: SPI,
    dc: DC,
    rst: RST,
    busy: BUSY,
    busy_timeout_ms: u32,
    busy_active_high: bool,
    active: bool,
}

impl<SPI, DC, RST, BUSY> Interface<SPI, DC, RST, BUSY>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
{
    /// Wrap an SPI device and the DC, RST and BUSY lines
    pub fn new(spi: SPI, dc: DC, rst: RST, busy: BUSY) -> Self {
        Self {
            spi,
            dc,
            rst,
            busy,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            busy_active_high: true,
            active: false,
        }
    }

    /// Set the BUSY timeout in milliseconds; 0 waits forever
    pub fn set_busy_timeout(&mut self, timeout_ms: u32) -> &mut Self {
        self.busy_timeout_ms = timeout_ms;
        self
    }

    /// Current BUSY timeout in milliseconds
    pub fn busy_timeout(&self) -> u32 {
        self.busy_timeout_ms
    }

    /// Set BUSY polarity; SSD1677 boards are active high
    pub fn set_busy_active_high(&mut self, active_high: bool) -> &mut Self {
        self.busy_active_high = active_high;
        self
    }

    /// Whether `begin` has been called without a matching `end`
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Give back the SPI device and pins
    pub fn release(self) -> (SPI, DC, RST, BUSY) {
        (self.spi, self.dc, self.rst, self.busy)
    }
}

impl<SPI, DC, RST, BUSY, PinErr> DisplayInterface for Interface<SPI, DC, RST, BUSY>
where
    SPI: SpiDevice,
    SPI::Error: Debug,
    DC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    BUSY: InputPin<Error = PinErr>,
    PinErr: Debug,
{
    type Error = InterfaceError<SPI::Error, PinErr>;

    fn begin(&mut self) -> Result<(), Self::Error> {
        if self.active {
            return Err(InterfaceError::AlreadyActive);
        }
        // Idle: out of reset, command mode
        self.rst.set_high().map_err(InterfaceError::Pin)?;
        self.dc.set_low().map_err(InterfaceError::Pin)?;
        self.active = true;
        Ok(())
    }

    fn end(&mut self) {
        if self.active {
            let _ = self.dc.set_low();
        }
        self.active = false;
    }

    fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
        if !self.active {
            return Err(InterfaceError::NotActive);
        }
        self.dc.set_low().map_err(InterfaceError::Pin)?;
        self.spi.write(&[command]).map_err(InterfaceError::Spi)
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        if !self.active {
            return Err(InterfaceError::NotActive);
        }
        self.dc.set_high().map_err(InterfaceError::Pin)?;
        self.spi.write(data).map_err(InterfaceError::Spi)
    }

    fn reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Self::Error> {
        self.rst.set_low().map_err(InterfaceError::Pin)?;
        delay.delay_ms(RESET_PULSE_MS);
        self.rst.set_high().map_err(InterfaceError::Pin)?;
        delay.delay_ms(RESET_PULSE_MS);
        Ok(())
    }

    fn busy_wait<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Self::Error> {
        let mut waited_ms = 0u32;
        loop {
            let level = if self.busy_active_high {
                self.busy.is_high()
            } else {
                self.busy.is_low()
            };
            if !level.map_err(InterfaceError::Pin)? {
                return Ok(());
            }

            delay.delay_ms(1);
            waited_ms = waited_ms.saturating_add(1);
            if self.busy_timeout_ms > 0 && waited_ms >= self.busy_timeout_ms {
                log::error!("Display still busy after {} ms", waited_ms);
                return Err(InterfaceError::Timeout);
            }
        }
    }
}
