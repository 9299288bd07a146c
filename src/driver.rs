//! SSD1677 driver for the 4.26" 800x480 e-Paper panel
//!
//! [`Epd4in26`] implements [`Panel`] on top of a [`DisplayInterface`] and an
//! embedded-hal delay, so the renderer can drive real hardware exactly as it
//! drives [`MemoryPanel`](crate::panel::MemoryPanel).
//!
//! ## Refresh model
//!
//! Every `display` is a full refresh: the frame is written to both the
//! black/white RAM and the previous-frame RAM, then update sequence `0xF7`
//! runs (power on, load LUT, display, power off). The panel keeps the image
//! without power, so the renderer puts the controller into deep sleep right
//! after.
//!
//! ## Example
//!
//! ```rust,no_run
//! use http_image_display::{Config, Epd4in26, Interface, Renderer};
//! # use core::convert::Infallible;
//! # use embedded_hal::delay::DelayNs;
//! # use embedded_hal::digital::{InputPin, OutputPin};
//! # use embedded_hal::spi::{Operation, SpiDevice};
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiDevice for MockSpi {
//! #     fn transaction(
//! #         &mut self,
//! #         _operations: &mut [Operation<'_, u8>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl InputPin for MockPin {
//! #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! let interface = Interface::new(MockSpi, MockPin, MockPin, MockPin);
//! let panel = Epd4in26::new(interface, MockDelay);
//!
//! let Ok(config) = Config::panel_4in26("10.0.0.2", "/image.bin") else {
//!     return;
//! };
//! let mut renderer = Renderer::new(panel, config.rotation);
//! let frame = [0xFFu8; 48_000];
//! let _ = renderer.render(&frame, frame.len());
//! ```

use core::fmt::Debug;
use embedded_hal::delay::DelayNs;

use crate::command::*;
use crate::config::{Dimensions, PANEL_4IN26_HEIGHT, PANEL_4IN26_WIDTH};
use crate::error::{BuilderError, MAX_SOURCE_OUTPUTS};
use crate::interface::DisplayInterface;
use crate::panel::Panel;

/// Booster soft-start values for the 4.26" panel
pub const BOOSTER_4IN26: [u8; 5] = [0xAE, 0xC7, 0xC3, 0xC0, 0x80];

/// Gate scan mode byte of `DRIVER_OUTPUT_CONTROL`
const GATE_SCANNING: u8 = 0x02;

/// Border follows the white LUT
const BORDER_WHITE: u8 = 0x01;

/// X increments, Y decrements
const DATA_ENTRY_X_INC_Y_DEC: u8 = 0x01;

/// Internal temperature sensor
const TEMP_SENSOR_INTERNAL: u8 = 0x80;

/// Errors raised by [`Epd4in26`]
#[derive(Debug)]
pub enum DriverError<E> {
    /// The interface failed
    Interface(E),
    /// `display` was handed a frame of the wrong size
    FrameSize {
        /// Bytes in one full frame
        expected: usize,
        /// Bytes provided
        actual: usize,
    },
}

impl<E: Debug> core::fmt::Display for DriverError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Interface(e) => write!(f, "Interface error: {e:?}"),
            Self::FrameSize { expected, actual } => {
                write!(f, "Frame is {actual} bytes, panel needs {expected}")
            }
        }
    }
}

impl<E: Debug> core::error::Error for DriverError<E> {}

type DriverResult<I> = Result<(), DriverError<<I as DisplayInterface>::Error>>;

/// SSD1677 panel driver
///
/// Owns the interface and the delay provider for its whole life; the
/// renderer only ever sees the [`Panel`] primitives.
#[derive(Debug)]
pub struct Epd4in26<I, D>
where
    I: DisplayInterface,
    D: DelayNs,
{
    interface: I,
    delay: D,
    dims: Dimensions,
}

impl<I, D> Epd4in26<I, D>
where
    I: DisplayInterface,
    D: DelayNs,
{
    /// Create a driver for the 800x480 panel
    pub fn new(interface: I, delay: D) -> Self {
        Self {
            interface,
            delay,
            dims: Dimensions {
                width: PANEL_4IN26_WIDTH,
                height: PANEL_4IN26_HEIGHT,
            },
        }
    }

    /// Create a driver for another SSD1677 panel geometry
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidDimensions` if `dims` is outside the
    /// controller's limits (see [`Dimensions::new`]).
    pub fn with_dimensions(
        interface: I,
        delay: D,
        dims: Dimensions,
    ) -> Result<Self, BuilderError> {
        let dims = Dimensions::new(dims.width, dims.height)?;
        Ok(Self {
            interface,
            delay,
            dims,
        })
    }

    /// Access the interface
    pub fn interface(&self) -> &I {
        &self.interface
    }

    /// Give back the interface and the delay provider
    pub fn release(self) -> (I, D) {
        (self.interface, self.delay)
    }

    fn command(&mut self, command: u8, data: &[u8]) -> DriverResult<I> {
        self.interface
            .send_command(command)
            .map_err(DriverError::Interface)?;
        if !data.is_empty() {
            self.interface
                .send_data(data)
                .map_err(DriverError::Interface)?;
        }
        Ok(())
    }

    fn wait_idle(&mut self) -> DriverResult<I> {
        self.interface
            .busy_wait(&mut self.delay)
            .map_err(DriverError::Interface)
    }

    /// Full-panel RAM window, X in pixels, Y counting down from the last row
    fn set_full_window(&mut self) -> DriverResult<I> {
        let x_end = self.dims.width - 1;
        let y_end = self.dims.height - 1;

        self.command(DATA_ENTRY_MODE, &[DATA_ENTRY_X_INC_Y_DEC])?;
        self.command(SET_RAM_X_RANGE, &[0, 0, (x_end % 256) as u8, (x_end / 256) as u8])?;
        self.command(SET_RAM_Y_RANGE, &[(y_end % 256) as u8, (y_end / 256) as u8, 0, 0])?;
        self.set_cursor()
    }

    fn set_cursor(&mut self) -> DriverResult<I> {
        let y_end = self.dims.height - 1;
        self.command(SET_RAM_X_COUNTER, &[0, 0])?;
        self.command(SET_RAM_Y_COUNTER, &[(y_end % 256) as u8, (y_end / 256) as u8])
    }

    /// Fill one RAM plane with `value`, one row per transfer
    fn fill_ram(&mut self, ram: u8, value: u8) -> DriverResult<I> {
        let row = [value; MAX_SOURCE_OUTPUTS as usize / 8];
        let row_bytes = self.dims.row_bytes();

        self.set_cursor()?;
        self.command(ram, &[])?;
        for _ in 0..self.dims.height {
            self.interface
                .send_data(&row[..row_bytes])
                .map_err(DriverError::Interface)?;
        }
        Ok(())
    }

    fn write_ram(&mut self, ram: u8, frame: &[u8]) -> DriverResult<I> {
        self.set_cursor()?;
        self.command(ram, frame)
    }

    fn refresh(&mut self) -> DriverResult<I> {
        self.command(DISPLAY_UPDATE_CTRL2, &[UPDATE_FULL])?;
        self.command(MASTER_ACTIVATION, &[])?;
        self.wait_idle()
    }
}

impl<I, D> Panel for Epd4in26<I, D>
where
    I: DisplayInterface,
    D: DelayNs,
{
    type Error = DriverError<I::Error>;

    fn dimensions(&self) -> Dimensions {
        self.dims
    }

    fn module_init(&mut self) -> Result<(), Self::Error> {
        self.interface.begin().map_err(|e| {
            log::error!("Display interface init failed: {:?}", e);
            DriverError::Interface(e)
        })
    }

    fn module_exit(&mut self) {
        self.interface.end();
    }

    fn init(&mut self) -> Result<(), Self::Error> {
        self.interface
            .reset(&mut self.delay)
            .map_err(DriverError::Interface)?;
        self.wait_idle()?;

        self.command(SOFT_RESET, &[])?;
        self.wait_idle()?;

        self.command(TEMP_SENSOR_CONTROL, &[TEMP_SENSOR_INTERNAL])?;
        self.command(BOOSTER_SOFT_START, &BOOSTER_4IN26)?;

        let rows = self.dims.height - 1;
        self.command(
            DRIVER_OUTPUT_CONTROL,
            &[(rows % 256) as u8, (rows / 256) as u8, GATE_SCANNING],
        )?;
        self.command(BORDER_WAVEFORM, &[BORDER_WHITE])?;

        self.set_full_window()?;
        self.wait_idle()
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.fill_ram(WRITE_RAM_BW, 0xFF)?;
        self.fill_ram(WRITE_RAM_RED, 0xFF)?;
        self.refresh()
    }

    fn display(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        let expected = self.dims.frame_size();
        if frame.len() != expected {
            return Err(DriverError::FrameSize {
                expected,
                actual: frame.len(),
            });
        }
        self.write_ram(WRITE_RAM_BW, frame)?;
        self.write_ram(WRITE_RAM_RED, frame)?;
        self.refresh()
    }

    fn sleep(&mut self) -> Result<(), Self::Error> {
        self.command(DEEP_SLEEP, &[DEEP_SLEEP_MODE_1])
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    #[derive(Debug, Default)]
    struct MockInterface {
        active: bool,
        resets: usize,
        busy_waits: usize,
        command_data: Vec<(u8, Vec<u8>)>,
    }

    impl MockInterface {
        fn commands(&self) -> Vec<u8> {
            self.command_data.iter().map(|(c, _)| *c).collect()
        }

        fn data_for(&self, command: u8) -> Vec<u8> {
            self.command_data
                .iter()
                .filter(|(c, _)| *c == command)
                .flat_map(|(_, d)| d.iter().copied())
                .collect()
        }
    }

    impl DisplayInterface for MockInterface {
        type Error = &'static str;

        fn begin(&mut self) -> Result<(), Self::Error> {
            if self.active {
                return Err("already active");
            }
            self.active = true;
            Ok(())
        }

        fn end(&mut self) {
            self.active = false;
        }

        fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
            self.command_data.push((command, Vec::new()));
            Ok(())
        }

        fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
            match self.command_data.last_mut() {
                Some((_, bytes)) => {
                    bytes.extend_from_slice(data);
                    Ok(())
                }
                None => Err("data without command"),
            }
        }

        fn reset<D: DelayNs>(&mut self, _delay: &mut D) -> Result<(), Self::Error> {
            self.resets += 1;
            Ok(())
        }

        fn busy_wait<D: DelayNs>(&mut self, _delay: &mut D) -> Result<(), Self::Error> {
            self.busy_waits += 1;
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct MockDelay {
        total_ms: u32,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, _ns: u32) {}
        fn delay_ms(&mut self, ms: u32) {
            self.total_ms += ms;
        }
    }

    fn epd() -> Epd4in26<MockInterface, MockDelay> {
        Epd4in26::new(MockInterface::default(), MockDelay::default())
    }

    #[test]
    fn test_with_dimensions_rejects_invalid() {
        for (width, height) in [(1200, 10), (800, 0), (0, 480), (804, 480), (800, 700)] {
            let result = Epd4in26::with_dimensions(
                MockInterface::default(),
                MockDelay::default(),
                Dimensions { width, height },
            );
            assert!(matches!(
                result,
                Err(BuilderError::InvalidDimensions { width: w, height: h }) if w == width && h == height
            ));
        }
    }

    #[test]
    fn test_with_dimensions_drives_smaller_panel() {
        let mut epd = Epd4in26::with_dimensions(
            MockInterface::default(),
            MockDelay::default(),
            Dimensions {
                width: 960,
                height: 16,
            },
        )
        .unwrap();
        epd.clear().unwrap();

        let bw = epd.interface().data_for(WRITE_RAM_BW);
        assert_eq!(bw.len(), 120 * 16);
        // 15 = 0x000F
        assert_eq!(epd.interface().data_for(SET_RAM_Y_COUNTER), vec![0x0F, 0x00, 0x0F, 0x00]);
    }

    #[test]
    fn test_module_init_twice_fails() {
        let mut epd = epd();
        assert!(epd.module_init().is_ok());
        assert!(matches!(
            epd.module_init(),
            Err(DriverError::Interface("already active"))
        ));
        epd.module_exit();
        assert!(epd.module_init().is_ok());
    }

    #[test]
    fn test_init_sequence() {
        let mut epd = epd();
        epd.init().unwrap();

        let interface = epd.interface();
        assert_eq!(interface.resets, 1);
        assert_eq!(
            interface.commands(),
            vec![
                SOFT_RESET,
                TEMP_SENSOR_CONTROL,
                BOOSTER_SOFT_START,
                DRIVER_OUTPUT_CONTROL,
                BORDER_WAVEFORM,
                DATA_ENTRY_MODE,
                SET_RAM_X_RANGE,
                SET_RAM_Y_RANGE,
                SET_RAM_X_COUNTER,
                SET_RAM_Y_COUNTER,
            ]
        );
        // 479 = 0x01DF
        assert_eq!(interface.data_for(DRIVER_OUTPUT_CONTROL), vec![0xDF, 0x01, 0x02]);
        // 799 = 0x031F
        assert_eq!(interface.data_for(SET_RAM_X_RANGE), vec![0x00, 0x00, 0x1F, 0x03]);
        assert_eq!(interface.data_for(SET_RAM_Y_RANGE), vec![0xDF, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_clear_fills_both_planes_white() {
        let mut epd = epd();
        epd.clear().unwrap();

        let interface = epd.interface();
        let bw = interface.data_for(WRITE_RAM_BW);
        let red = interface.data_for(WRITE_RAM_RED);
        assert_eq!(bw.len(), 48_000);
        assert_eq!(red.len(), 48_000);
        assert!(bw.iter().chain(red.iter()).all(|b| *b == 0xFF));
        assert_eq!(interface.data_for(DISPLAY_UPDATE_CTRL2), vec![UPDATE_FULL]);
        assert_eq!(interface.commands().last(), Some(&MASTER_ACTIVATION));
    }

    #[test]
    fn test_display_writes_frame_and_refreshes() {
        let mut epd = epd();
        let mut frame = vec![0xFFu8; 48_000];
        frame[0] = 0x00;
        epd.display(&frame).unwrap();

        let interface = epd.interface();
        assert_eq!(interface.data_for(WRITE_RAM_BW), frame);
        assert_eq!(interface.data_for(WRITE_RAM_RED), frame);
        assert_eq!(interface.busy_waits, 1);
    }

    #[test]
    fn test_display_rejects_wrong_frame_size() {
        let mut epd = epd();
        let result = epd.display(&[0u8; 100]);
        assert!(matches!(
            result,
            Err(DriverError::FrameSize {
                expected: 48_000,
                actual: 100
            })
        ));
        assert!(epd.interface().command_data.is_empty());
    }

    #[test]
    fn test_sleep_enters_deep_sleep_mode_1() {
        let mut epd = epd();
        epd.sleep().unwrap();
        assert_eq!(
            epd.interface().command_data,
            vec![(DEEP_SLEEP, vec![DEEP_SLEEP_MODE_1])]
        );
    }

    #[test]
    fn test_delay_uses_provider() {
        let mut epd = epd();
        epd.delay_ms(500);
        epd.delay_ms(2000);
        let (_, delay) = epd.release();
        assert_eq!(delay.total_ms, 2500);
    }

    #[test]
    fn test_renderer_drives_driver_end_to_end() {
        use crate::config::Rotation;
        use crate::render::{RenderOutcome, Renderer};

        let mut renderer = Renderer::new(epd(), Rotation::Rotate0);
        let frame = vec![0x0Fu8; 48_000];
        assert_eq!(renderer.render(&frame, frame.len()), Ok(RenderOutcome::Direct));

        let epd = renderer.into_panel();
        assert!(!epd.interface().active);
        assert_eq!(epd.interface().commands().last(), Some(&DEEP_SLEEP));
        let (_, delay) = epd.release();
        assert_eq!(delay.total_ms, 500 + 2000 + 2000);
    }
}
