//! SSD1677 command bytes used by [`Epd4in26`](crate::driver::Epd4in26)
//!
//! Each command is sent with DC low and followed by its parameter bytes with
//! DC high. Only the subset needed for full-frame monochrome refreshes is
//! listed here.

// System control

/// Software reset; wait for BUSY low afterwards
pub const SOFT_RESET: u8 = 0x12;

/// Temperature sensor selection, 1 byte (0x80 = internal sensor)
pub const TEMP_SENSOR_CONTROL: u8 = 0x18;

/// Booster soft-start timing, 5 bytes
pub const BOOSTER_SOFT_START: u8 = 0x0C;

/// Gate count and scan direction, 3 bytes: `[rows-1 LSB, rows-1 MSB, mode]`
pub const DRIVER_OUTPUT_CONTROL: u8 = 0x01;

/// Border waveform, 1 byte
pub const BORDER_WAVEFORM: u8 = 0x3C;

// RAM addressing

/// Address counter direction, 1 byte
///
/// - bit 0: X increments
/// - bit 1: Y increments
/// - bit 2: counter advances along Y first
pub const DATA_ENTRY_MODE: u8 = 0x11;

/// RAM X window, 4 bytes: `[start LSB, start MSB, end LSB, end MSB]`
pub const SET_RAM_X_RANGE: u8 = 0x44;

/// RAM Y window, 4 bytes: `[start LSB, start MSB, end LSB, end MSB]`
pub const SET_RAM_Y_RANGE: u8 = 0x45;

/// RAM X address counter, 2 bytes
pub const SET_RAM_X_COUNTER: u8 = 0x4E;

/// RAM Y address counter, 2 bytes
pub const SET_RAM_Y_COUNTER: u8 = 0x4F;

/// Write black/white RAM (bit 1 = white)
pub const WRITE_RAM_BW: u8 = 0x24;

/// Write the second (previous-frame) RAM
pub const WRITE_RAM_RED: u8 = 0x26;

// Refresh

/// Update sequence selection, 1 byte
pub const DISPLAY_UPDATE_CTRL2: u8 = 0x22;

/// Start the sequence chosen by [`DISPLAY_UPDATE_CTRL2`]; BUSY is high while it runs
pub const MASTER_ACTIVATION: u8 = 0x20;

/// Full refresh: clock and analog on, load temperature and LUT, display, power down
pub const UPDATE_FULL: u8 = 0xF7;

// Power

/// Deep sleep, 1 byte; only a hardware reset wakes the controller
pub const DEEP_SLEEP: u8 = 0x10;

/// Deep sleep mode 1, RAM retained
pub const DEEP_SLEEP_MODE_1: u8 = 0x01;
