//! Monochrome color type for 1-bpp e-paper frames
//!
//! Frames are bit-packed, one bit per pixel, most significant bit first:
//!
//! | Color | Bit |
//! |-------|-----|
//! | Black | 0   |
//! | White | 1   |
//!
//! ## Example
//!
//! ```
//! use http_image_display::Color;
//!
//! assert_eq!(Color::White.fill_byte(), 0xFF);
//! assert_eq!(Color::Black.fill_byte(), 0x00);
//! ```

use embedded_graphics_core::pixelcolor::BinaryColor;
use embedded_graphics_core::pixelcolor::raw::RawU1;
use embedded_graphics_core::prelude::PixelColor;

/// Colors of a black/white e-paper panel
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Color {
    /// Black pixels (bit cleared)
    Black,
    /// White pixels (bit set), the panel's blank state
    #[default]
    White,
}

impl PixelColor for Color {
    type Raw = RawU1;
}

impl Color {
    /// Byte value that fills eight pixels with this color
    pub fn fill_byte(self) -> u8 {
        match self {
            Self::Black => 0x00,
            Self::White => 0xFF,
        }
    }

    /// Whether the pixel bit is set for this color
    pub fn is_set(self) -> bool {
        self == Self::White
    }
}

impl From<BinaryColor> for Color {
    fn from(color: BinaryColor) -> Self {
        match color {
            BinaryColor::On => Self::Black,
            BinaryColor::Off => Self::White,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_color_on_is_ink() {
        assert_eq!(Color::from(BinaryColor::On), Color::Black);
        assert_eq!(Color::from(BinaryColor::Off), Color::White);
    }

    #[test]
    fn test_default_is_blank_paper() {
        assert_eq!(Color::default(), Color::White);
        assert!(Color::default().is_set());
    }
}
