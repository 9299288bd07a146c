//! Coordinate rotation utilities
//!
//! Frames are stored in the panel's native orientation: rows of `width / 8`
//! bytes, most significant bit first. A rotated canvas swaps its logical
//! width and height for 90° and 270°, and every logical pixel is mapped back
//! to a (byte index, bit mask) pair in the native frame.
//!
//! ## Example
//!
//! ```
//! use http_image_display::{rotation::locate, Dimensions, Rotation};
//!
//! let Ok(dims) = Dimensions::new(16, 2) else {
//!     return;
//! };
//!
//! // Native orientation: (0,0) is the MSB of byte 0
//! assert_eq!(locate(0, 0, dims, Rotation::Rotate0), (0, 0x80));
//!
//! // Upside down: (0,0) is the LSB of the last byte
//! assert_eq!(locate(0, 0, dims, Rotation::Rotate180), (3, 0x01));
//! ```

use crate::config::{Dimensions, Rotation};

/// Logical (width, height) of a canvas drawn with `rotation`
pub fn logical_size(dims: Dimensions, rotation: Rotation) -> (u32, u32) {
    let (w, h) = (u32::from(dims.width), u32::from(dims.height));
    match rotation {
        Rotation::Rotate0 | Rotation::Rotate180 => (w, h),
        Rotation::Rotate90 | Rotation::Rotate270 => (h, w),
    }
}

/// Map a logical pixel to its byte index and bit mask in the native frame
///
/// `x` and `y` must lie inside [`logical_size`]; callers clip before calling.
pub fn locate(x: u32, y: u32, dims: Dimensions, rotation: Rotation) -> (usize, u8) {
    let (w, h) = (u32::from(dims.width), u32::from(dims.height));
    let (px, py) = match rotation {
        Rotation::Rotate0 => (x, y),
        Rotation::Rotate90 => (w - 1 - y, x),
        Rotation::Rotate180 => (w - 1 - x, h - 1 - y),
        Rotation::Rotate270 => (y, h - 1 - x),
    };
    let index = (px / 8) as usize + py as usize * dims.row_bytes();
    (index, 0x80 >> (px % 8))
}
