//! 8-bit grayscale to packed 1-bpp frame conversion
//!
//! Produces the on-wire frame format the panel expects: rows top to bottom,
//! 8 pixels per byte, most significant bit first, bit set = white. Rows whose
//! width is not a multiple of 8 are padded with black bits.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::Error;

/// Luma at or above this value is white when not dithering
pub const WHITE_THRESHOLD: u8 = 128;

/// How gray levels are reduced to black and white
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Dither {
    /// Plain threshold at [`WHITE_THRESHOLD`]
    None,
    /// Floyd–Steinberg error diffusion
    #[default]
    FloydSteinberg,
}

/// Pack `width` x `height` grayscale pixels into a 1-bpp frame
///
/// Extra trailing bytes in `luma` are ignored.
///
/// # Errors
///
/// Returns `Error::BufferTooSmall` if `luma` holds fewer than
/// `width * height` pixels.
///
/// ## Example
///
/// ```
/// use http_image_display::raster::{pack_luma, Dither};
///
/// let luma = [255, 0, 255, 0, 255, 0, 255, 0];
/// assert_eq!(pack_luma(&luma, 8, 1, Dither::None), Ok(vec![0b1010_1010]));
/// ```
pub fn pack_luma(luma: &[u8], width: u32, height: u32, dither: Dither) -> Result<Vec<u8>, Error> {
    let width = width as usize;
    let height = height as usize;
    let pixels = width * height;
    if luma.len() < pixels {
        return Err(Error::BufferTooSmall {
            required: pixels,
            provided: luma.len(),
        });
    }

    let row_bytes = width.div_ceil(8);
    let mut frame = vec![0u8; row_bytes * height];

    // Error rows carry one guard cell on each side
    let mut current = vec![0i32; width + 2];
    let mut below = vec![0i32; width + 2];

    for (row, out) in luma
        .chunks_exact(width.max(1))
        .zip(frame.chunks_exact_mut(row_bytes.max(1)))
        .take(height)
    {
        for (x, &level) in row.iter().enumerate() {
            let value = i32::from(level) + current[x + 1];
            let white = value >= i32::from(WHITE_THRESHOLD);
            if white {
                out[x / 8] |= 0x80 >> (x % 8);
            }

            if dither == Dither::FloydSteinberg {
                let err = value - if white { 255 } else { 0 };
                current[x + 2] += err * 7 / 16;
                below[x] += err * 3 / 16;
                below[x + 1] += err * 5 / 16;
                below[x + 2] += err / 16;
            }
        }

        if dither == Dither::FloydSteinberg {
            core::mem::swap(&mut current, &mut below);
            below.fill(0);
        }
    }

    log::debug!("Packed {}x{} pixels into {} bytes", width, height, frame.len());
    Ok(frame)
}
