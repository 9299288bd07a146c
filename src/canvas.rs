//! 1-bpp canvas with embedded-graphics support
//!
//! [`Canvas`] wraps a frame-sized byte buffer and implements the
//! [`DrawTarget`](embedded_graphics_core::draw_target::DrawTarget) trait, so
//! any embedded-graphics primitive can be rendered into a frame that is later
//! pushed to the panel unchanged.
//!
//! ## Example
//!
//! ```rust
//! use embedded_graphics::{
//!     prelude::*,
//!     primitives::{PrimitiveStyle, Rectangle},
//! };
//! use http_image_display::{Canvas, Color, Dimensions, Rotation};
//!
//! let Ok(dims) = Dimensions::new(800, 480) else {
//!     return;
//! };
//! let mut frame = vec![0u8; dims.frame_size()];
//! let Ok(mut canvas) = Canvas::new(frame.as_mut_slice(), dims, Rotation::Rotate0, Color::White) else {
//!     return;
//! };
//!
//! let _ = canvas.draw_text(10, 10, "Image size error!", Color::Black, Color::White);
//! let _ = Rectangle::new(Point::new(10, 40), Size::new(200, 4))
//!     .into_styled(PrimitiveStyle::with_fill(Color::Black))
//!     .draw(&mut canvas);
//! ```

use core::convert::Infallible;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyleBuilder, ascii::FONT_10X20};
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics::Drawable;
use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    prelude::Pixel,
};

use crate::color::Color;
use crate::config::{Dimensions, Rotation};
use crate::error::Error;
use crate::rotation::{locate, logical_size};

/// Font used for on-panel diagnostics
pub const BANNER_FONT: MonoFont<'static> = FONT_10X20;

/// Drawing surface over a packed monochrome frame
///
/// The buffer is always interpreted in the panel's native orientation;
/// `rotation` only changes how logical coordinates are mapped into it.
pub struct Canvas<B>
where
    B: AsMut<[u8]>,
{
    buffer: B,
    dims: Dimensions,
    rotation: Rotation,
}

impl<B> Canvas<B>
where
    B: AsMut<[u8]>,
{
    /// Create a canvas over `buffer` and fill it with `background`
    ///
    /// # Errors
    ///
    /// Returns `Error::BufferTooSmall` if `buffer` is shorter than `dims.frame_size()`.
    pub fn new(
        mut buffer: B,
        dims: Dimensions,
        rotation: Rotation,
        background: Color,
    ) -> Result<Self, Error> {
        let required = dims.frame_size();
        let provided = buffer.as_mut().len();
        if provided < required {
            return Err(Error::BufferTooSmall { required, provided });
        }
        let mut canvas = Self {
            buffer,
            dims,
            rotation,
        };
        canvas.clear(background);
        Ok(canvas)
    }

    /// Fill the whole frame with `color`
    pub fn clear(&mut self, color: Color) {
        let required = self.dims.frame_size();
        self.buffer.as_mut()[..required].fill(color.fill_byte());
    }

    /// Draw `text` with its top-left corner at (`x`, `y`)
    ///
    /// Returns the position right after the last glyph.
    pub fn draw_text(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        foreground: Color,
        background: Color,
    ) -> Point {
        let style = MonoTextStyleBuilder::new()
            .font(&BANNER_FONT)
            .text_color(foreground)
            .background_color(background)
            .build();
        match Text::with_baseline(text, Point::new(x, y), style, Baseline::Top).draw(self) {
            Ok(next) => next,
            Err(never) => match never {},
        }
    }

    /// Give the buffer back
    pub fn into_inner(self) -> B {
        self.buffer
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        let (index, bit) = locate(x, y, self.dims, self.rotation);
        let byte = &mut self.buffer.as_mut()[index];
        if color.is_set() {
            *byte |= bit;
        } else {
            *byte &= !bit;
        }
    }
}

impl<B> Canvas<B>
where
    B: AsMut<[u8]> + AsRef<[u8]>,
{
    /// Color of the logical pixel at (`x`, `y`), `None` when outside the canvas
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let (w, h) = logical_size(self.dims, self.rotation);
        if x >= w || y >= h {
            return None;
        }
        let (index, bit) = locate(x, y, self.dims, self.rotation);
        let set = self.buffer.as_ref()[index] & bit != 0;
        Some(if set { Color::White } else { Color::Black })
    }
}

impl<B> DrawTarget for Canvas<B>
where
    B: AsMut<[u8]>,
{
    type Color = Color;
    type Error = Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let sz = self.size();

        for Pixel(Point { x, y }, color) in pixels {
            if x < 0 || y < 0 {
                continue;
            }

            let x = x as u32;
            let y = y as u32;

            if x >= sz.width || y >= sz.height {
                continue;
            }

            self.set_pixel(x, y, color);
        }

        Ok(())
    }
}

impl<B> OriginDimensions for Canvas<B>
where
    B: AsMut<[u8]>,
{
    fn size(&self) -> Size {
        let (w, h) = logical_size(self.dims, self.rotation);
        Size::new(w, h)
    }
}
