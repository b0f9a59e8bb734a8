//! Surface abstraction.
//!
//! A surface is a raster buffer with a fixed backing resolution. Stroke
//! coordinates handed to a surface are always in backing pixels.

use crate::style::InkStyle;
use kurbo::{Point, Size};

/// Trait for drawable raster backends.
///
/// Implementations can be a software pixel buffer, a GPU texture, or a test
/// double that only records calls.
pub trait Surface {
    /// Backing width in pixels.
    fn width(&self) -> u32;

    /// Backing height in pixels.
    fn height(&self) -> u32;

    /// Render one segment of a stroke, with round caps and joins.
    ///
    /// `from == to` renders a round dot of the effective width.
    fn draw_segment(&mut self, from: Point, to: Point, ink: &InkStyle);

    /// Discard every stroke drawn since creation or the last reset.
    fn reset(&mut self);

    /// Backing resolution as a floating-point size.
    fn backing_size(&self) -> Size {
        Size::new(f64::from(self.width()), f64::from(self.height()))
    }
}
