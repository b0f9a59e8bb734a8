//! Display-to-backing coordinate mapping for pointer input.
//!
//! A drawing surface has a fixed backing resolution but may be shown at any
//! on-screen size. Every pointer-driven operation goes through [`map_pointer`]
//! (or [`map_client_point`]) to land in backing pixels. Display rectangles must
//! be measured at the time of the event; nothing here caches them.

use kurbo::{Point, Rect, Size};
use thiserror::Error;

/// Errors produced while mapping pointer positions.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MapError {
    /// The display rectangle is degenerate, so no mapping exists.
    #[error("Coordinate mapper unavailable: display size {width}x{height}")]
    Unavailable { width: f64, height: f64 },
    /// The pointer position is NaN or infinite.
    #[error("Pointer position is not finite: ({x}, {y})")]
    NonFinitePointer { x: f64, y: f64 },
}

fn is_usable_extent(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// Per-axis scale from display pixels to backing pixels.
pub fn display_scale(backing: Size, display: Size) -> Result<(f64, f64), MapError> {
    if !is_usable_extent(display.width) || !is_usable_extent(display.height) {
        return Err(MapError::Unavailable {
            width: display.width,
            height: display.height,
        });
    }
    Ok((backing.width / display.width, backing.height / display.height))
}

/// Map a pointer position relative to the display rectangle's origin into
/// backing coordinates.
pub fn map_pointer(backing: Size, display: Size, pointer: Point) -> Result<Point, MapError> {
    if !pointer.x.is_finite() || !pointer.y.is_finite() {
        return Err(MapError::NonFinitePointer {
            x: pointer.x,
            y: pointer.y,
        });
    }
    let (scale_x, scale_y) = display_scale(backing, display)?;
    Ok(Point::new(pointer.x * scale_x, pointer.y * scale_y))
}

/// Map a pointer position in client coordinates, given the display rectangle
/// as measured in the same client space.
pub fn map_client_point(backing: Size, display_rect: Rect, client: Point) -> Result<Point, MapError> {
    let local = Point::new(client.x - display_rect.x0, client.y - display_rect.y0);
    map_pointer(backing, display_rect.size(), local)
}
