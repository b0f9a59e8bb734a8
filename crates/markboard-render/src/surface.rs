//! Software raster surface backed by tiny-skia.
//!
//! A [`PixmapSurface`] keeps two layers: a read-only backdrop (solid color or
//! seed image) and an ink layer that strokes draw into. Pigment composes onto
//! the ink with source-over, erase removes ink with destination-out, so
//! erasing always reveals exactly the backdrop pixels beneath.

use crate::raster::{new_pixmap, to_color};
use crate::renderer::RenderResult;
use kurbo::Point;
use markboard_core::style::{InkMode, InkStyle};
use markboard_core::surface::Surface;
use tiny_skia::{
    BlendMode, Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};

/// What shows through where there is no ink.
#[derive(Debug, Clone)]
pub enum Backdrop {
    /// Uniform color, white for sketches and transparent for overlays.
    Solid(Color),
    /// Seed image at the surface's backing resolution.
    Image(Pixmap),
}

/// A drawable raster surface.
#[derive(Debug, Clone)]
pub struct PixmapSurface {
    backdrop: Backdrop,
    ink: Pixmap,
}

impl PixmapSurface {
    /// Opaque white surface for sketching.
    pub fn blank(width: u32, height: u32) -> RenderResult<Self> {
        Self::with_backdrop(width, height, Backdrop::Solid(Color::WHITE))
    }

    /// Fully transparent surface, used as an annotation overlay.
    pub fn overlay(width: u32, height: u32) -> RenderResult<Self> {
        Self::with_backdrop(width, height, Backdrop::Solid(Color::TRANSPARENT))
    }

    /// Surface whose backdrop is a seed image; backing size equals the seed's.
    pub fn seeded(seed: Pixmap) -> RenderResult<Self> {
        let ink = new_pixmap(seed.width(), seed.height())?;
        Ok(Self {
            backdrop: Backdrop::Image(seed),
            ink,
        })
    }

    fn with_backdrop(width: u32, height: u32, backdrop: Backdrop) -> RenderResult<Self> {
        let ink = new_pixmap(width, height)?;
        log::debug!("created {width}x{height} surface");
        Ok(Self { backdrop, ink })
    }

    /// What shows through where there is no ink.
    pub fn backdrop(&self) -> &Backdrop {
        &self.backdrop
    }

    /// The ink layer alone, transparent where nothing was drawn.
    pub fn ink(&self) -> &Pixmap {
        &self.ink
    }

    /// True when no ink pixel is visible.
    pub fn is_blank(&self) -> bool {
        self.ink.pixels().iter().all(|p| p.alpha() == 0)
    }

    /// Current pixels: backdrop with ink composed on top.
    pub fn snapshot(&self) -> Pixmap {
        let mut out = match &self.backdrop {
            Backdrop::Image(seed) => seed.clone(),
            Backdrop::Solid(color) => {
                let mut pixmap = self.ink.clone();
                pixmap.fill(*color);
                pixmap
            }
        };
        if !self.is_blank() {
            out.draw_pixmap(0, 0, self.ink.as_ref(), &PixmapPaint::default(), Transform::identity(), None);
        }
        out
    }
}

impl Surface for PixmapSurface {
    fn width(&self) -> u32 {
        self.ink.width()
    }

    fn height(&self) -> u32 {
        self.ink.height()
    }

    fn draw_segment(&mut self, from: Point, to: Point, ink: &InkStyle) {
        stroke_segment(&mut self.ink, from, to, ink, Transform::identity());
    }

    fn reset(&mut self) {
        self.ink.fill(Color::TRANSPARENT);
    }
}

fn ink_paint(ink: &InkStyle) -> Paint<'static> {
    let mut paint = Paint {
        anti_alias: true,
        ..Paint::default()
    };
    match ink.mode {
        InkMode::Pigment => {
            paint.set_color(to_color(ink.color));
            paint.blend_mode = BlendMode::SourceOver;
        }
        InkMode::Erase => {
            // Only the source alpha matters for destination-out
            paint.set_color(Color::BLACK);
            paint.blend_mode = BlendMode::DestinationOut;
        }
    }
    paint
}

/// Stroke one segment with round caps and joins.
///
/// A zero-length segment draws a dot the size of a round cap.
pub(crate) fn stroke_segment(pixmap: &mut Pixmap, from: Point, to: Point, ink: &InkStyle, transform: Transform) {
    let paint = ink_paint(ink);
    let width = ink.effective_width() as f32;

    if from == to {
        if let Some(dot) = PathBuilder::from_circle(from.x as f32, from.y as f32, width / 2.0) {
            pixmap.fill_path(&dot, &paint, FillRule::Winding, transform, None);
        }
        return;
    }

    let mut pb = PathBuilder::new();
    pb.move_to(from.x as f32, from.y as f32);
    pb.line_to(to.x as f32, to.y as f32);
    let Some(path) = pb.finish() else {
        return;
    };
    let stroke = Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, transform, None);
}
