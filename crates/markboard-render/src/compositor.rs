//! Layer compositing.

use crate::renderer::{RenderError, RenderResult};
use crate::surface::PixmapSurface;
use markboard_core::surface::Surface;
use tiny_skia::{FilterQuality, Pixmap, PixmapPaint, Transform};

/// Merges an annotation overlay into a base raster.
///
/// The result has the base's natural resolution; the overlay is stretched
/// (non-uniformly if needed) from its backing resolution to cover it.
pub trait Compositor {
    type Raster;
    type Overlay: Surface;

    /// Compose `overlay` onto `base`. `None` means the base is still loading
    /// and fails with [`RenderError::NotReady`].
    fn composite(&self, base: Option<&Self::Raster>, overlay: &Self::Overlay) -> RenderResult<Self::Raster>;
}

/// Scale factors that map overlay backing pixels onto base natural pixels.
///
/// Returns `None` for a zero-sized overlay.
pub fn overlay_scale(natural: (u32, u32), overlay: (u32, u32)) -> Option<(f32, f32)> {
    let (nw, nh) = natural;
    let (ow, oh) = overlay;
    if ow == 0 || oh == 0 {
        return None;
    }
    Some((nw as f32 / ow as f32, nh as f32 / oh as f32))
}

/// CPU compositor using tiny-skia with bilinear filtering.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareCompositor;

impl SoftwareCompositor {
    pub fn new() -> Self {
        Self
    }
}

impl Compositor for SoftwareCompositor {
    type Raster = Pixmap;
    type Overlay = PixmapSurface;

    fn composite(&self, base: Option<&Pixmap>, overlay: &PixmapSurface) -> RenderResult<Pixmap> {
        let base = base.ok_or(RenderError::NotReady)?;
        let natural = (base.width(), base.height());

        let Some((sx, sy)) = overlay_scale(natural, (overlay.width(), overlay.height())) else {
            log::debug!("empty overlay, passing base through");
            return Ok(base.clone());
        };
        if overlay.is_blank() {
            return Ok(base.clone());
        }

        let mut out = base.clone();
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        out.draw_pixmap(0, 0, overlay.ink().as_ref(), &paint, Transform::from_scale(sx, sy), None);
        log::info!(
            "composited {}x{} overlay onto {}x{} base (scale {sx:.3}, {sy:.3})",
            overlay.width(),
            overlay.height(),
            natural.0,
            natural.1
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Size};
    use markboard_core::mapper::map_pointer;
    use markboard_core::stroke::StrokeRecorder;
    use markboard_core::style::{InkStyle, SerializableColor};
    use tiny_skia::Color;

    fn base(width: u32, height: u32) -> Pixmap {
        let mut pixmap = Pixmap::new(width, height).unwrap();
        pixmap.fill(Color::from_rgba8(30, 60, 90, 255));
        pixmap
    }

    fn dot(surface: &mut PixmapSurface, at: Point) {
        let mut recorder = StrokeRecorder::new();
        recorder
            .begin(at, InkStyle::pigment(SerializableColor::rgb(255, 0, 0), 4.0))
            .unwrap();
        recorder.extend(surface, at).unwrap();
        recorder.end().unwrap();
    }

    fn is_red(pixmap: &Pixmap, x: u32, y: u32) -> bool {
        let p = pixmap.pixel(x, y).unwrap().demultiply();
        p.red() > 200 && p.green() < 60 && p.blue() < 60
    }

    #[test]
    fn test_empty_overlay_is_identity() {
        let base = base(64, 48);
        let overlay = PixmapSurface::overlay(32, 24).unwrap();
        let out = SoftwareCompositor.composite(Some(&base), &overlay).unwrap();
        assert_eq!(out.data(), base.data());
    }

    #[test]
    fn test_not_ready_without_base() {
        let overlay = PixmapSurface::overlay(4, 4).unwrap();
        assert!(matches!(
            SoftwareCompositor.composite(None, &overlay),
            Err(RenderError::NotReady)
        ));
    }

    #[test]
    fn test_mark_scales_to_natural() {
        let base = base(1200, 800);
        let mut overlay = PixmapSurface::overlay(300, 200).unwrap();
        dot(&mut overlay, Point::new(150.0, 100.0));

        let out = SoftwareCompositor.composite(Some(&base), &overlay).unwrap();
        assert_eq!((out.width(), out.height()), (1200, 800));
        assert!(is_red(&out, 600, 400));
        assert!(!is_red(&out, 150, 100));
        assert_eq!(out.pixel(50, 50), base.pixel(50, 50));
    }

    #[test]
    fn test_non_uniform_scale() {
        let base = base(400, 100);
        let mut overlay = PixmapSurface::overlay(100, 100).unwrap();
        dot(&mut overlay, Point::new(50.0, 50.0));

        let out = SoftwareCompositor.composite(Some(&base), &overlay).unwrap();
        assert!(is_red(&out, 200, 50));
        // Stretched 4x horizontally only
        assert!(is_red(&out, 194, 50));
        assert!(!is_red(&out, 200, 56));
    }

    #[test]
    fn test_hidpi_overlay_uses_backing_size() {
        // 300x200 display at device pixel ratio 2
        let display = Size::new(300.0, 200.0);
        let mut overlay = PixmapSurface::overlay(600, 400).unwrap();
        let at = map_pointer(overlay.backing_size(), display, Point::new(150.0, 100.0)).unwrap();
        assert_eq!(at, Point::new(300.0, 200.0));
        dot(&mut overlay, at);

        let out = SoftwareCompositor.composite(Some(&base(1200, 800)), &overlay).unwrap();
        assert!(is_red(&out, 600, 400));
    }

    #[test]
    fn test_overlay_scale() {
        assert_eq!(overlay_scale((1200, 800), (300, 200)), Some((4.0, 4.0)));
        assert_eq!(overlay_scale((10, 10), (0, 5)), None);
    }
}
