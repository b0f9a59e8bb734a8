//! View transform for page zoom and pan.
//!
//! The view belongs to the editing session, never to the document. Stored
//! element coordinates stay in page space; the transform is applied only when
//! rendering and inverted before any pointer-driven mutation.

use kurbo::{Affine, Point, Size, Vec2};

/// Smallest zoom factor the view allows by default.
pub const MIN_ZOOM: f64 = 0.25;
/// Largest zoom factor the view allows by default.
pub const MAX_ZOOM: f64 = 3.0;

/// Zoom and pan applied when drawing a page on screen.
///
/// `screen = page * zoom + offset`
///
/// Session state only; never persisted, so the zoom clamp always holds.
#[derive(Debug, Clone)]
pub struct ViewTransform {
    /// Current translation offset (pan), in screen pixels.
    pub offset: Vec2,
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl ViewTransform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a view with custom zoom bounds. Bounds are reordered if swapped;
    /// non-positive or non-finite bounds fall back to the defaults.
    pub fn with_bounds(min_zoom: f64, max_zoom: f64) -> Self {
        let usable = |v: f64| v.is_finite() && v > 0.0;
        if !usable(min_zoom) || !usable(max_zoom) {
            log::warn!("ignoring zoom bounds [{min_zoom}, {max_zoom}]");
            return Self::default();
        }
        let (min_zoom, max_zoom) = if min_zoom <= max_zoom {
            (min_zoom, max_zoom)
        } else {
            (max_zoom, min_zoom)
        };
        Self {
            zoom: 1.0_f64.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
            ..Self::default()
        }
    }

    /// Current zoom factor, always within the bounds.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// `(min, max)` zoom.
    pub fn zoom_bounds(&self) -> (f64, f64) {
        (self.min_zoom, self.max_zoom)
    }

    /// Set the zoom factor, clamped to the allowed range.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        }
    }

    /// Page-to-screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Screen-to-page transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    /// Convert a page-space point to screen coordinates.
    pub fn page_to_screen(&self, page_point: Point) -> Point {
        self.transform() * page_point
    }

    /// Convert a screen point back to page space.
    pub fn screen_to_page(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert an on-screen drag delta into a page-space delta.
    ///
    /// Pan does not affect deltas; at 2x zoom a 10px drag moves 5 page units.
    pub fn screen_delta_to_page(&self, delta: Vec2) -> Vec2 {
        delta / self.zoom
    }

    /// Pan by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom by `factor`, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if !new_zoom.is_finite() || (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let page_point = self.screen_to_page(screen_point);
        self.zoom = new_zoom;

        // Shift so page_point stays under screen_point
        let new_screen = self.page_to_screen(page_point);
        self.offset += screen_point - new_screen;
    }

    /// Reset to 100% zoom with no pan.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = 1.0_f64.clamp(self.min_zoom, self.max_zoom);
    }

    /// Zoom and center so the whole page fits in the viewport.
    pub fn fit_page(&mut self, page: Size, viewport: Size, padding: f64) {
        if page.width <= 0.0 || page.height <= 0.0 {
            self.reset();
            return;
        }

        let available = Size::new(
            (viewport.width - padding * 2.0).max(1.0),
            (viewport.height - padding * 2.0).max(1.0),
        );
        let scale_x = available.width / page.width;
        let scale_y = available.height / page.height;
        self.zoom = scale_x.min(scale_y).clamp(self.min_zoom, self.max_zoom);

        self.offset = Vec2::new(
            (viewport.width - page.width * self.zoom) / 2.0,
            (viewport.height - page.height * self.zoom) / 2.0,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_view() {
        let view = ViewTransform::new();
        assert_eq!(view.offset, Vec2::ZERO);
        assert!((view.zoom() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rendered_position() {
        let mut view = ViewTransform::new();
        view.set_zoom(2.0);
        view.offset = Vec2::new(10.0, -5.0);
        let screen = view.page_to_screen(Point::new(50.0, 50.0));
        assert!((screen.x - 110.0).abs() < 1e-10);
        assert!((screen.y - 95.0).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_roundtrip() {
        let mut view = ViewTransform::new();
        view.set_zoom(2.0);
        let stored = Point::new(50.0, 50.0);
        let back = view.screen_to_page(view.page_to_screen(stored));
        assert!((back.x - 50.0).abs() < 1e-10);
        assert!((back.y - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_roundtrip_under_zoom_sequence() {
        let mut view = ViewTransform::new();
        let stored = Point::new(123.0, 456.0);
        for (factor, anchor) in [(1.7, (10.0, 20.0)), (0.3, (400.0, 0.0)), (2.9, (-50.0, 75.0))] {
            view.zoom_at(Point::new(anchor.0, anchor.1), factor);
            view.pan(Vec2::new(3.0, -7.0));
            let back = view.screen_to_page(view.page_to_screen(stored));
            assert!((back.x - stored.x).abs() < 1e-9);
            assert!((back.y - stored.y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zoom_clamp() {
        let mut view = ViewTransform::new();
        view.zoom_at(Point::ZERO, 0.001);
        assert!((view.zoom() - MIN_ZOOM).abs() < f64::EPSILON);

        view.zoom_at(Point::ZERO, 1000.0);
        assert!((view.zoom() - MAX_ZOOM).abs() < f64::EPSILON);

        view.set_zoom(f64::NAN);
        assert!((view.zoom() - MAX_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_at_keeps_anchor_fixed() {
        let mut view = ViewTransform::new();
        let anchor = Point::new(200.0, 150.0);
        let before = view.screen_to_page(anchor);
        view.zoom_at(anchor, 2.0);
        let after = view.screen_to_page(anchor);
        assert!((before.x - after.x).abs() < 1e-10);
        assert!((before.y - after.y).abs() < 1e-10);
    }

    #[test]
    fn test_drag_delta_is_inverse_zoomed() {
        let mut view = ViewTransform::new();
        view.set_zoom(2.0);
        view.offset = Vec2::new(40.0, 40.0);
        let delta = view.screen_delta_to_page(Vec2::new(10.0, -20.0));
        assert!((delta.x - 5.0).abs() < f64::EPSILON);
        assert!((delta.y + 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fit_page_centers() {
        let mut view = ViewTransform::new();
        view.fit_page(Size::new(1000.0, 500.0), Size::new(600.0, 600.0), 50.0);
        assert!((view.zoom() - 0.5).abs() < 1e-10);
        let center = view.page_to_screen(Point::new(500.0, 250.0));
        assert!((center.x - 300.0).abs() < 1e-10);
        assert!((center.y - 300.0).abs() < 1e-10);
    }

    #[test]
    fn test_custom_bounds() {
        let mut view = ViewTransform::with_bounds(2.0, 0.5);
        assert_eq!(view.zoom_bounds(), (0.5, 2.0));
        view.set_zoom(5.0);
        assert!((view.zoom() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_degenerate_bounds_fall_back() {
        let mut view = ViewTransform::with_bounds(0.0, 2.0);
        assert_eq!(view.zoom_bounds(), (MIN_ZOOM, MAX_ZOOM));
        view.set_zoom(0.0);
        assert!((view.zoom() - MIN_ZOOM).abs() < f64::EPSILON);
        let delta = view.screen_delta_to_page(Vec2::new(1.0, 1.0));
        assert!(delta.x.is_finite() && delta.y.is_finite());
    }
}
