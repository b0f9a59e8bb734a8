//! Renderer trait abstraction.

use kurbo::Size;
use markboard_core::elements::ElementId;
use markboard_core::page::Page;
use markboard_core::style::SerializableColor;
use markboard_core::view::ViewTransform;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A raster of zero or oversized dimensions was requested.
    #[error("Invalid raster size: {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    /// No decoded base image to composite onto.
    #[error("Base image is not loaded")]
    NotReady,
    /// Encoded bytes could not be decoded.
    #[error("Image decode failed: {0}")]
    Decode(String),
    /// PNG encoding failed.
    #[error("PNG encode failed: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Context for rendering one page through a view.
pub struct RenderContext<'a> {
    /// The page to render.
    pub page: &'a Page,
    /// Zoom and pan applied to page coordinates.
    pub view: &'a ViewTransform,
    /// Viewport size in logical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    /// Color outside the page rectangle.
    pub background_color: SerializableColor,
    /// Element to outline as selected.
    pub selected: Option<ElementId>,
    /// Selection outline color.
    pub selection_color: SerializableColor,
}

impl<'a> RenderContext<'a> {
    /// Create a context at scale factor 1 with no selection.
    pub fn new(page: &'a Page, view: &'a ViewTransform, viewport_size: Size) -> Self {
        Self {
            page,
            view,
            viewport_size,
            scale_factor: 1.0,
            background_color: SerializableColor::rgb(240, 240, 240),
            selected: None,
            selection_color: SerializableColor::rgb(59, 130, 246), // Blue
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Set the color painted outside the page.
    pub fn with_background(mut self, color: SerializableColor) -> Self {
        self.background_color = color;
        self
    }

    /// Highlight an element.
    pub fn with_selection(mut self, selected: Option<ElementId>) -> Self {
        self.selected = selected;
        self
    }

    /// Output size in physical pixels.
    pub fn backing_size(&self) -> (u32, u32) {
        let to_px = |v: f64| (v * self.scale_factor).round().max(0.0) as u32;
        (to_px(self.viewport_size.width), to_px(self.viewport_size.height))
    }
}

/// Trait for page rendering backends.
pub trait Renderer {
    /// Raster type produced by this backend.
    type Output;

    /// Render the context's page into a new raster of the context's backing size.
    fn render_page(&mut self, ctx: &RenderContext) -> RenderResult<Self::Output>;

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> SerializableColor {
        ctx.background_color
    }
}
