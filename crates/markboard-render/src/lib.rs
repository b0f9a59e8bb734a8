//! Markboard Render Library
//!
//! Software raster backend for Markboard: pixel surfaces, image decoding and
//! PNG encoding, overlay compositing and page rendering, all on tiny-skia.

mod annotated;
mod compositor;
pub mod raster;
mod renderer;
mod software;
mod surface;

pub use annotated::{AnnotatedImage, LoadState};
pub use compositor::{Compositor, SoftwareCompositor, overlay_scale};
pub use raster::{decode_image, encode_png};
pub use renderer::{RenderContext, RenderError, RenderResult, Renderer};
pub use software::SoftwareRenderer;
pub use surface::{Backdrop, PixmapSurface};

pub use tiny_skia::Pixmap;
