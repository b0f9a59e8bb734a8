//! A photo being annotated: base raster, load state and an optional overlay.

use crate::compositor::Compositor;
use crate::raster::{decode_image, encode_png};
use crate::renderer::{RenderError, RenderResult};
use crate::surface::PixmapSurface;
use tiny_skia::Pixmap;

/// Load state of the base image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Bytes not decoded yet.
    Loading,
    /// Base raster available for annotation.
    Ready,
    /// Decoding failed; the image can never be annotated.
    Failed(String),
}

/// Base image plus the transparent overlay strokes are drawn on.
#[derive(Debug)]
pub struct AnnotatedImage {
    state: LoadState,
    base: Option<Pixmap>,
    overlay: Option<PixmapSurface>,
}

impl Default for AnnotatedImage {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotatedImage {
    /// An image whose bytes have not arrived yet.
    pub fn new() -> Self {
        Self {
            state: LoadState::Loading,
            base: None,
            overlay: None,
        }
    }

    /// Decode `bytes` and become ready. A decode failure moves to `Failed`.
    pub fn finish_loading(&mut self, bytes: &[u8]) -> RenderResult<()> {
        match decode_image(bytes) {
            Ok(pixmap) => {
                self.set_loaded(pixmap);
                Ok(())
            }
            Err(e) => {
                self.fail(e.to_string());
                Err(e)
            }
        }
    }

    /// Install an already decoded base raster.
    pub fn set_loaded(&mut self, base: Pixmap) {
        log::info!("base image ready at {}x{}", base.width(), base.height());
        self.base = Some(base);
        self.state = LoadState::Ready;
    }

    /// Mark the image as unloadable, dropping any base and overlay.
    pub fn fail(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        log::warn!("base image failed to load: {reason}");
        self.base = None;
        self.overlay = None;
        self.state = LoadState::Failed(reason);
    }

    /// Get the current load state.
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Ready and not failed.
    pub fn is_annotatable(&self) -> bool {
        self.state == LoadState::Ready
    }

    /// True while an overlay exists.
    pub fn is_annotating(&self) -> bool {
        self.overlay.is_some()
    }

    /// Natural resolution of the loaded base.
    pub fn natural_size(&self) -> Option<(u32, u32)> {
        self.base.as_ref().map(|b| (b.width(), b.height()))
    }

    /// Decoded base raster, once ready.
    pub fn base(&self) -> Option<&Pixmap> {
        self.base.as_ref()
    }

    /// Create the overlay at the given backing resolution (display size times
    /// device pixel ratio). Keeps an existing overlay.
    pub fn begin_annotation(&mut self, width: u32, height: u32) -> RenderResult<&mut PixmapSurface> {
        if !self.is_annotatable() {
            return Err(RenderError::NotReady);
        }
        let overlay = match self.overlay.take() {
            Some(existing) => existing,
            None => PixmapSurface::overlay(width, height)?,
        };
        Ok(self.overlay.insert(overlay))
    }

    /// Overlay surface, if annotating.
    pub fn overlay(&self) -> Option<&PixmapSurface> {
        self.overlay.as_ref()
    }

    /// Mutable overlay surface, if annotating.
    pub fn overlay_mut(&mut self) -> Option<&mut PixmapSurface> {
        self.overlay.as_mut()
    }

    /// Merge the overlay into the base and return the result as PNG.
    ///
    /// On success the base is replaced and the overlay dropped. On failure
    /// nothing changes.
    pub fn flatten<C>(&mut self, compositor: &C) -> RenderResult<Vec<u8>>
    where
        C: Compositor<Raster = Pixmap, Overlay = PixmapSurface>,
    {
        if !self.is_annotatable() {
            return Err(RenderError::NotReady);
        }
        let merged = match &self.overlay {
            Some(overlay) => compositor.composite(self.base.as_ref(), overlay)?,
            None => self.base.clone().ok_or(RenderError::NotReady)?,
        };
        let png = encode_png(&merged)?;
        self.base = Some(merged);
        self.overlay = None;
        log::info!("flattened annotation into {} byte PNG", png.len());
        Ok(png)
    }

    /// Drop the overlay without touching the base.
    pub fn discard(&mut self) {
        if self.overlay.take().is_some() {
            log::debug!("annotation overlay discarded");
        }
    }
}
