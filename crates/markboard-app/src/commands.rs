//! Command implementations behind the `markboard` binary.

use crate::error::{AppError, AppResult};
use crate::script::PointerScript;
use kurbo::{Point, Rect, Size};
use markboard_core::config::EngineConfig;
use markboard_core::document::Document;
use markboard_core::elements::{ElementId, ElementPatch};
use markboard_core::session::EditorSession;
use markboard_render::{
    AnnotatedImage, PixmapSurface, RenderContext, RenderError, Renderer, SoftwareCompositor, SoftwareRenderer,
    encode_png,
};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// `WIDTHxHEIGHT` pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl FromStr for Dimensions {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
        let parse = |v: &str| v.trim().parse::<u32>().map_err(|e| format!("{v:?}: {e}"));
        let dims = Self {
            width: parse(w)?,
            height: parse(h)?,
        };
        if dims.width == 0 || dims.height == 0 {
            return Err(format!("dimensions must be non-zero, got {s:?}"));
        }
        Ok(dims)
    }
}

impl Dimensions {
    fn size(self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    fn scaled(self, factor: f64) -> (u32, u32) {
        let scale = |v: u32| ((f64::from(v) * factor).round() as u32).max(1);
        (scale(self.width), scale(self.height))
    }
}

/// Inputs for [`annotate`].
#[derive(Debug, Clone)]
pub struct AnnotateJob {
    pub image: PathBuf,
    pub display: Dimensions,
    pub device_pixel_ratio: f64,
    pub script: PathBuf,
    pub out: PathBuf,
    /// Place the flattened result on a new page of this document.
    pub document: Option<PathBuf>,
}

/// Inputs for [`sketch`].
#[derive(Debug, Clone)]
pub struct SketchJob {
    pub size: Dimensions,
    pub script: PathBuf,
    pub out: PathBuf,
    /// Store the strokes as a stroke group on the last page of this document.
    pub document: Option<PathBuf>,
}

/// Annotate a photo with a pointer script and write the flattened PNG.
pub fn annotate(config: EngineConfig, job: &AnnotateJob) -> AppResult<()> {
    if !job.device_pixel_ratio.is_finite() || job.device_pixel_ratio <= 0.0 {
        return Err(AppError::InvalidArgument(format!(
            "device pixel ratio must be positive, got {}",
            job.device_pixel_ratio
        )));
    }
    let bytes = std::fs::read(&job.image)?;
    config.entitlements.check_upload(bytes.len())?;
    let script = PointerScript::load(&job.script)?;

    let mut image = AnnotatedImage::new();
    image.finish_loading(&bytes)?;
    let Some((natural_w, natural_h)) = image.natural_size() else {
        return Err(RenderError::NotReady.into());
    };

    let mut session = EditorSession::new(config);
    session.begin_annotation()?;
    let (backing_w, backing_h) = job.display.scaled(job.device_pixel_ratio);
    let display = Rect::from_origin_size(Point::ZERO, job.display.size());
    let overlay = image.begin_annotation(backing_w, backing_h)?;
    let drawn = script.play(&mut session, overlay, display)?;
    session.end_annotation()?;

    let png = image.flatten(&SoftwareCompositor::new())?;
    std::fs::write(&job.out, &png)?;
    log::info!(
        "annotated {} with {drawn} strokes -> {} ({natural_w}x{natural_h})",
        job.image.display(),
        job.out.display()
    );

    if let Some(path) = &job.document {
        let mut document = load_or_create(path)?;
        let after = document.page_count().checked_sub(1);
        session.add_page(&mut document, after)?;
        let page_size = document.page(session.page_index())?.size();
        let id = session.place_image(&mut document, Point::ZERO, &png, (natural_w, natural_h))?;
        fit_image(&mut document, session.page_index(), id, page_size)?;
        save_document(path, &document)?;
    }
    Ok(())
}

/// Shrink a placed image to fit the page, keeping its aspect ratio.
fn fit_image(document: &mut Document, page: usize, id: ElementId, page_size: Size) -> AppResult<()> {
    let Some(bounds) = document.page(page)?.get(id).map(|e| e.bounds()) else {
        return Ok(());
    };
    if bounds.width() <= page_size.width && bounds.height() <= page_size.height {
        return Ok(());
    }
    let scale = (page_size.width / bounds.width()).min(page_size.height / bounds.height());
    let size = Size::new(bounds.width() * scale, bounds.height() * scale);
    document.update_element(page, id, ElementPatch::resize(size))?;
    Ok(())
}

/// Draw a pointer script on a blank surface and write it as PNG.
pub fn sketch(config: EngineConfig, job: &SketchJob) -> AppResult<()> {
    let script = PointerScript::load(&job.script)?;
    let mut surface = PixmapSurface::blank(job.size.width, job.size.height)?;
    let mut session = EditorSession::new(config);
    let display = Rect::from_origin_size(Point::ZERO, job.size.size());
    let drawn = script.play(&mut session, &mut surface, display)?;

    std::fs::write(&job.out, encode_png(&surface.snapshot())?)?;
    log::info!("sketched {drawn} strokes -> {}", job.out.display());

    if let Some(path) = &job.document {
        let mut document = load_or_create(path)?;
        if document.page_count() == 0 {
            session.add_page(&mut document, None)?;
        } else {
            session.select_page(&document, document.page_count() - 1)?;
        }
        session.save_sketch(&mut document, Point::ZERO, job.size.size())?;
        save_document(path, &document)?;
    }
    Ok(())
}

/// Render one page of a document to PNG at `zoom`.
pub fn render(config: EngineConfig, path: &Path, page: usize, zoom: f64, out: &Path) -> AppResult<()> {
    let document = load_document(path)?;
    let page = document.page(page)?;
    let mut session = EditorSession::new(config);
    session.view.set_zoom(zoom);
    let zoom = session.view.zoom();
    let viewport = Size::new(page.width * zoom, page.height * zoom);

    let ctx = RenderContext::new(page, &session.view, viewport).with_background(page.background);
    let pixmap = SoftwareRenderer::new().render_page(&ctx)?;
    std::fs::write(out, encode_png(&pixmap)?)?;
    log::info!("rendered page to {}", out.display());
    Ok(())
}

/// Page count and per-page element counts, one line per page.
pub fn summarize(document: &Document) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}: {} page(s)", document.name, document.page_count());
    for (i, page) in document.pages().iter().enumerate() {
        let counts = page.element_counts();
        let _ = writeln!(
            out,
            "  page {}: {} image(s), {} note(s), {} text box(es), {} sketch(es)",
            i + 1,
            counts.images,
            counts.notes,
            counts.text_boxes,
            counts.stroke_groups
        );
    }
    out
}

/// Read a document from a JSON file.
pub fn load_document(path: &Path) -> AppResult<Document> {
    let json = std::fs::read_to_string(path)?;
    Ok(Document::from_json(&json)?)
}

fn load_or_create(path: &Path) -> AppResult<Document> {
    if path.exists() {
        load_document(path)
    } else {
        log::info!("creating new document at {}", path.display());
        Ok(Document::new())
    }
}

/// Write a document as pretty-printed JSON.
pub fn save_document(path: &Path, document: &Document) -> AppResult<()> {
    std::fs::write(path, document.to_json()?)?;
    log::debug!("saved document to {}", path.display());
    Ok(())
}
