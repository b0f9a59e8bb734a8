//! Editor session context.
//!
//! An [`EditorSession`] owns everything that belongs to one local editing
//! session: the view transform, the active page, the current tool and ink,
//! and the stroke recorder. It is passed explicitly to every operation; the
//! document and surfaces stay owned by their callers.

use crate::config::EngineConfig;
use crate::document::{Document, DocumentError};
use crate::elements::{ElementId, ElementPatch, ImageElement, ImageFormat, ImagePatch, StrokeGroup};
use crate::entitlements::{CapacityError, Entitlements};
use crate::mapper::{MapError, map_client_point};
use crate::stroke::{Stroke, StrokeError, StrokeRecorder};
use crate::style::{InkStyle, SerializableColor};
use crate::surface::Surface;
use crate::view::ViewTransform;
use kurbo::{Point, Rect, Size, Vec2};
use thiserror::Error;

/// Drawing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Pigment ink in the current color.
    #[default]
    Pen,
    /// Destination-out ink at twice the current width.
    Eraser,
}

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Ready for a new stroke or mode change.
    Idle,
    /// Between `pointer_down` and `pointer_up` of a stroke.
    Drawing,
    /// Annotation overlay active, no stroke in progress.
    Annotating,
}

/// Session errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Stroke(#[from] StrokeError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Capacity(#[from] CapacityError),
    /// The operation is not allowed in the current state.
    #[error("Cannot {action} while {state:?}")]
    InvalidTransition { state: SessionState, action: &'static str },
    /// Strokes from another surface are still waiting to be saved or cleared.
    #[error("{count} unsaved stroke(s) belong to another surface")]
    UnsavedStrokes { count: usize },
    #[error("No strokes to save")]
    NothingToSave,
    /// Uploaded bytes are not PNG, JPEG or WebP.
    #[error("Unrecognized image format")]
    UnsupportedImage,
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Explicitly owned state of one editing session.
#[derive(Debug, Clone)]
pub struct EditorSession {
    config: EngineConfig,
    /// Zoom and pan for the page view. Never stored in the document.
    pub view: ViewTransform,
    page_index: usize,
    tool: Tool,
    color: SerializableColor,
    width: f64,
    annotating: bool,
    recorder: StrokeRecorder,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl EditorSession {
    /// Start a session on page 0 with the configured view and ink.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            view: config.new_view(),
            page_index: 0,
            tool: Tool::default(),
            color: config.ink.color.opaque(),
            width: config.ink.width,
            annotating: false,
            recorder: StrokeRecorder::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Page and upload ceilings for this session.
    pub fn entitlements(&self) -> &Entitlements {
        &self.config.entitlements
    }

    /// Derived from the recorder and the annotation flag.
    pub fn state(&self) -> SessionState {
        if self.recorder.is_drawing() {
            SessionState::Drawing
        } else if self.annotating {
            SessionState::Annotating
        } else {
            SessionState::Idle
        }
    }

    /// Active tool.
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switch tools. Takes effect on the next stroke.
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    /// Set the pen color. Alpha is dropped; pigment is always opaque.
    pub fn set_color(&mut self, color: SerializableColor) {
        self.color = color.opaque();
    }

    /// Set the nominal brush width for both tools.
    pub fn set_width(&mut self, width: f64) -> SessionResult<()> {
        if !width.is_finite() || width <= 0.0 {
            return Err(StrokeError::InvalidWidth(width).into());
        }
        self.width = width;
        Ok(())
    }

    /// Ink the next stroke will use.
    pub fn current_ink(&self) -> InkStyle {
        match self.tool {
            Tool::Pen => InkStyle::pigment(self.color, self.width),
            Tool::Eraser => InkStyle::erase(self.width),
        }
    }

    /// Start a stroke at a client-space pointer position.
    ///
    /// `display_rect` is the surface's on-screen rectangle measured for this
    /// event.
    pub fn pointer_down<S: Surface + ?Sized>(
        &mut self,
        surface: &S,
        display_rect: Rect,
        client: Point,
    ) -> SessionResult<()> {
        let point = map_client_point(surface.backing_size(), display_rect, client)?;
        self.recorder.begin(point, self.current_ink())?;
        Ok(())
    }

    /// Extend the current stroke and draw the new segment.
    pub fn pointer_move<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        display_rect: Rect,
        client: Point,
    ) -> SessionResult<()> {
        if !self.recorder.is_drawing() {
            return Err(StrokeError::NotDrawing.into());
        }
        let point = map_client_point(surface.backing_size(), display_rect, client)?;
        self.recorder.extend(surface, point)?;
        Ok(())
    }

    /// Finish the current stroke.
    pub fn pointer_up(&mut self) -> SessionResult<Stroke> {
        Ok(self.recorder.end()?.clone())
    }

    /// Strokes committed since the surface was created or last cleared.
    pub fn strokes(&self) -> &[Stroke] {
        self.recorder.strokes()
    }

    /// Reset the surface and drop every recorded stroke.
    pub fn clear_surface<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.recorder.reset(surface);
    }

    /// Enter annotation mode.
    ///
    /// Only allowed from `Idle` with no committed strokes, so the strokes
    /// handed back by [`end_annotation`](Self::end_annotation) all belong to
    /// the overlay.
    pub fn begin_annotation(&mut self) -> SessionResult<()> {
        match self.state() {
            SessionState::Idle if !self.recorder.strokes().is_empty() => {
                let count = self.recorder.strokes().len();
                log::warn!("begin_annotation() rejected: {count} unsaved strokes");
                Err(SessionError::UnsavedStrokes { count })
            }
            SessionState::Idle => {
                self.annotating = true;
                Ok(())
            }
            state => {
                log::warn!("begin_annotation() rejected while {state:?}");
                Err(SessionError::InvalidTransition {
                    state,
                    action: "begin annotation",
                })
            }
        }
    }

    /// Leave annotation mode, handing back the overlay strokes.
    ///
    /// Used both when saving (the caller flattens the overlay) and when
    /// abandoning the annotation (the caller discards it).
    pub fn end_annotation(&mut self) -> SessionResult<Vec<Stroke>> {
        match self.state() {
            SessionState::Annotating => {
                self.annotating = false;
                Ok(self.recorder.take_strokes())
            }
            state => Err(SessionError::InvalidTransition {
                state,
                action: "end annotation",
            }),
        }
    }

    /// Index of the page being edited.
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Navigate to another page.
    pub fn select_page(&mut self, document: &Document, index: usize) -> SessionResult<()> {
        document.page(index)?;
        self.page_index = index;
        Ok(())
    }

    /// Add a configured default page after `after` (or at the end) and
    /// navigate to it.
    pub fn add_page(&mut self, document: &mut Document, after: Option<usize>) -> SessionResult<usize> {
        let page = self.config.page.new_page();
        let index = document.add_page_with(after, page, self.config.entitlements.max_pages)?;
        log::info!("added page {} of {}", index + 1, document.page_count());
        self.page_index = index;
        Ok(index)
    }

    /// Place an uploaded photo on the current page, subject to the upload
    /// ceiling. The format is detected from the bytes.
    pub fn place_image(
        &mut self,
        document: &mut Document,
        position: Point,
        data: &[u8],
        natural: (u32, u32),
    ) -> SessionResult<ElementId> {
        let format = self.check_image(data)?;
        document.page(self.page_index)?;
        let image = ImageElement::new(position, data, natural.0, natural.1, format);
        Ok(document.insert_element(self.page_index, image.into())?)
    }

    /// Replace the content of an image on the current page, keeping its
    /// placement. Subject to the same upload ceiling as [`place_image`](Self::place_image).
    pub fn replace_image(
        &mut self,
        document: &mut Document,
        id: ElementId,
        data: &[u8],
        natural: (u32, u32),
    ) -> SessionResult<()> {
        let format = self.check_image(data)?;
        let patch = ElementPatch::image(ImagePatch {
            data: data.to_vec(),
            natural_width: natural.0,
            natural_height: natural.1,
            format,
        });
        document.update_element(self.page_index, id, patch)?;
        log::debug!("replaced image {id} ({} bytes)", data.len());
        Ok(())
    }

    fn check_image(&self, data: &[u8]) -> SessionResult<ImageFormat> {
        self.config.entitlements.check_upload(data.len())?;
        ImageFormat::from_magic_bytes(data).ok_or(SessionError::UnsupportedImage)
    }

    /// Store the recorded sketch strokes as a stroke group on the current page.
    ///
    /// `source` is the backing size of the sketch surface. Strokes are
    /// simplified with the configured tolerance first.
    pub fn save_sketch(&mut self, document: &mut Document, position: Point, source: Size) -> SessionResult<ElementId> {
        if self.state() != SessionState::Idle {
            return Err(SessionError::InvalidTransition {
                state: self.state(),
                action: "save a sketch",
            });
        }
        if self.recorder.strokes().is_empty() {
            return Err(SessionError::NothingToSave);
        }
        document.page(self.page_index)?;
        let tolerance = self.config.ink.simplify_tolerance;
        let strokes = self
            .recorder
            .take_strokes()
            .into_iter()
            .map(|s| if tolerance > 0.0 { s.simplified(tolerance) } else { s })
            .collect();
        let group = StrokeGroup::from_strokes(position, source, strokes);
        log::debug!("saving sketch with {} strokes", group.strokes().len());
        Ok(document.insert_element(self.page_index, group.into())?)
    }

    /// Drag an element on the current page by an on-screen delta.
    pub fn drag_element(&self, document: &mut Document, id: ElementId, screen_delta: Vec2) -> SessionResult<()> {
        document.drag_element(self.page_index, id, screen_delta, &self.view)?;
        Ok(())
    }

    /// Front-most element under a screen point on the current page.
    pub fn element_at_screen(&self, document: &Document, screen: Point, tolerance: f64) -> Option<ElementId> {
        let page = document.page(self.page_index).ok()?;
        let page_point = self.view.screen_to_page(screen);
        page.element_at(page_point, tolerance / self.view.zoom()).map(|e| e.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementRef;
    use crate::entitlements::Limit;
    use crate::stroke::tests::RecordingSurface;
    use crate::style::InkMode;

    const PNG_MAGIC: [u8; 4] = [0x89, b'P', b'N', b'G'];
    const JPEG_MAGIC: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

    fn rect(w: f64, h: f64) -> Rect {
        Rect::new(0.0, 0.0, w, h)
    }

    #[test]
    fn test_pointer_flow_maps_to_backing() {
        let mut surface = RecordingSurface::new(600, 400);
        let mut session = EditorSession::default();
        let display = Rect::new(10.0, 10.0, 310.0, 210.0);

        session.pointer_down(&surface, display, Point::new(10.0, 10.0)).unwrap();
        assert_eq!(session.state(), SessionState::Drawing);
        session.pointer_move(&mut surface, display, Point::new(160.0, 110.0)).unwrap();
        let stroke = session.pointer_up().unwrap();

        assert_eq!(stroke.points(), &[Point::new(0.0, 0.0), Point::new(300.0, 200.0)]);
        assert_eq!(surface.segments.len(), 1);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_move_while_idle_is_rejected() {
        let mut surface = RecordingSurface::new(10, 10);
        let mut session = EditorSession::default();
        let result = session.pointer_move(&mut surface, rect(10.0, 10.0), Point::ZERO);
        assert_eq!(result, Err(SessionError::Stroke(StrokeError::NotDrawing)));
        assert!(matches!(session.pointer_up(), Err(SessionError::Stroke(StrokeError::NotDrawing))));
    }

    #[test]
    fn test_degenerate_display_rejected() {
        let surface = RecordingSurface::new(10, 10);
        let mut session = EditorSession::default();
        let result = session.pointer_down(&surface, rect(0.0, 10.0), Point::ZERO);
        assert!(matches!(result, Err(SessionError::Map(MapError::Unavailable { .. }))));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_eraser_tool_uses_erase_mode() {
        let mut surface = RecordingSurface::new(10, 10);
        let mut session = EditorSession::default();
        session.set_width(3.0).unwrap();
        session.set_tool(Tool::Eraser);
        session.pointer_down(&surface, rect(10.0, 10.0), Point::ZERO).unwrap();
        session.pointer_move(&mut surface, rect(10.0, 10.0), Point::new(5.0, 5.0)).unwrap();
        let stroke = session.pointer_up().unwrap();
        assert_eq!(stroke.style.mode, InkMode::Erase);
        assert!((stroke.effective_width() - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_annotation_transitions() {
        let surface = RecordingSurface::new(10, 10);
        let mut session = EditorSession::default();
        assert!(session.end_annotation().is_err());

        session.begin_annotation().unwrap();
        assert_eq!(session.state(), SessionState::Annotating);
        assert!(session.begin_annotation().is_err());

        session.pointer_down(&surface, rect(10.0, 10.0), Point::ZERO).unwrap();
        assert_eq!(session.state(), SessionState::Drawing);
        assert!(matches!(
            session.end_annotation(),
            Err(SessionError::InvalidTransition {
                state: SessionState::Drawing,
                ..
            })
        ));
        session.pointer_up().unwrap();

        let strokes = session.end_annotation().unwrap();
        assert_eq!(strokes.len(), 1);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.strokes().is_empty());
    }

    #[test]
    fn test_annotation_requires_clean_recorder() {
        let mut sketch = RecordingSurface::new(10, 10);
        let mut session = EditorSession::default();
        session.pointer_down(&sketch, rect(10.0, 10.0), Point::ZERO).unwrap();
        session.pointer_move(&mut sketch, rect(10.0, 10.0), Point::new(5.0, 5.0)).unwrap();
        session.pointer_up().unwrap();

        assert_eq!(session.begin_annotation(), Err(SessionError::UnsavedStrokes { count: 1 }));
        assert_eq!(session.state(), SessionState::Idle);

        session.clear_surface(&mut sketch);
        session.begin_annotation().unwrap();
        assert!(session.end_annotation().unwrap().is_empty());
    }

    #[test]
    fn test_save_sketch_simplifies_strokes() {
        let mut surface = RecordingSurface::new(100, 100);
        let mut session = EditorSession::default();
        let mut doc = Document::new();
        session.add_page(&mut doc, None).unwrap();

        session.pointer_down(&surface, rect(100.0, 100.0), Point::new(0.0, 0.0)).unwrap();
        for x in 1..=10 {
            session.pointer_move(&mut surface, rect(100.0, 100.0), Point::new(f64::from(x), 0.0)).unwrap();
        }
        session.pointer_up().unwrap();

        let id = session.save_sketch(&mut doc, Point::ZERO, surface.backing_size()).unwrap();
        match doc.page(0).unwrap().get(id) {
            Some(ElementRef::StrokeGroup(group)) => {
                assert_eq!(group.strokes()[0].points(), &[Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
            }
            other => panic!("unexpected element: {other:?}"),
        }
    }

    #[test]
    fn test_add_page_respects_ceiling() {
        let mut config = EngineConfig::default();
        config.entitlements.max_pages = Limit::AtMost(2);
        let mut session = EditorSession::new(config);
        let mut doc = Document::new();

        assert_eq!(session.add_page(&mut doc, None).unwrap(), 0);
        assert_eq!(session.add_page(&mut doc, None).unwrap(), 1);
        assert_eq!(session.page_index(), 1);
        assert!(matches!(
            session.add_page(&mut doc, None),
            Err(SessionError::Document(DocumentError::Capacity(_)))
        ));
        assert_eq!(doc.page_count(), 2);
        assert_eq!(session.page_index(), 1);
    }

    #[test]
    fn test_place_image_checks_upload_size() {
        let mut config = EngineConfig::default();
        config.entitlements.max_upload_bytes = Limit::AtMost(4);
        let mut session = EditorSession::new(config);
        let mut doc = Document::new();
        session.add_page(&mut doc, None).unwrap();

        let result = session.place_image(&mut doc, Point::ZERO, &[0x89, b'P', b'N', b'G', 0], (1, 1));
        assert!(matches!(result, Err(SessionError::Capacity(CapacityError::UploadTooLarge { .. }))));
        assert!(doc.pages()[0].is_empty());

        let result = session.place_image(&mut doc, Point::ZERO, b"GIF8", (1, 1));
        assert_eq!(result, Err(SessionError::UnsupportedImage));

        let id = session.place_image(&mut doc, Point::ZERO, &PNG_MAGIC, (1, 1)).unwrap();
        assert_eq!(doc.element_counts(0).unwrap().images, 1);
        match doc.page(0).unwrap().get(id) {
            Some(ElementRef::Image(image)) => assert_eq!(image.format, ImageFormat::Png),
            other => panic!("unexpected element: {other:?}"),
        }
    }

    #[test]
    fn test_replace_image_checks_upload_size() {
        let mut config = EngineConfig::default();
        config.entitlements.max_upload_bytes = Limit::AtMost(4);
        let mut session = EditorSession::new(config);
        let mut doc = Document::new();
        session.add_page(&mut doc, None).unwrap();
        let id = session.place_image(&mut doc, Point::ZERO, &JPEG_MAGIC, (10, 10)).unwrap();

        let oversized = [0x89, b'P', b'N', b'G', 0, 0];
        let result = session.replace_image(&mut doc, id, &oversized, (20, 20));
        assert!(matches!(result, Err(SessionError::Capacity(_))));

        session.replace_image(&mut doc, id, &PNG_MAGIC, (20, 20)).unwrap();
        match doc.page(0).unwrap().get(id) {
            Some(ElementRef::Image(image)) => {
                assert_eq!(image.format, ImageFormat::Png);
                assert_eq!((image.natural_width, image.natural_height), (20, 20));
                assert_eq!(image.data(), Some(PNG_MAGIC.to_vec()));
            }
            other => panic!("unexpected element: {other:?}"),
        }
    }

    #[test]
    fn test_save_sketch_creates_stroke_group() {
        let mut surface = RecordingSurface::new(100, 100);
        let mut session = EditorSession::default();
        let mut doc = Document::new();
        session.add_page(&mut doc, None).unwrap();
        assert_eq!(
            session.save_sketch(&mut doc, Point::ZERO, surface.backing_size()),
            Err(SessionError::NothingToSave)
        );

        session.pointer_down(&surface, rect(100.0, 100.0), Point::new(1.0, 1.0)).unwrap();
        session.pointer_move(&mut surface, rect(100.0, 100.0), Point::new(50.0, 50.0)).unwrap();
        session.pointer_up().unwrap();

        let id = session.save_sketch(&mut doc, Point::new(20.0, 30.0), surface.backing_size()).unwrap();
        match doc.page(0).unwrap().get(id) {
            Some(ElementRef::StrokeGroup(group)) => {
                assert_eq!(group.strokes().len(), 1);
                assert_eq!(group.position, Point::new(20.0, 30.0));
            }
            other => panic!("unexpected element: {other:?}"),
        }
        assert!(session.strokes().is_empty());
    }

    #[test]
    fn test_hit_test_through_view() {
        let mut session = EditorSession::default();
        let mut doc = Document::new();
        session.add_page(&mut doc, None).unwrap();
        let id = doc
            .insert_element(0, crate::elements::StickyNote::new(Point::new(100.0, 100.0), "").into())
            .unwrap();

        session.view.set_zoom(2.0);
        session.view.offset = Vec2::new(-50.0, 0.0);
        // Page (150, 150) renders at (250, 300)
        assert_eq!(session.element_at_screen(&doc, Point::new(250.0, 300.0), 0.0), Some(id));
        assert_eq!(session.element_at_screen(&doc, Point::new(100.0, 100.0), 0.0), None);

        session.drag_element(&mut doc, id, Vec2::new(40.0, 40.0)).unwrap();
        let origin = doc.page(0).unwrap().get(id).unwrap().bounds().origin();
        assert_eq!(origin, Point::new(120.0, 120.0));
    }

    #[test]
    fn test_select_page_validates_index() {
        let mut session = EditorSession::default();
        let mut doc = Document::new();
        session.add_page(&mut doc, None).unwrap();
        assert!(session.select_page(&doc, 1).is_err());
        assert_eq!(session.page_index(), 0);
    }
}
