//! Pages: fixed-size canvases holding the four element collections.

use crate::elements::{
    Element, ElementId, ElementKind, ElementRef, ElementRefMut, ElementTrait, ImageElement, StickyNote,
    StrokeGroup, TextBox,
};
use crate::style::SerializableColor;
use chrono::{DateTime, Utc};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default page width in page units.
pub const DEFAULT_PAGE_WIDTH: f64 = 1200.0;
/// Default page height in page units.
pub const DEFAULT_PAGE_HEIGHT: f64 = 1600.0;

/// Unique identifier for pages.
pub type PageId = Uuid;

/// Number of elements of each kind on a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementCounts {
    pub images: usize,
    pub notes: usize,
    pub text_boxes: usize,
    pub stroke_groups: usize,
}

impl ElementCounts {
    /// Elements across all collections.
    pub fn total(&self) -> usize {
        self.images + self.notes + self.text_boxes + self.stroke_groups
    }
}

/// A fixed-size canvas. Collections are unordered; stored coordinates are
/// always in unscaled page space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub(crate) id: PageId,
    pub width: f64,
    pub height: f64,
    pub background: SerializableColor,
    #[serde(default)]
    pub images: Vec<ImageElement>,
    #[serde(default)]
    pub notes: Vec<StickyNote>,
    #[serde(default)]
    pub text_boxes: Vec<TextBox>,
    #[serde(default)]
    pub stroke_groups: Vec<StrokeGroup>,
    pub(crate) created_at: DateTime<Utc>,
}

impl Default for Page {
    fn default() -> Self {
        Self::new(Size::new(DEFAULT_PAGE_WIDTH, DEFAULT_PAGE_HEIGHT))
    }
}

impl Page {
    /// Create an empty page with a white background.
    pub fn new(size: Size) -> Self {
        Self {
            id: Uuid::new_v4(),
            width: size.width,
            height: size.height,
            background: SerializableColor::white(),
            images: Vec::new(),
            notes: Vec::new(),
            text_boxes: Vec::new(),
            stroke_groups: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Set the background color.
    pub fn with_background(mut self, background: SerializableColor) -> Self {
        self.background = background;
        self
    }

    /// Get the page ID.
    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Canvas size in page units.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Append an element to the collection matching its kind.
    pub fn insert(&mut self, element: Element) -> ElementId {
        let id = element.id();
        match element {
            Element::Image(e) => self.images.push(e),
            Element::StickyNote(e) => self.notes.push(e),
            Element::TextBox(e) => self.text_boxes.push(e),
            Element::StrokeGroup(e) => self.stroke_groups.push(e),
        }
        id
    }

    /// Which collection holds `id`, and where.
    fn locate(&self, id: ElementId) -> Option<(ElementKind, usize)> {
        if let Some(i) = self.images.iter().position(|e| e.id() == id) {
            return Some((ElementKind::Image, i));
        }
        if let Some(i) = self.notes.iter().position(|e| e.id() == id) {
            return Some((ElementKind::StickyNote, i));
        }
        if let Some(i) = self.text_boxes.iter().position(|e| e.id() == id) {
            return Some((ElementKind::TextBox, i));
        }
        self.stroke_groups
            .iter()
            .position(|e| e.id() == id)
            .map(|i| (ElementKind::StrokeGroup, i))
    }

    /// Find an element by id in any collection.
    pub fn get(&self, id: ElementId) -> Option<ElementRef<'_>> {
        let (kind, i) = self.locate(id)?;
        Some(match kind {
            ElementKind::Image => ElementRef::Image(&self.images[i]),
            ElementKind::StickyNote => ElementRef::StickyNote(&self.notes[i]),
            ElementKind::TextBox => ElementRef::TextBox(&self.text_boxes[i]),
            ElementKind::StrokeGroup => ElementRef::StrokeGroup(&self.stroke_groups[i]),
        })
    }

    /// Mutable access to an element by id.
    pub fn get_mut(&mut self, id: ElementId) -> Option<ElementRefMut<'_>> {
        let (kind, i) = self.locate(id)?;
        Some(match kind {
            ElementKind::Image => ElementRefMut::Image(&mut self.images[i]),
            ElementKind::StickyNote => ElementRefMut::StickyNote(&mut self.notes[i]),
            ElementKind::TextBox => ElementRefMut::TextBox(&mut self.text_boxes[i]),
            ElementKind::StrokeGroup => ElementRefMut::StrokeGroup(&mut self.stroke_groups[i]),
        })
    }

    /// Remove an element by id.
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let (kind, i) = self.locate(id)?;
        Some(match kind {
            ElementKind::Image => Element::Image(self.images.remove(i)),
            ElementKind::StickyNote => Element::StickyNote(self.notes.remove(i)),
            ElementKind::TextBox => Element::TextBox(self.text_boxes.remove(i)),
            ElementKind::StrokeGroup => Element::StrokeGroup(self.stroke_groups.remove(i)),
        })
    }

    /// Whether the page holds an element with this id.
    pub fn contains(&self, id: ElementId) -> bool {
        self.locate(id).is_some()
    }

    /// Per-kind element counts.
    pub fn element_counts(&self) -> ElementCounts {
        ElementCounts {
            images: self.images.len(),
            notes: self.notes.len(),
            text_boxes: self.text_boxes.len(),
            stroke_groups: self.stroke_groups.len(),
        }
    }

    /// True when the page has no elements.
    pub fn is_empty(&self) -> bool {
        self.element_counts().total() == 0
    }

    /// All elements in paint order (back to front): images, stroke groups,
    /// sticky notes, text boxes. Within a kind, insertion order.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.images
            .iter()
            .map(ElementRef::Image)
            .chain(self.stroke_groups.iter().map(ElementRef::StrokeGroup))
            .chain(self.notes.iter().map(ElementRef::StickyNote))
            .chain(self.text_boxes.iter().map(ElementRef::TextBox))
    }

    /// Front-most element containing a page-space point.
    pub fn element_at(&self, point: Point, tolerance: f64) -> Option<ElementRef<'_>> {
        self.elements()
            .filter(|e| e.bounds().inflate(tolerance, tolerance).contains(point))
            .last()
    }
}
