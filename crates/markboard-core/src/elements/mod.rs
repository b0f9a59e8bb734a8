//! Page elements.
//!
//! Every element kind lives in its own collection on a [`Page`](crate::page::Page);
//! [`Element`] is the owned sum type used to move elements in and out, and
//! [`ElementRef`]/[`ElementRefMut`] borrow one in place.

mod image;
mod note;
mod stroke_group;
mod text_box;

pub use image::{ImageElement, ImageFormat};
pub use note::StickyNote;
pub use stroke_group::StrokeGroup;
pub use text_box::{TextAlign, TextBox};

use crate::style::SerializableColor;
use chrono::{DateTime, Utc};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// The four element collections of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// Photos and flattened annotations.
    Image,
    StickyNote,
    TextBox,
    /// Saved sketches.
    StrokeGroup,
}

impl ElementKind {
    /// Human-readable name used in logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Image => "image",
            ElementKind::StickyNote => "sticky note",
            ElementKind::TextBox => "text box",
            ElementKind::StrokeGroup => "stroke group",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Common trait for all page elements. Geometry is in page space.
pub trait ElementTrait {
    fn id(&self) -> ElementId;

    fn created_at(&self) -> DateTime<Utc>;

    /// Top-left corner.
    fn position(&self) -> Point;

    fn size(&self) -> Size;

    fn set_position(&mut self, position: Point);

    fn set_size(&mut self, size: Size);

    fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position(), self.size())
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }

    fn translate(&mut self, delta: Vec2) {
        let moved = self.position() + delta;
        self.set_position(moved);
    }
}

/// Errors from validating an [`ElementPatch`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PatchError {
    #[error("Cannot set {field} on a {kind}")]
    Unsupported { kind: ElementKind, field: &'static str },
    #[error("Invalid element size: {width}x{height}")]
    InvalidSize { width: f64, height: f64 },
    #[error("Element position is not finite")]
    NonFinitePosition,
}

/// Replacement image content, typically a flattened annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePatch {
    pub data: Vec<u8>,
    pub natural_width: u32,
    pub natural_height: u32,
    pub format: ImageFormat,
}

/// Partial update for an existing element. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub position: Option<Point>,
    pub size: Option<Size>,
    /// Sticky notes and text boxes only.
    pub text: Option<String>,
    /// Sticky notes and text boxes only.
    pub color: Option<SerializableColor>,
    /// Images only.
    pub image: Option<ImagePatch>,
}

impl ElementPatch {
    /// Patch that moves an element.
    pub fn move_to(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    /// Patch that resizes an element.
    pub fn resize(size: Size) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    /// Patch that replaces note or text box content.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Patch that replaces image content.
    pub fn image(image: ImagePatch) -> Self {
        Self {
            image: Some(image),
            ..Self::default()
        }
    }

    /// Check the patch against an element kind without applying it.
    pub fn validate(&self, kind: ElementKind) -> Result<(), PatchError> {
        if let Some(p) = self.position {
            if !p.x.is_finite() || !p.y.is_finite() {
                return Err(PatchError::NonFinitePosition);
            }
        }
        if let Some(s) = self.size {
            let valid = |v: f64| v.is_finite() && v > 0.0;
            if !valid(s.width) || !valid(s.height) {
                return Err(PatchError::InvalidSize {
                    width: s.width,
                    height: s.height,
                });
            }
        }
        let has_text_fields = matches!(kind, ElementKind::StickyNote | ElementKind::TextBox);
        if self.text.is_some() && !has_text_fields {
            return Err(PatchError::Unsupported { kind, field: "text" });
        }
        if self.color.is_some() && !has_text_fields {
            return Err(PatchError::Unsupported { kind, field: "color" });
        }
        if self.image.is_some() && kind != ElementKind::Image {
            return Err(PatchError::Unsupported { kind, field: "image" });
        }
        Ok(())
    }
}

/// Owned element of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Element {
    Image(ImageElement),
    StickyNote(StickyNote),
    TextBox(TextBox),
    StrokeGroup(StrokeGroup),
}

impl Element {
    /// Get the element kind.
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Image(_) => ElementKind::Image,
            Element::StickyNote(_) => ElementKind::StickyNote,
            Element::TextBox(_) => ElementKind::TextBox,
            Element::StrokeGroup(_) => ElementKind::StrokeGroup,
        }
    }

    /// Get the element ID.
    pub fn id(&self) -> ElementId {
        self.as_element_ref().id()
    }

    /// Bounding rectangle in page space.
    pub fn bounds(&self) -> Rect {
        self.as_element_ref().bounds()
    }

    /// Borrow as an [`ElementRef`].
    pub fn as_element_ref(&self) -> ElementRef<'_> {
        match self {
            Element::Image(e) => ElementRef::Image(e),
            Element::StickyNote(e) => ElementRef::StickyNote(e),
            Element::TextBox(e) => ElementRef::TextBox(e),
            Element::StrokeGroup(e) => ElementRef::StrokeGroup(e),
        }
    }
}

impl From<ImageElement> for Element {
    fn from(e: ImageElement) -> Self {
        Element::Image(e)
    }
}

impl From<StickyNote> for Element {
    fn from(e: StickyNote) -> Self {
        Element::StickyNote(e)
    }
}

impl From<TextBox> for Element {
    fn from(e: TextBox) -> Self {
        Element::TextBox(e)
    }
}

impl From<StrokeGroup> for Element {
    fn from(e: StrokeGroup) -> Self {
        Element::StrokeGroup(e)
    }
}

/// Borrowed element of any kind.
#[derive(Debug, Clone, Copy)]
pub enum ElementRef<'a> {
    Image(&'a ImageElement),
    StickyNote(&'a StickyNote),
    TextBox(&'a TextBox),
    StrokeGroup(&'a StrokeGroup),
}

impl ElementRef<'_> {
    /// Get the element kind.
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementRef::Image(_) => ElementKind::Image,
            ElementRef::StickyNote(_) => ElementKind::StickyNote,
            ElementRef::TextBox(_) => ElementKind::TextBox,
            ElementRef::StrokeGroup(_) => ElementKind::StrokeGroup,
        }
    }

    pub fn id(&self) -> ElementId {
        match self {
            ElementRef::Image(e) => e.id(),
            ElementRef::StickyNote(e) => e.id(),
            ElementRef::TextBox(e) => e.id(),
            ElementRef::StrokeGroup(e) => e.id(),
        }
    }

    /// Bounding rectangle in page space.
    pub fn bounds(&self) -> Rect {
        match self {
            ElementRef::Image(e) => e.bounds(),
            ElementRef::StickyNote(e) => e.bounds(),
            ElementRef::TextBox(e) => e.bounds(),
            ElementRef::StrokeGroup(e) => e.bounds(),
        }
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            ElementRef::Image(e) => e.created_at(),
            ElementRef::StickyNote(e) => e.created_at(),
            ElementRef::TextBox(e) => e.created_at(),
            ElementRef::StrokeGroup(e) => e.created_at(),
        }
    }
}

/// Mutably borrowed element of any kind.
#[derive(Debug)]
pub enum ElementRefMut<'a> {
    Image(&'a mut ImageElement),
    StickyNote(&'a mut StickyNote),
    TextBox(&'a mut TextBox),
    StrokeGroup(&'a mut StrokeGroup),
}

impl ElementRefMut<'_> {
    /// Get the element kind.
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementRefMut::Image(_) => ElementKind::Image,
            ElementRefMut::StickyNote(_) => ElementKind::StickyNote,
            ElementRefMut::TextBox(_) => ElementKind::TextBox,
            ElementRefMut::StrokeGroup(_) => ElementKind::StrokeGroup,
        }
    }

    fn as_trait_mut(&mut self) -> &mut dyn ElementTrait {
        match self {
            ElementRefMut::Image(e) => &mut **e,
            ElementRefMut::StickyNote(e) => &mut **e,
            ElementRefMut::TextBox(e) => &mut **e,
            ElementRefMut::StrokeGroup(e) => &mut **e,
        }
    }

    /// Move by a page-space delta.
    pub fn translate(&mut self, delta: Vec2) {
        self.as_trait_mut().translate(delta);
    }

    /// Validate and apply a patch. Nothing changes if validation fails.
    pub fn apply(&mut self, patch: ElementPatch) -> Result<(), PatchError> {
        patch.validate(self.kind())?;

        let ElementPatch {
            position,
            size,
            text,
            color,
            image,
        } = patch;

        let element = self.as_trait_mut();
        if let Some(position) = position {
            element.set_position(position);
        }
        if let Some(size) = size {
            element.set_size(size);
        }

        match self {
            ElementRefMut::StickyNote(note) => {
                if let Some(text) = text {
                    note.text = text;
                }
                if let Some(color) = color {
                    note.color = color;
                }
            }
            ElementRefMut::TextBox(text_box) => {
                if let Some(text) = text {
                    text_box.text = text;
                }
                if let Some(color) = color {
                    text_box.color = color;
                }
            }
            ElementRefMut::Image(img) => {
                if let Some(image) = image {
                    img.replace_data(&image.data, image.natural_width, image.natural_height, image.format);
                }
            }
            ElementRefMut::StrokeGroup(_) => {}
        }
        Ok(())
    }
}
