//! Sticky note element.

use super::{ElementId, ElementTrait};
use crate::style::SerializableColor;
use chrono::{DateTime, Utc};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A colored square note with free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickyNote {
    pub(crate) id: ElementId,
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub text: String,
    pub color: SerializableColor,
    pub(crate) created_at: DateTime<Utc>,
}

impl StickyNote {
    /// Default edge length of a new note.
    pub const DEFAULT_SIZE: f64 = 200.0;

    /// Create a yellow note at `position` with the default size.
    pub fn new(position: Point, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width: Self::DEFAULT_SIZE,
            height: Self::DEFAULT_SIZE,
            text: text.into(),
            color: SerializableColor::note_yellow(),
            created_at: Utc::now(),
        }
    }

    /// Set the note color.
    pub fn with_color(mut self, color: SerializableColor) -> Self {
        self.color = color;
        self
    }
}

impl ElementTrait for StickyNote {
    fn id(&self) -> ElementId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn position(&self) -> Point {
        self.position
    }

    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    fn set_size(&mut self, size: Size) {
        self.width = size.width;
        self.height = size.height;
    }
}
