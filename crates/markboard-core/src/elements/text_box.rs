//! Text box element.

use super::{ElementId, ElementTrait};
use crate::style::SerializableColor;
use chrono::{DateTime, Utc};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Horizontal text alignment inside a text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// A free-floating block of styled text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub(crate) id: ElementId,
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub text: String,
    pub font_size: f64,
    pub color: SerializableColor,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub align: TextAlign,
    pub(crate) created_at: DateTime<Utc>,
}

impl TextBox {
    /// Font size of new text boxes.
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;
    /// Width of new text boxes in page units.
    pub const DEFAULT_WIDTH: f64 = 240.0;

    /// Create a text box at `position` with the default size.
    pub fn new(position: Point, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_FONT_SIZE * 1.5,
            text: text.into(),
            font_size: Self::DEFAULT_FONT_SIZE,
            color: SerializableColor::black(),
            bold: false,
            align: TextAlign::default(),
            created_at: Utc::now(),
        }
    }

    /// Set the font size.
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    /// Set the text color.
    pub fn with_color(mut self, color: SerializableColor) -> Self {
        self.color = color;
        self
    }
}

impl ElementTrait for TextBox {
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
