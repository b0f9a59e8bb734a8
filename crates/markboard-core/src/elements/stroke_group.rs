//! Stroke group element: a saved sketch placed on a page.

use super::{ElementId, ElementTrait};
use crate::stroke::Stroke;
use chrono::{DateTime, Utc};
use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A set of strokes recorded on a sketch surface.
///
/// Strokes keep the backing coordinates of the surface they were drawn on
/// (`source_width` x `source_height`). The group maps that space onto its
/// page rectangle, so resizing the group never rewrites stroke points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeGroup {
    pub(crate) id: ElementId,
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub source_width: f64,
    pub source_height: f64,
    strokes: Vec<Stroke>,
    pub(crate) created_at: DateTime<Utc>,
}

impl StrokeGroup {
    /// Create a group from strokes drawn on a surface of `source` size,
    /// placed at `position` at 1:1 scale.
    pub fn from_strokes(position: Point, source: Size, strokes: Vec<Stroke>) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width: source.width,
            height: source.height,
            source_width: source.width,
            source_height: source.height,
            strokes,
            created_at: Utc::now(),
        }
    }

    /// Strokes in source-surface coordinates, oldest first.
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Transform from source (surface) space to page space.
    pub fn local_to_page(&self) -> Affine {
        let scale_x = if self.source_width > 0.0 { self.width / self.source_width } else { 1.0 };
        let scale_y = if self.source_height > 0.0 { self.height / self.source_height } else { 1.0 };
        Affine::translate(Vec2::new(self.position.x, self.position.y)) * Affine::scale_non_uniform(scale_x, scale_y)
    }
}

impl ElementTrait for StrokeGroup {
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
