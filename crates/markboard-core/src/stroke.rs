//! Stroke recording.
//!
//! A [`StrokeRecorder`] turns a pointer gesture into a [`Stroke`] and renders
//! it incrementally onto a [`Surface`]: `begin` starts the stroke without
//! drawing, every `extend` draws one segment, `end` commits it.

use crate::style::{InkMode, InkStyle};
use crate::surface::Surface;
use kurbo::{Line, Point, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for strokes.
pub type StrokeId = Uuid;

/// Errors for malformed pointer sequences.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum StrokeError {
    /// `extend` or `end` without a preceding `begin`.
    #[error("No stroke in progress")]
    NotDrawing,
    /// `begin` while another stroke is still open.
    #[error("A stroke is already in progress")]
    AlreadyDrawing,
    /// Brush width is zero, negative or not finite.
    #[error("Invalid brush width: {0}")]
    InvalidWidth(f64),
    /// Pigment ink must be fully opaque.
    #[error("Pigment ink is not opaque (alpha {0})")]
    TranslucentPigment(u8),
    #[error("Stroke point is not finite: ({x}, {y})")]
    NonFinitePoint { x: f64, y: f64 },
    /// A stroke holds at least one point.
    #[error("Stroke has no points")]
    Empty,
}

/// Result type for stroke operations.
pub type StrokeResult<T> = Result<T, StrokeError>;

/// An ordered sequence of points drawn with a single ink style.
///
/// Deserialization goes through the same checks as [`Stroke::from_points`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStroke")]
pub struct Stroke {
    pub(crate) id: StrokeId,
    points: Vec<Point>,
    /// Style fixed at `begin`.
    pub style: InkStyle,
}

impl Stroke {
    fn start(point: Point, style: InkStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            points: vec![point],
            style,
        }
    }

    /// Build a finished stroke from existing points (for replay and import).
    ///
    /// Fails on an empty point list, a non-finite point, or an ink style
    /// that `begin` would reject.
    pub fn from_points(points: Vec<Point>, style: InkStyle) -> StrokeResult<Self> {
        check_style(&style)?;
        if points.is_empty() {
            return Err(StrokeError::Empty);
        }
        for p in &points {
            check_finite(*p)?;
        }
        Ok(Self {
            id: Uuid::new_v4(),
            points,
            style,
        })
    }

    /// Get the stroke ID.
    pub fn id(&self) -> StrokeId {
        self.id
    }

    /// Points in the order they were recorded.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of recorded points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed stroke.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Width actually rasterized (doubled for erase strokes).
    pub fn effective_width(&self) -> f64 {
        self.style.effective_width()
    }

    /// Area touched by the stroke, including half the brush on every side.
    pub fn bounds(&self) -> Rect {
        let Some(first) = self.points.first() else {
            return Rect::ZERO;
        };
        let raw = self
            .points
            .iter()
            .skip(1)
            .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p));
        let half = self.effective_width() / 2.0;
        raw.inflate(half, half)
    }

    /// Return a copy with redundant points removed.
    ///
    /// Committed strokes are never simplified in place; callers use this when
    /// turning a finished gesture into a stored stroke group.
    pub fn simplified(&self, tolerance: f64) -> Self {
        let points = if self.points.len() < 3 {
            self.points.clone()
        } else {
            rdp_simplify(&self.points, tolerance)
        };
        Self {
            id: Uuid::new_v4(),
            points,
            style: self.style,
        }
    }

    /// Render every segment of this stroke onto a surface.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        for window in self.points.windows(2) {
            surface.draw_segment(window[0], window[1], &self.style);
        }
    }
}

/// Ramer-Douglas-Peucker simplification. Endpoints are always kept.
fn rdp_simplify(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut spans = vec![(0, last)];
    while let Some((start, end)) = spans.pop() {
        let chord = Line::new(points[start], points[end]);
        let farthest = (start + 1..end)
            .map(|i| (i, distance_to_chord(points[i], chord)))
            .max_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((i, dist)) = farthest {
            if dist > tolerance {
                keep[i] = true;
                spans.push((start, i));
                spans.push((i, end));
            }
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, kept)| kept.then_some(*p))
        .collect()
}

fn distance_to_chord(point: Point, chord: Line) -> f64 {
    let d = chord.p1 - chord.p0;
    let len = d.hypot();
    if len < f64::EPSILON {
        return (point - chord.p0).hypot();
    }
    (point - chord.p0).cross(d).abs() / len
}

/// Re-render a list of committed strokes in order.
///
/// Rendering is deterministic: the same strokes on the same starting surface
/// always produce the same pixels.
pub fn replay<S: Surface + ?Sized>(strokes: &[Stroke], surface: &mut S) {
    for stroke in strokes {
        stroke.render(surface);
    }
}

/// Whether a stroke gesture is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecorderState {
    /// No stroke open.
    #[default]
    Idle,
    /// Between `begin` and `end`.
    Drawing,
}

/// Captures pointer gestures as strokes and draws them as they arrive.
#[derive(Debug, Clone, Default)]
pub struct StrokeRecorder {
    active: Option<Stroke>,
    committed: Vec<Stroke>,
}

impl StrokeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current recorder state.
    pub fn state(&self) -> RecorderState {
        if self.active.is_some() {
            RecorderState::Drawing
        } else {
            RecorderState::Idle
        }
    }

    /// True between `begin` and `end`.
    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    /// Start a stroke at a backing-space point. Draws nothing.
    pub fn begin(&mut self, point: Point, style: InkStyle) -> StrokeResult<()> {
        if self.active.is_some() {
            log::warn!("begin() rejected: stroke already in progress");
            return Err(StrokeError::AlreadyDrawing);
        }
        check_style(&style)?;
        check_finite(point)?;
        log::debug!("stroke begin at ({:.1}, {:.1}) {:?}", point.x, point.y, style.mode);
        self.active = Some(Stroke::start(point, style));
        Ok(())
    }

    /// Append a point and draw the segment from the previous point.
    pub fn extend<S: Surface + ?Sized>(&mut self, surface: &mut S, point: Point) -> StrokeResult<()> {
        let Some(stroke) = self.active.as_mut() else {
            log::warn!("extend() rejected: no stroke in progress");
            return Err(StrokeError::NotDrawing);
        };
        check_finite(point)?;
        // A stroke always holds its starting point
        let previous = stroke.points[stroke.points.len() - 1];
        stroke.points.push(point);
        surface.draw_segment(previous, point, &stroke.style);
        Ok(())
    }

    /// Finish the current stroke and commit it.
    pub fn end(&mut self) -> StrokeResult<&Stroke> {
        let Some(stroke) = self.active.take() else {
            log::warn!("end() rejected: no stroke in progress");
            return Err(StrokeError::NotDrawing);
        };
        log::debug!("stroke {} committed with {} points", stroke.id, stroke.len());
        self.committed.push(stroke);
        Ok(&self.committed[self.committed.len() - 1])
    }

    /// Drop the in-progress stroke without committing it.
    ///
    /// Segments it already drew stay on the surface until the next reset.
    pub fn cancel(&mut self) -> Option<Stroke> {
        self.active.take()
    }

    /// Clear the surface and forget every stroke, including one in progress.
    pub fn reset<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.active = None;
        self.committed.clear();
        surface.reset();
    }

    /// Committed strokes, oldest first.
    pub fn strokes(&self) -> &[Stroke] {
        &self.committed
    }

    /// Hand over the committed strokes, leaving the recorder empty.
    pub fn take_strokes(&mut self) -> Vec<Stroke> {
        std::mem::take(&mut self.committed)
    }
}

/// Serialized form of [`Stroke`], validated on the way in.
#[derive(Deserialize)]
struct RawStroke {
    id: StrokeId,
    points: Vec<Point>,
    style: InkStyle,
}

impl TryFrom<RawStroke> for Stroke {
    type Error = StrokeError;

    fn try_from(raw: RawStroke) -> StrokeResult<Self> {
        let mut stroke = Stroke::from_points(raw.points, raw.style)?;
        stroke.id = raw.id;
        Ok(stroke)
    }
}

fn check_style(style: &InkStyle) -> StrokeResult<()> {
    if !style.has_valid_width() {
        return Err(StrokeError::InvalidWidth(style.width));
    }
    if style.mode == InkMode::Pigment && style.color.a != 255 {
        return Err(StrokeError::TranslucentPigment(style.color.a));
    }
    Ok(())
}

fn check_finite(point: Point) -> StrokeResult<()> {
    if point.x.is_finite() && point.y.is_finite() {
        Ok(())
    } else {
        Err(StrokeError::NonFinitePoint {
            x: point.x,
            y: point.y,
        })
    }
}
