//! Recorded pointer scripts.
//!
//! A script is a JSON list of strokes whose points are pointer positions in
//! display space (relative to the top-left of the displayed surface).
//!
//! ```json
//! { "strokes": [ { "tool": "pen", "color": "#e03131", "width": 4, "points": [[10, 10], [80, 40]] } ] }
//! ```

use crate::error::{AppError, AppResult};
use kurbo::{Point, Rect};
use markboard_core::session::{EditorSession, Tool};
use markboard_core::style::SerializableColor;
use markboard_core::surface::Surface;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tool a scripted stroke is drawn with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptTool {
    #[default]
    Pen,
    Eraser,
}

impl From<ScriptTool> for Tool {
    fn from(tool: ScriptTool) -> Self {
        match tool {
            ScriptTool::Pen => Tool::Pen,
            ScriptTool::Eraser => Tool::Eraser,
        }
    }
}

/// One gesture. Omitted color and width keep the session's current values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStroke {
    #[serde(default)]
    pub tool: ScriptTool,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub width: Option<f64>,
    pub points: Vec<[f64; 2]>,
}

/// A recorded sequence of strokes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerScript {
    pub strokes: Vec<ScriptStroke>,
}

impl PointerScript {
    /// Parse a script from JSON.
    pub fn from_json(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a script file.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Feed every stroke through the session as pointer events on `surface`,
    /// displayed at `display` size. Returns the number of strokes drawn.
    pub fn play<S: Surface + ?Sized>(
        &self,
        session: &mut EditorSession,
        surface: &mut S,
        display: Rect,
    ) -> AppResult<usize> {
        let mut drawn = 0;
        for (i, stroke) in self.strokes.iter().enumerate() {
            let Some((first, rest)) = stroke.points.split_first() else {
                log::warn!("script stroke {i} has no points, skipping");
                continue;
            };

            session.set_tool(stroke.tool.into());
            if let Some(hex) = &stroke.color {
                let color =
                    SerializableColor::from_hex(hex).ok_or_else(|| AppError::Script(format!("bad color {hex:?}")))?;
                session.set_color(color);
            }
            if let Some(width) = stroke.width {
                session.set_width(width)?;
            }

            let to_client = |p: &[f64; 2]| Point::new(display.x0 + p[0], display.y0 + p[1]);
            session.pointer_down(surface, display, to_client(first))?;
            for p in rest {
                session.pointer_move(surface, display, to_client(p))?;
            }
            session.pointer_up()?;
            drawn += 1;
        }
        log::debug!("replayed {drawn} strokes");
        Ok(drawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markboard_core::style::InkMode;
    use markboard_render::PixmapSurface;

    const SCRIPT: &str = r##"{
        "strokes": [
            { "color": "#ff0000", "width": 2, "points": [[0, 0], [50, 50]] },
            { "tool": "eraser", "points": [] },
            { "tool": "eraser", "width": 1, "points": [[10, 10], [20, 20]] }
        ]
    }"##;

    #[test]
    fn test_parse_defaults() {
        let script = PointerScript::from_json(SCRIPT).unwrap();
        assert_eq!(script.strokes.len(), 3);
        assert_eq!(script.strokes[0].tool, ScriptTool::Pen);
        assert_eq!(script.strokes[1].color, None);
    }

    #[test]
    fn test_play_maps_display_to_backing() {
        let script = PointerScript::from_json(SCRIPT).unwrap();
        let mut session = EditorSession::default();
        // Displayed at half size
        let mut surface = PixmapSurface::blank(200, 200).unwrap();
        let drawn = script.play(&mut session, &mut surface, Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();

        assert_eq!(drawn, 2);
        let strokes = session.strokes();
        assert_eq!(strokes[0].points()[1], Point::new(100.0, 100.0));
        assert_eq!(strokes[1].style.mode, InkMode::Erase);

        let p = surface.snapshot().pixel(80, 80).unwrap();
        assert_eq!((p.red(), p.green(), p.blue()), (255, 0, 0));
        // Erased
        let p = surface.snapshot().pixel(30, 30).unwrap();
        assert_eq!((p.red(), p.green(), p.blue()), (255, 255, 255));
    }

    #[test]
    fn test_bad_color_rejected() {
        let script = PointerScript::from_json(r#"{"strokes": [{"color": "red", "points": [[1, 1]]}]}"#).unwrap();
        let mut surface = PixmapSurface::blank(10, 10).unwrap();
        let result = script.play(&mut EditorSession::default(), &mut surface, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(matches!(result, Err(AppError::Script(_))));
    }
}
