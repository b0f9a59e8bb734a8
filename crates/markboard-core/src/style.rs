//! Colors and ink styles shared by strokes and page elements.

use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    /// Create a color from RGBA channels.
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque color.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Opaque black.
    pub fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    /// Opaque white.
    pub fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Default sticky note yellow.
    pub fn note_yellow() -> Self {
        Self::rgb(255, 235, 130)
    }

    /// Same color with the alpha channel forced to 255.
    pub fn opaque(self) -> Self {
        Self { a: 255, ..self }
    }

    /// Parse a CSS-style hex color (`#rgb`, `#rrggbb`, `#rrggbbaa`).
    ///
    /// Returns `None` for anything else, including named colors.
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                // #rgb -> #rrggbb
                let r = channel(&hex[0..1])? * 17;
                let g = channel(&hex[1..2])? * 17;
                let b = channel(&hex[2..3])? * 17;
                Some(Self::rgb(r, g, b))
            }
            6 => Some(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            8 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb` (or `#rrggbbaa` when not opaque).
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// How a stroke combines with the content already on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InkMode {
    /// Source-over: new ink lands on top of existing content.
    #[default]
    Pigment,
    /// Destination-out: removes existing content along the path.
    Erase,
}

/// Style of a single stroke, fixed when the stroke begins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InkStyle {
    /// Ink color. Always opaque; ignored by erase strokes.
    pub color: SerializableColor,
    /// Nominal brush width in backing pixels.
    pub width: f64,
    pub mode: InkMode,
}

impl InkStyle {
    /// Erase strokes are drawn at this multiple of the nominal width.
    pub const ERASE_WIDTH_FACTOR: f64 = 2.0;

    /// Source-over ink. The color is forced opaque.
    pub fn pigment(color: SerializableColor, width: f64) -> Self {
        Self {
            color: color.opaque(),
            width,
            mode: InkMode::Pigment,
        }
    }

    /// Destination-out ink of nominal `width`.
    pub fn erase(width: f64) -> Self {
        Self {
            color: SerializableColor::black(),
            width,
            mode: InkMode::Erase,
        }
    }

    /// Width actually rasterized for this style.
    pub fn effective_width(&self) -> f64 {
        match self.mode {
            InkMode::Pigment => self.width,
            InkMode::Erase => self.width * Self::ERASE_WIDTH_FACTOR,
        }
    }

    /// Whether the width is a positive, finite number.
    pub fn has_valid_width(&self) -> bool {
        self.width.is_finite() && self.width > 0.0
    }
}

impl Default for InkStyle {
    fn default() -> Self {
        Self::pigment(SerializableColor::black(), 4.0)
    }
}
