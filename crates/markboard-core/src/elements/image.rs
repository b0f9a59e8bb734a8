//! Raster image element.

use super::{ElementId, ElementTrait};
use chrono::{DateTime, Utc};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Encoded format of stored image bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    /// PNG format.
    Png,
    /// JPEG format.
    Jpeg,
    /// WebP format.
    WebP,
}

impl ImageFormat {
    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        None
    }
}

/// A photo or flattened annotation placed on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageElement {
    pub(crate) id: ElementId,
    /// Top-left corner in page space.
    pub position: Point,
    /// Displayed width in page units.
    pub width: f64,
    /// Displayed height in page units.
    pub height: f64,
    /// Intrinsic pixel width of the encoded image.
    pub natural_width: u32,
    /// Intrinsic pixel height of the encoded image.
    pub natural_height: u32,
    pub format: ImageFormat,
    /// Encoded bytes, base64 so documents stay plain JSON.
    pub data_base64: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl ImageElement {
    /// Create an image element displayed at its natural size.
    pub fn new(
        position: Point,
        data: &[u8],
        natural_width: u32,
        natural_height: u32,
        format: ImageFormat,
    ) -> Self {
        use base64::{Engine, engine::general_purpose::STANDARD};

        Self {
            id: Uuid::new_v4(),
            position,
            width: f64::from(natural_width),
            height: f64::from(natural_height),
            natural_width,
            natural_height,
            format,
            data_base64: STANDARD.encode(data),
            created_at: Utc::now(),
        }
    }

    /// Set the displayed size.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Scale to fit within max dimensions, preserving aspect ratio.
    pub fn fit_within(mut self, max_width: f64, max_height: f64) -> Self {
        if self.natural_width == 0 || self.natural_height == 0 {
            return self;
        }
        let aspect = f64::from(self.natural_width) / f64::from(self.natural_height);
        if aspect > max_width / max_height {
            self.width = max_width;
            self.height = max_width / aspect;
        } else {
            self.height = max_height;
            self.width = max_height * aspect;
        }
        self
    }

    /// Decoded bytes, or `None` if the stored base64 is corrupt.
    pub fn data(&self) -> Option<Vec<u8>> {
        use base64::{Engine, engine::general_purpose::STANDARD};
        STANDARD.decode(&self.data_base64).ok()
    }

    /// Replace the encoded content, keeping placement and identity.
    pub(crate) fn replace_data(&mut self, data: &[u8], natural_width: u32, natural_height: u32, format: ImageFormat) {
        use base64::{Engine, engine::general_purpose::STANDARD};
        self.data_base64 = STANDARD.encode(data);
        self.natural_width = natural_width;
        self.natural_height = natural_height;
        self.format = format;
    }
}

impl ElementTrait for ImageElement {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]),
            Some(ImageFormat::Png)
        );
        assert_eq!(ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_magic_bytes(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageFormat::WebP));
        assert_eq!(ImageFormat::from_magic_bytes(&[0x00]), None);
    }

    #[test]
    fn test_data_roundtrip() {
        let bytes = vec![1u8, 2, 3, 250];
        let img = ImageElement::new(Point::ZERO, &bytes, 4, 1, ImageFormat::Png);
        assert_eq!(img.data(), Some(bytes));
    }

    #[test]
    fn test_fit_within() {
        let img = ImageElement::new(Point::ZERO, &[0u8; 10], 1000, 500, ImageFormat::Png);
        let fitted = img.fit_within(400.0, 400.0);
        assert!((fitted.width - 400.0).abs() < 0.01);
        assert!((fitted.height - 200.0).abs() < 0.01);
    }

    #[test]
    fn test_replace_data_keeps_placement() {
        let mut img = ImageElement::new(Point::new(5.0, 6.0), &[0u8; 4], 10, 10, ImageFormat::Jpeg)
            .with_size(300.0, 200.0);
        let id = img.id();
        img.replace_data(&[9u8; 8], 1200, 800, ImageFormat::Png);
        assert_eq!(img.id(), id);
        assert_eq!(img.position, Point::new(5.0, 6.0));
        assert!((img.width - 300.0).abs() < f64::EPSILON);
        assert_eq!((img.natural_width, img.natural_height), (1200, 800));
        assert_eq!(img.format, ImageFormat::Png);
    }
}
