//! Pixel buffer helpers: decoding, PNG encoding and type conversions.
//!
//! Pixmaps hold premultiplied RGBA8. Decoded images are premultiplied on the
//! way in and PNG output is demultiplied on the way out.

use crate::renderer::{RenderError, RenderResult};
use kurbo::Affine;
use markboard_core::style::SerializableColor;
use tiny_skia::{ColorU8, IntSize, Pixmap, Transform};

/// Allocate a transparent pixmap.
pub fn new_pixmap(width: u32, height: u32) -> RenderResult<Pixmap> {
    Pixmap::new(width, height).ok_or(RenderError::InvalidSize { width, height })
}

/// Build a pixmap from straight (non-premultiplied) RGBA8 bytes.
pub fn pixmap_from_rgba(rgba: &[u8], width: u32, height: u32) -> RenderResult<Pixmap> {
    let size = IntSize::from_wh(width, height).ok_or(RenderError::InvalidSize { width, height })?;
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(RenderError::Decode(format!(
            "expected {expected} bytes for {width}x{height}, got {}",
            rgba.len()
        )));
    }

    let mut data = Vec::with_capacity(expected);
    for px in rgba.chunks_exact(4) {
        let c = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Pixmap::from_vec(data, size).ok_or(RenderError::InvalidSize { width, height })
}

/// Decode PNG, JPEG or WebP bytes into a pixmap at natural resolution.
pub fn decode_image(bytes: &[u8]) -> RenderResult<Pixmap> {
    let decoded = image::load_from_memory(bytes).map_err(|e| RenderError::Decode(e.to_string()))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    log::debug!("decoded {width}x{height} image ({} bytes)", bytes.len());
    pixmap_from_rgba(rgba.as_raw(), width, height)
}

/// Straight RGBA8 bytes of a pixmap.
pub fn to_rgba(pixmap: &Pixmap) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    rgba
}

/// Encode a pixmap as PNG bytes.
pub fn encode_png(pixmap: &Pixmap) -> RenderResult<Vec<u8>> {
    let rgba = to_rgba(pixmap);
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, pixmap.width(), pixmap.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| RenderError::Encode(format!("header: {e}")))?;
        writer
            .write_image_data(&rgba)
            .map_err(|e| RenderError::Encode(format!("data: {e}")))?;
        writer.finish().map_err(|e| RenderError::Encode(e.to_string()))?;
    }
    Ok(png_data)
}

pub(crate) fn to_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

pub(crate) fn to_color(color: SerializableColor) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_survives_decode() {
        let rgba = [255, 0, 0, 255, 0, 0, 255, 128, 0, 0, 0, 0, 10, 20, 30, 255];
        let pixmap = pixmap_from_rgba(&rgba, 2, 2).unwrap();
        let png = encode_png(&pixmap).unwrap();
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);

        let decoded = decode_image(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (2, 2));
        let opaque = decoded.pixel(0, 0).unwrap();
        assert_eq!((opaque.red(), opaque.green(), opaque.blue(), opaque.alpha()), (255, 0, 0, 255));
        assert_eq!(decoded.pixel(1, 1).unwrap().demultiply().green(), 20);
        // Half-transparent blue stays premultiplied in memory
        assert_eq!(decoded.pixel(1, 0).unwrap().alpha(), 128);
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(matches!(pixmap_from_rgba(&[0; 15], 2, 2), Err(RenderError::Decode(_))));
        assert!(matches!(pixmap_from_rgba(&[], 0, 2), Err(RenderError::InvalidSize { .. })));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(decode_image(b"not an image"), Err(RenderError::Decode(_))));
    }

    #[test]
    fn test_affine_conversion() {
        let t = to_transform(Affine::translate((3.0, 4.0)) * Affine::scale(2.0));
        assert_eq!((t.sx, t.sy, t.tx, t.ty), (2.0, 2.0, 3.0, 4.0));
    }
}
