//! CPU page renderer built on tiny-skia.

use crate::raster::{decode_image, new_pixmap, to_color, to_transform};
use crate::renderer::{RenderContext, RenderResult, Renderer};
use crate::surface::stroke_segment;
use kurbo::{Affine, Rect};
use markboard_core::elements::{ElementId, ElementRef, ElementTrait, ImageElement, StrokeGroup};
use markboard_core::style::SerializableColor;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use tiny_skia::{FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform};

/// Software page renderer.
///
/// Decoded photos are cached per element and re-decoded only when the
/// element's encoded bytes change (for example after a flattened annotation
/// replaced them).
#[derive(Default)]
pub struct SoftwareRenderer {
    image_cache: HashMap<ElementId, (u64, Pixmap)>,
}

impl SoftwareRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of decoded images held in the cache.
    pub fn cached_images(&self) -> usize {
        self.image_cache.len()
    }

    /// Drop cached decodes for elements that no longer exist.
    pub fn retain_images(&mut self, live: impl Fn(ElementId) -> bool) {
        self.image_cache.retain(|id, _| live(*id));
    }

    fn decoded(&mut self, image: &ImageElement) -> Option<&Pixmap> {
        let mut hasher = DefaultHasher::new();
        image.data_base64.hash(&mut hasher);
        let fingerprint = hasher.finish();

        let stale = self
            .image_cache
            .get(&image.id())
            .is_none_or(|(cached, _)| *cached != fingerprint);
        if stale {
            let pixmap = match image.data().map(|bytes| decode_image(&bytes)) {
                Some(Ok(pixmap)) => pixmap,
                Some(Err(e)) => {
                    log::warn!("image {} failed to decode: {e}", image.id());
                    self.image_cache.remove(&image.id());
                    return None;
                }
                None => {
                    log::warn!("image {} has corrupt base64 data", image.id());
                    self.image_cache.remove(&image.id());
                    return None;
                }
            };
            self.image_cache.insert(image.id(), (fingerprint, pixmap));
        }
        self.image_cache.get(&image.id()).map(|(_, pixmap)| pixmap)
    }

    fn render_image(&mut self, target: &mut Pixmap, image: &ImageElement, transform: Affine) {
        let Some(decoded) = self.decoded(image) else {
            render_image_placeholder(target, image.bounds(), transform);
            return;
        };
        let scale_x = image.width / f64::from(decoded.width());
        let scale_y = image.height / f64::from(decoded.height());
        let image_transform = transform
            * Affine::translate((image.position.x, image.position.y))
            * Affine::scale_non_uniform(scale_x, scale_y);

        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        target.draw_pixmap(0, 0, decoded.as_ref(), &paint, to_transform(image_transform), None);
    }
}

impl Renderer for SoftwareRenderer {
    type Output = Pixmap;

    fn render_page(&mut self, ctx: &RenderContext) -> RenderResult<Pixmap> {
        let (width, height) = ctx.backing_size();
        let mut target = new_pixmap(width, height)?;
        target.fill(to_color(self.background_color(ctx)));

        let transform = Affine::scale(ctx.scale_factor) * ctx.view.transform();
        let page_rect = Rect::from_origin_size((0.0, 0.0), ctx.page.size());
        fill_rect(&mut target, page_rect, ctx.page.background, transform);

        for element in ctx.page.elements() {
            match element {
                ElementRef::Image(image) => self.render_image(&mut target, image, transform),
                ElementRef::StrokeGroup(group) => render_stroke_group(&mut target, group, transform)?,
                ElementRef::StickyNote(note) => {
                    fill_rect(&mut target, note.bounds(), note.color, transform);
                    outline_rect(&mut target, note.bounds(), shade(note.color), 1.0, transform);
                }
                // Glyph layout is left to the host; the box is outlined so it stays visible.
                ElementRef::TextBox(text) => {
                    outline_rect(&mut target, text.bounds(), SerializableColor::rgb(200, 200, 200), 1.0, transform);
                }
            }
            if ctx.selected == Some(element.id()) {
                outline_rect(&mut target, element.bounds(), ctx.selection_color, 2.0, transform);
            }
        }

        log::debug!("rendered page {} at {width}x{height}", ctx.page.id());
        Ok(target)
    }
}

/// Strokes are drawn into their own layer so erase strokes only remove ink
/// from the same group.
fn render_stroke_group(target: &mut Pixmap, group: &StrokeGroup, transform: Affine) -> RenderResult<()> {
    if group.strokes().is_empty() {
        return Ok(());
    }
    let mut layer = new_pixmap(target.width(), target.height())?;
    let group_transform = to_transform(transform * group.local_to_page());
    for stroke in group.strokes() {
        for segment in stroke.points().windows(2) {
            stroke_segment(&mut layer, segment[0], segment[1], &stroke.style, group_transform);
        }
    }
    target.draw_pixmap(0, 0, layer.as_ref(), &PixmapPaint::default(), Transform::identity(), None);
    Ok(())
}

fn to_skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_ltrb(rect.x0 as f32, rect.y0 as f32, rect.x1 as f32, rect.y1 as f32)
}

fn solid_paint(color: SerializableColor) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(to_color(color));
    paint.anti_alias = true;
    paint
}

fn fill_rect(target: &mut Pixmap, rect: Rect, color: SerializableColor, transform: Affine) {
    if let Some(rect) = to_skia_rect(rect) {
        target.fill_rect(rect, &solid_paint(color), to_transform(transform), None);
    }
}

fn outline_rect(target: &mut Pixmap, rect: Rect, color: SerializableColor, width: f32, transform: Affine) {
    let Some(rect) = to_skia_rect(rect) else {
        return;
    };
    let path = PathBuilder::from_rect(rect);
    let stroke = Stroke {
        width,
        ..Stroke::default()
    };
    target.stroke_path(&path, &solid_paint(color), &stroke, to_transform(transform), None);
}

/// Render a placeholder for images that couldn't be decoded.
fn render_image_placeholder(target: &mut Pixmap, bounds: Rect, transform: Affine) {
    fill_rect(target, bounds, SerializableColor::rgb(200, 200, 200), transform);

    let mut pb = PathBuilder::new();
    pb.move_to(bounds.x0 as f32, bounds.y0 as f32);
    pb.line_to(bounds.x1 as f32, bounds.y1 as f32);
    pb.move_to(bounds.x1 as f32, bounds.y0 as f32);
    pb.line_to(bounds.x0 as f32, bounds.y1 as f32);
    if let Some(cross) = pb.finish() {
        let stroke = Stroke {
            width: 2.0,
            ..Stroke::default()
        };
        let paint = solid_paint(SerializableColor::rgb(150, 150, 150));
        target.stroke_path(&cross, &paint, &stroke, to_transform(transform), None);
    }
    outline_rect(target, bounds, SerializableColor::rgb(100, 100, 100), 2.0, transform);
}

fn shade(color: SerializableColor) -> SerializableColor {
    let darken = |c: u8| (f32::from(c) * 0.8) as u8;
    SerializableColor::new(darken(color.r), darken(color.g), darken(color.b), color.a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::encode_png;
    use kurbo::{Point, Size};
    use markboard_core::elements::{ElementPatch, ImageFormat, ImagePatch, StickyNote};
    use markboard_core::page::Page;
    use markboard_core::stroke::Stroke as InkStroke;
    use markboard_core::style::InkStyle;
    use markboard_core::view::ViewTransform;
    use tiny_skia::Color;

    fn rgb(pixmap: &Pixmap, x: u32, y: u32) -> (u8, u8, u8) {
        let p = pixmap.pixel(x, y).unwrap().demultiply();
        (p.red(), p.green(), p.blue())
    }

    fn solid_png(color: Color, w: u32, h: u32) -> Vec<u8> {
        let mut pixmap = Pixmap::new(w, h).unwrap();
        pixmap.fill(color);
        encode_png(&pixmap).unwrap()
    }

    #[test]
    fn test_page_background_and_note() {
        let mut page = Page::new(Size::new(100.0, 100.0));
        page.insert(StickyNote::new(Point::new(50.0, 50.0), "hi").into());
        let view = ViewTransform::default();
        let ctx = RenderContext::new(&page, &view, Size::new(120.0, 120.0));

        let out = SoftwareRenderer::new().render_page(&ctx).unwrap();
        assert_eq!(rgb(&out, 10, 10), (255, 255, 255));
        let yellow = SerializableColor::note_yellow();
        assert_eq!(rgb(&out, 75, 75), (yellow.r, yellow.g, yellow.b));
        // Outside the page
        assert_eq!(rgb(&out, 110, 10), (240, 240, 240));
    }

    #[test]
    fn test_view_zoom_applies() {
        let mut page = Page::new(Size::new(100.0, 100.0));
        page.insert(StickyNote::new(Point::new(50.0, 50.0), "").into());
        let mut view = ViewTransform::default();
        view.set_zoom(0.5);
        let ctx = RenderContext::new(&page, &view, Size::new(100.0, 100.0));

        let out = SoftwareRenderer::new().render_page(&ctx).unwrap();
        // Screen (20, 20) is page (40, 40), before the note starts
        assert_eq!(rgb(&out, 20, 20), (255, 255, 255));
        assert_ne!(rgb(&out, 30, 30), (255, 255, 255));
        // Page ends at screen x = 50
        assert_eq!(rgb(&out, 75, 10), (240, 240, 240));
    }

    #[test]
    fn test_image_cached_and_redecoded_on_change() {
        let mut page = Page::new(Size::new(40.0, 40.0));
        let png = solid_png(Color::from_rgba8(255, 0, 0, 255), 4, 4);
        let id = page.insert(ImageElement::new(Point::ZERO, &png, 4, 4, ImageFormat::Png).with_size(20.0, 20.0).into());
        let view = ViewTransform::default();
        let mut renderer = SoftwareRenderer::new();

        let out = renderer.render_page(&RenderContext::new(&page, &view, Size::new(40.0, 40.0))).unwrap();
        assert_eq!(rgb(&out, 10, 10), (255, 0, 0));
        assert_eq!(renderer.cached_images(), 1);

        let patch = ElementPatch::image(ImagePatch {
            data: solid_png(Color::from_rgba8(0, 255, 0, 255), 4, 4),
            natural_width: 4,
            natural_height: 4,
            format: ImageFormat::Png,
        });
        page.get_mut(id).unwrap().apply(patch).unwrap();
        let out = renderer.render_page(&RenderContext::new(&page, &view, Size::new(40.0, 40.0))).unwrap();
        assert_eq!(rgb(&out, 10, 10), (0, 255, 0));
        assert_eq!(renderer.cached_images(), 1);

        renderer.retain_images(|_| false);
        assert_eq!(renderer.cached_images(), 0);
    }

    #[test]
    fn test_broken_image_draws_placeholder() {
        let mut page = Page::new(Size::new(40.0, 40.0));
        page.insert(ImageElement::new(Point::ZERO, b"nope", 20, 20, ImageFormat::Png).into());
        let view = ViewTransform::default();
        let mut renderer = SoftwareRenderer::new();
        let out = renderer.render_page(&RenderContext::new(&page, &view, Size::new(40.0, 40.0))).unwrap();
        assert_ne!(rgb(&out, 15, 5), (255, 255, 255));
        assert_eq!(renderer.cached_images(), 0);
    }

    #[test]
    fn test_stroke_group_scaled_into_page() {
        let mut page = Page::new(Size::new(100.0, 100.0));
        let ink = InkStyle::pigment(SerializableColor::black(), 2.0);
        let stroke = InkStroke::from_points(vec![Point::new(0.0, 5.0), Point::new(10.0, 5.0)], ink).unwrap();
        let mut group = StrokeGroup::from_strokes(Point::new(20.0, 20.0), Size::new(10.0, 10.0), vec![stroke]);
        group.set_size(Size::new(40.0, 40.0));
        page.insert(group.into());
        let view = ViewTransform::default();

        let out = SoftwareRenderer::new()
            .render_page(&RenderContext::new(&page, &view, Size::new(100.0, 100.0)))
            .unwrap();
        // Source (5, 5) maps to page (40, 40)
        assert_eq!(rgb(&out, 40, 40), (0, 0, 0));
        assert_eq!(rgb(&out, 40, 30), (255, 255, 255));
    }
}
