use egui::{Color32, Pos2, Rect, Vec2};
use image::{imageops, RgbaImage};

use crate::config::ChromeStyle;
use crate::document::Document;
use crate::element::{OverlayKind, EMOJI_FONT_FRACTION};
use crate::geometry::handle_positions;
use crate::surface::{DrawSurface, Sampling};

/// Draws the full interactive view: photo, overlays in paint order, then
/// selection chrome on top of everything
pub fn render_editor_view(
    surface: &mut dyn DrawSurface,
    base: &RgbaImage,
    doc: &Document,
    style: &ChromeStyle,
) {
    render_scene(surface, base, doc);
    if let Some(selected) = doc.selected() {
        render_chrome(surface, selected.rect, style);
    }
}

/// Draws the photo and every overlay, without chrome. This is the shared
/// path for the interactive view and for export.
pub fn render_scene(surface: &mut dyn DrawSurface, base: &RgbaImage, doc: &Document) {
    // the photo blit alpha-blends, so each frame starts from an empty
    // surface instead of compositing over the previous one
    surface.clear(Color32::TRANSPARENT);
    let (width, height) = surface.size();
    let full = Rect::from_min_size(Pos2::ZERO, Vec2::new(width as f32, height as f32));
    surface.draw_image(base, full, Sampling::Smooth);

    for element in doc.elements() {
        match &element.kind {
            OverlayKind::Pixelate { block_size } => {
                apply_pixelation(surface, element.rect, *block_size);
            }
            OverlayKind::Emoji { glyph } => {
                draw_emoji(surface, element.rect, glyph);
            }
        }
    }
}

/// Selection outline plus the eight resize handles
pub fn render_chrome(surface: &mut dyn DrawSurface, rect: Rect, style: &ChromeStyle) {
    surface.stroke_rect(rect, style.selection_width, style.selection_color);
    for center in handle_positions(rect) {
        surface.fill_circle(center, style.handle_radius, style.handle_fill);
        surface.stroke_circle(center, style.handle_radius, 1.0, style.handle_outline);
    }
}

/// Mosaics the covered region in place: collapse to a
/// `block_size x block_size` thumbnail, then blow it back up with
/// nearest-neighbor so each thumbnail pixel becomes one hard-edged cell.
/// A larger `block_size` therefore gives a finer mosaic. Regions hanging
/// off the surface mosaic only their visible part.
fn apply_pixelation(surface: &mut dyn DrawSurface, rect: Rect, block_size: u32) {
    let Some((origin, region)) = surface.get_pixel_region(rect) else {
        return;
    };
    let (width, height) = region.dimensions();
    let edge = block_size.max(1);
    let thumb = imageops::resize(&region, edge, edge, imageops::FilterType::Nearest);
    let mosaic = imageops::resize(&thumb, width, height, imageops::FilterType::Nearest);
    surface.set_pixel_region(origin, &mosaic);
}

/// A glyph centered in its box, sized from the smaller box edge
fn draw_emoji(surface: &mut dyn DrawSurface, rect: Rect, glyph: &str) {
    let size = EMOJI_FONT_FRACTION * rect.width().min(rect.height());
    if size < 1.0 {
        return;
    }
    let metrics = surface.measure_text(glyph, size);
    let center = rect.center();
    // half of (ascent + descent) above center puts the glyph's vertical
    // midpoint on the box center; descent is negative
    let origin = Pos2::new(
        center.x - metrics.advance / 2.0,
        center.y + (metrics.ascent + metrics.descent) / 2.0,
    );
    surface.draw_text(glyph, origin, size, Color32::BLACK);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RasterSurface;
    use egui::{pos2, vec2};
    use image::Rgba;

    /// Horizontal gradient so adjacent mosaic cells get distinct colors
    fn gradient_base(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, _| {
            Rgba([(x * 3 % 256) as u8, 60, 90, 255])
        })
    }

    fn doc_with(kind: OverlayKind, rect: Rect, canvas: Vec2) -> Document {
        let mut doc = Document::new();
        doc.add_element(kind, None, canvas);
        doc.update_selected(|e| e.rect = rect);
        doc
    }

    #[test]
    fn scene_without_overlays_is_the_base_photo() {
        let base = gradient_base(64, 48);
        let mut surface = RasterSurface::new(64, 48);
        render_scene(&mut surface, &base, &Document::new());
        assert_eq!(surface.image(), &base);
    }

    #[test]
    fn mosaic_cells_are_uniform() {
        let base = gradient_base(80, 80);
        let mut surface = RasterSurface::new(80, 80);
        let doc = doc_with(
            OverlayKind::pixelate(4),
            Rect::from_min_size(pos2(0.0, 0.0), vec2(40.0, 40.0)),
            vec2(80.0, 80.0),
        );
        render_scene(&mut surface, &base, &doc);

        // 40px region collapsed to 4 cells per axis: 10px cells
        let img = surface.image();
        let cell = img.get_pixel(0, 0);
        for y in 0..10 {
            for x in 0..10 {
                assert_eq!(img.get_pixel(x, y), cell, "cell not uniform at {x},{y}");
            }
        }
        // the next cell over picked a different gradient column
        assert_ne!(img.get_pixel(10, 0), cell);
        // pixels outside the element untouched
        assert_eq!(img.get_pixel(60, 60), base.get_pixel(60, 60));
    }

    #[test]
    fn mosaic_clips_to_surface() {
        let base = gradient_base(40, 40);
        let mut surface = RasterSurface::new(40, 40);
        let doc = doc_with(
            OverlayKind::pixelate(2),
            Rect::from_min_size(pos2(-20.0, -20.0), vec2(40.0, 40.0)),
            vec2(40.0, 40.0),
        );
        // must not panic, and must leave the far corner alone
        render_scene(&mut surface, &base, &doc);
        assert_eq!(surface.image().get_pixel(39, 39), base.get_pixel(39, 39));
    }

    #[test]
    fn chrome_marks_selection_corners() {
        let base = gradient_base(100, 100);
        let mut surface = RasterSurface::new(100, 100);
        let rect = Rect::from_min_size(pos2(30.0, 30.0), vec2(40.0, 40.0));
        let doc = doc_with(OverlayKind::pixelate(15), rect, vec2(100.0, 100.0));

        render_editor_view(&mut surface, &base, &doc, &ChromeStyle::default());
        // handle centers carry the white fill
        assert_eq!(
            surface.image().get_pixel(30, 30),
            &Rgba([255, 255, 255, 255])
        );
        assert_eq!(
            surface.image().get_pixel(70, 70),
            &Rgba([255, 255, 255, 255])
        );
    }

    #[test]
    fn redraw_starts_from_an_empty_surface() {
        // fully transparent photo: regions it leaves uncovered must end
        // up empty, not holding whatever the previous frame drew
        let base = RgbaImage::new(100, 100);
        let mut surface = RasterSurface::new(100, 100);
        let mut doc = doc_with(
            OverlayKind::pixelate(15),
            Rect::from_min_size(pos2(30.0, 30.0), vec2(40.0, 40.0)),
            vec2(100.0, 100.0),
        );

        render_editor_view(&mut surface, &base, &doc, &ChromeStyle::default());
        assert_eq!(
            surface.image().get_pixel(30, 30),
            &Rgba([255, 255, 255, 255])
        );

        doc.reset();
        render_editor_view(&mut surface, &base, &doc, &ChromeStyle::default());
        assert_eq!(surface.image().get_pixel(30, 30), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn unselected_scene_has_no_chrome() {
        let base = gradient_base(100, 100);
        let mut with_selection_cleared = RasterSurface::new(100, 100);
        let mut plain = RasterSurface::new(100, 100);
        let mut doc = doc_with(
            OverlayKind::pixelate(15),
            Rect::from_min_size(pos2(30.0, 30.0), vec2(40.0, 40.0)),
            vec2(100.0, 100.0),
        );
        doc.select(None);

        render_editor_view(&mut with_selection_cleared, &base, &doc, &ChromeStyle::default());
        render_scene(&mut plain, &base, &doc);
        assert_eq!(with_selection_cleared.image(), plain.image());
    }
}
