use std::path::Path;

use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont};
use egui::{Color32, Pos2, Rect};
use image::{imageops, Rgba, RgbaImage};
use log::warn;

/// Filtering used when a blit has to scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sampling {
    /// Bilinear, for photo content
    Smooth,
    /// Nearest-neighbor, for mosaic cells that must stay hard-edged
    Nearest,
}

/// Horizontal advance plus vertical extents of a laid-out line.
/// `descent` is negative (distance below the baseline).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextMetrics {
    pub advance: f32,
    pub ascent: f32,
    pub descent: f32,
}

impl TextMetrics {
    pub fn height(&self) -> f32 {
        self.ascent - self.descent
    }
}

/// Drawing capabilities the render pipeline needs from a target.
///
/// Coordinates are surface pixels with the origin at the top-left, matching
/// element rects. Implementations clip: regions touching or crossing the
/// surface edge shrink instead of erroring, and fully-outside operations do
/// nothing.
pub trait DrawSurface {
    fn size(&self) -> (u32, u32);

    fn clear(&mut self, color: Color32);

    /// Blits `src` scaled into `dest`, alpha-blending over what is there
    fn draw_image(&mut self, src: &RgbaImage, dest: Rect, sampling: Sampling);

    /// Copies out the pixels under `rect`, clipped to the surface, along
    /// with the clipped region's top-left. `None` when nothing of `rect`
    /// lies on the surface.
    fn get_pixel_region(&self, rect: Rect) -> Option<(Pos2, RgbaImage)>;

    /// Pastes `pixels` 1:1 with its top-left at `top_left`, clipped
    fn set_pixel_region(&mut self, top_left: Pos2, pixels: &RgbaImage);

    /// Lays out `text` at `size` px without drawing it
    fn measure_text(&self, text: &str, size: f32) -> TextMetrics;

    /// Draws `text` with the baseline starting at `origin`
    fn draw_text(&mut self, text: &str, origin: Pos2, size: f32, color: Color32);

    /// Strokes `rect` with the stroke centered on its edges
    fn stroke_rect(&mut self, rect: Rect, width: f32, color: Color32);

    fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32);

    fn stroke_circle(&mut self, center: Pos2, radius: f32, width: f32, color: Color32);
}

/// CPU raster target over an `image::RgbaImage`, with optional glyph
/// rasterization when a font is installed
pub struct RasterSurface {
    pixels: RgbaImage,
    font: Option<FontArc>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_image(RgbaImage::new(width.max(1), height.max(1)))
    }

    pub fn from_image(pixels: RgbaImage) -> Self {
        Self { pixels, font: None }
    }

    pub fn with_font(mut self, font: Option<FontArc>) -> Self {
        self.font = font;
        self
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    fn scaled_font(&self, size: f32) -> Option<ab_glyph::PxScaleFont<&FontArc>> {
        let font = self.font.as_ref()?;
        Some(font.as_scaled(PxScale::from(size.max(1.0))))
    }
}

impl DrawSurface for RasterSurface {
    fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    fn clear(&mut self, color: Color32) {
        let px = to_rgba(color);
        for p in self.pixels.pixels_mut() {
            *p = px;
        }
    }

    fn draw_image(&mut self, src: &RgbaImage, dest: Rect, sampling: Sampling) {
        let Some((_, _, w, h)) = pixel_span(dest) else {
            return;
        };
        let filter = match sampling {
            Sampling::Smooth => imageops::FilterType::Triangle,
            Sampling::Nearest => imageops::FilterType::Nearest,
        };
        let x = dest.min.x.round() as i64;
        let y = dest.min.y.round() as i64;
        if src.dimensions() == (w, h) {
            imageops::overlay(&mut self.pixels, src, x, y);
        } else {
            let scaled = imageops::resize(src, w, h, filter);
            imageops::overlay(&mut self.pixels, &scaled, x, y);
        }
    }

    fn get_pixel_region(&self, rect: Rect) -> Option<(Pos2, RgbaImage)> {
        let (x, y, w, h) = clipped_bounds(rect, self.pixels.dimensions())?;
        let origin = Pos2::new(x as f32, y as f32);
        Some((origin, imageops::crop_imm(&self.pixels, x, y, w, h).to_image()))
    }

    fn set_pixel_region(&mut self, top_left: Pos2, pixels: &RgbaImage) {
        imageops::replace(
            &mut self.pixels,
            pixels,
            top_left.x.round() as i64,
            top_left.y.round() as i64,
        );
    }

    fn measure_text(&self, text: &str, size: f32) -> TextMetrics {
        let Some(scaled) = self.scaled_font(size) else {
            return TextMetrics::default();
        };
        let mut advance = 0.0;
        let mut prev: Option<GlyphId> = None;
        for ch in text.chars() {
            let id = scaled.font().glyph_id(ch);
            if let Some(prev) = prev {
                advance += scaled.kern(prev, id);
            }
            advance += scaled.h_advance(id);
            prev = Some(id);
        }
        TextMetrics {
            advance,
            ascent: scaled.ascent(),
            descent: scaled.descent(),
        }
    }

    fn draw_text(&mut self, text: &str, origin: Pos2, size: f32, color: Color32) {
        let Some(font) = self.font.clone() else {
            return;
        };
        let scaled = font.as_scaled(PxScale::from(size.max(1.0)));
        let (width, height) = self.pixels.dimensions();
        let rgba = to_rgba(color);

        let mut caret = origin.x;
        let mut prev: Option<GlyphId> = None;
        for ch in text.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = prev {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scaled.scale(), ab_glyph::point(caret, origin.y));
            caret += scaled.h_advance(id);
            prev = Some(id);

            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i64 + gx as i64;
                let py = bounds.min.y as i64 + gy as i64;
                if px < 0 || py < 0 || px >= width as i64 || py >= height as i64 {
                    return;
                }
                let dst = self.pixels.get_pixel_mut(px as u32, py as u32);
                blend(dst, rgba, coverage);
            });
        }
    }

    fn stroke_rect(&mut self, rect: Rect, width: f32, color: Color32) {
        let half = width / 2.0;
        let (min, max) = (rect.min, rect.max);
        let bars = [
            // top, bottom, left, right; stroke centered on the edge path
            Rect::from_min_max(
                Pos2::new(min.x - half, min.y - half),
                Pos2::new(max.x + half, min.y + half),
            ),
            Rect::from_min_max(
                Pos2::new(min.x - half, max.y - half),
                Pos2::new(max.x + half, max.y + half),
            ),
            Rect::from_min_max(
                Pos2::new(min.x - half, min.y + half),
                Pos2::new(min.x + half, max.y - half),
            ),
            Rect::from_min_max(
                Pos2::new(max.x - half, min.y + half),
                Pos2::new(max.x + half, max.y - half),
            ),
        ];
        let rgba = to_rgba(color);
        for bar in bars {
            self.fill_rect_px(bar, rgba);
        }
    }

    fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32) {
        let rgba = to_rgba(color);
        let alpha = color.a() as f32 / 255.0;
        let r2 = radius * radius;
        self.for_each_px_around(center, radius, |dx2_dy2, dst| {
            if dx2_dy2 <= r2 {
                blend(dst, rgba, alpha);
            }
        });
    }

    fn stroke_circle(&mut self, center: Pos2, radius: f32, width: f32, color: Color32) {
        let rgba = to_rgba(color);
        let alpha = color.a() as f32 / 255.0;
        let outer = radius + width / 2.0;
        let inner = (radius - width / 2.0).max(0.0);
        let (outer2, inner2) = (outer * outer, inner * inner);
        self.for_each_px_around(center, outer, |dx2_dy2, dst| {
            if dx2_dy2 <= outer2 && dx2_dy2 >= inner2 {
                blend(dst, rgba, alpha);
            }
        });
    }
}

impl RasterSurface {
    fn fill_rect_px(&mut self, rect: Rect, rgba: Rgba<u8>) {
        let Some((x, y, w, h)) = clipped_bounds(rect, self.pixels.dimensions()) else {
            return;
        };
        let alpha = rgba[3] as f32 / 255.0;
        for py in y..y + h {
            for px in x..x + w {
                blend(self.pixels.get_pixel_mut(px, py), rgba, alpha);
            }
        }
    }

    /// Visits every surface pixel within `reach` of `center`, passing the
    /// squared distance from the pixel center
    fn for_each_px_around(
        &mut self,
        center: Pos2,
        reach: f32,
        mut visit: impl FnMut(f32, &mut Rgba<u8>),
    ) {
        let bbox = Rect::from_center_size(center, egui::Vec2::splat(reach * 2.0 + 2.0));
        let Some((x, y, w, h)) = clipped_bounds(bbox, self.pixels.dimensions()) else {
            return;
        };
        for py in y..y + h {
            for px in x..x + w {
                let dx = px as f32 + 0.5 - center.x;
                let dy = py as f32 + 0.5 - center.y;
                visit(dx * dx + dy * dy, self.pixels.get_pixel_mut(px, py));
            }
        }
    }
}

/// Reads a TTF/OTF file for glyph rendering. Failures are logged and
/// collapse to `None` so a bad font degrades emoji to empty boxes instead
/// of failing the session.
pub fn load_glyph_font(path: &Path) -> Option<FontArc> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("could not read glyph font {}: {err}", path.display());
            return None;
        }
    };
    match FontArc::try_from_vec(bytes) {
        Ok(font) => Some(font),
        Err(err) => {
            warn!("could not parse glyph font {}: {err}", path.display());
            None
        }
    }
}

fn to_rgba(color: Color32) -> Rgba<u8> {
    Rgba([color.r(), color.g(), color.b(), color.a()])
}

fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>, alpha: f32) {
    let a = alpha.clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }
    for c in 0..3 {
        dst[c] = (src[c] as f32 * a + dst[c] as f32 * (1.0 - a)).round() as u8;
    }
    let dst_a = dst[3] as f32 / 255.0;
    dst[3] = ((a + dst_a * (1.0 - a)) * 255.0).round() as u8;
}

/// Integer span of `rect` after rounding, `None` when degenerate
fn pixel_span(rect: Rect) -> Option<(i64, i64, u32, u32)> {
    let x0 = rect.min.x.round() as i64;
    let y0 = rect.min.y.round() as i64;
    let x1 = rect.max.x.round() as i64;
    let y1 = rect.max.y.round() as i64;
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some((x0, y0, (x1 - x0) as u32, (y1 - y0) as u32))
}

/// `rect` rounded and clipped against a surface of `dims`, as x/y/w/h.
/// `None` when no pixels remain.
fn clipped_bounds(rect: Rect, dims: (u32, u32)) -> Option<(u32, u32, u32, u32)> {
    let (x0, y0, w, h) = pixel_span(rect)?;
    let x1 = x0 + w as i64;
    let y1 = y0 + h as i64;
    let cx0 = x0.max(0);
    let cy0 = y0.max(0);
    let cx1 = x1.min(dims.0 as i64);
    let cy1 = y1.min(dims.1 as i64);
    if cx1 <= cx0 || cy1 <= cy0 {
        return None;
    }
    Some((
        cx0 as u32,
        cy0 as u32,
        (cx1 - cx0) as u32,
        (cy1 - cy0) as u32,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(rgba))
    }

    #[test]
    fn clipped_bounds_shrinks_at_edges() {
        let dims = (100, 80);
        let inside = Rect::from_min_size(pos2(10.0, 10.0), vec2(20.0, 20.0));
        assert_eq!(clipped_bounds(inside, dims), Some((10, 10, 20, 20)));

        let hanging = Rect::from_min_size(pos2(-5.0, 70.0), vec2(20.0, 20.0));
        assert_eq!(clipped_bounds(hanging, dims), Some((0, 70, 15, 10)));

        let outside = Rect::from_min_size(pos2(200.0, 0.0), vec2(10.0, 10.0));
        assert_eq!(clipped_bounds(outside, dims), None);

        let degenerate = Rect::from_min_size(pos2(10.0, 10.0), vec2(0.0, 5.0));
        assert_eq!(clipped_bounds(degenerate, dims), None);
    }

    #[test]
    fn region_roundtrip_is_lossless() {
        let mut surface = RasterSurface::new(50, 50);
        surface.clear(Color32::from_rgb(10, 20, 30));
        let patch = solid(8, 8, [200, 0, 0, 255]);
        surface.set_pixel_region(pos2(12.0, 14.0), &patch);

        let (origin, copied) = surface
            .get_pixel_region(Rect::from_min_size(pos2(12.0, 14.0), vec2(8.0, 8.0)))
            .unwrap();
        assert_eq!(origin, pos2(12.0, 14.0));
        assert_eq!(copied.dimensions(), (8, 8));
        assert_eq!(copied.get_pixel(0, 0), &Rgba([200, 0, 0, 255]));
        assert_eq!(copied.get_pixel(7, 7), &Rgba([200, 0, 0, 255]));
        // neighbor untouched
        assert_eq!(
            surface.image().get_pixel(11, 14),
            &Rgba([10, 20, 30, 255])
        );
    }

    #[test]
    fn set_region_clips_offscreen_parts() {
        let mut surface = RasterSurface::new(20, 20);
        surface.clear(Color32::BLACK);
        let patch = solid(10, 10, [0, 255, 0, 255]);
        surface.set_pixel_region(pos2(-4.0, 15.0), &patch);
        assert_eq!(surface.image().get_pixel(0, 15), &Rgba([0, 255, 0, 255]));
        assert_eq!(surface.image().get_pixel(5, 19), &Rgba([0, 255, 0, 255]));
        assert_eq!(surface.image().get_pixel(6, 15), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn draw_image_scales_to_dest() {
        let mut surface = RasterSurface::new(40, 40);
        surface.clear(Color32::BLACK);
        let src = solid(4, 4, [255, 255, 255, 255]);
        surface.draw_image(
            &src,
            Rect::from_min_size(pos2(10.0, 10.0), vec2(8.0, 8.0)),
            Sampling::Nearest,
        );
        assert_eq!(surface.image().get_pixel(10, 10), &Rgba([255, 255, 255, 255]));
        assert_eq!(surface.image().get_pixel(17, 17), &Rgba([255, 255, 255, 255]));
        assert_eq!(surface.image().get_pixel(18, 18), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn fill_circle_stays_within_radius() {
        let mut surface = RasterSurface::new(30, 30);
        surface.clear(Color32::BLACK);
        surface.fill_circle(pos2(15.0, 15.0), 5.0, Color32::WHITE);
        assert_eq!(surface.image().get_pixel(15, 15), &Rgba([255, 255, 255, 255]));
        // well outside the radius
        assert_eq!(surface.image().get_pixel(15, 22), &Rgba([0, 0, 0, 255]));
        assert_eq!(surface.image().get_pixel(22, 15), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn stroke_rect_leaves_interior_untouched() {
        let mut surface = RasterSurface::new(40, 40);
        surface.clear(Color32::BLACK);
        let rect = Rect::from_min_size(pos2(10.0, 10.0), vec2(20.0, 20.0));
        surface.stroke_rect(rect, 2.0, Color32::WHITE);
        assert_eq!(surface.image().get_pixel(10, 10), &Rgba([255, 255, 255, 255]));
        assert_eq!(surface.image().get_pixel(20, 20), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn text_without_font_is_a_noop() {
        let mut surface = RasterSurface::new(30, 30);
        surface.clear(Color32::BLACK);
        assert!(!surface.has_font());
        assert_eq!(surface.measure_text("😊", 24.0), TextMetrics::default());
        surface.draw_text("😊", pos2(5.0, 20.0), 24.0, Color32::WHITE);
        assert!(surface
            .image()
            .pixels()
            .all(|p| *p == Rgba([0, 0, 0, 255])));
    }
}
