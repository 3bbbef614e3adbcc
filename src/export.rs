use ab_glyph::FontArc;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, RgbaImage};

use crate::document::Document;
use crate::error::EditorError;
use crate::renderer;
use crate::surface::RasterSurface;

/// Flattens the composition to encoded JPEG bytes at surface resolution.
///
/// Renders onto a fresh surface, so selection chrome can never leak into
/// the output even while an element is selected. Alpha is dropped for the
/// encoder, which runs at its default quality.
pub fn flatten_to_jpeg(
    base: &RgbaImage,
    doc: &Document,
    font: Option<FontArc>,
) -> Result<Vec<u8>, EditorError> {
    let (width, height) = base.dimensions();
    let mut surface = RasterSurface::from_image(RgbaImage::new(width, height)).with_font(font);
    renderer::render_scene(&mut surface, base, doc);

    let rgb = DynamicImage::ImageRgba8(surface.into_image()).to_rgb8();
    let mut bytes = Vec::new();
    JpegEncoder::new(&mut bytes)
        .encode(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(EditorError::Encode)?;
    Ok(bytes)
}
