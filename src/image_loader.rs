use std::path::PathBuf;

use image::{imageops, RgbaImage};
use log::debug;

use crate::error::ImageLoadError;

/// Where a photo comes from
#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
    /// Already-decoded pixels, for hosts that decode elsewhere and for tests
    Image(RgbaImage),
}

impl ImageSource {
    /// Resolves the source into RGBA pixels. This is the one suspension
    /// point of opening a session; everything after it is synchronous.
    pub async fn resolve(self) -> Result<RgbaImage, ImageLoadError> {
        match self {
            ImageSource::Path(path) => {
                let bytes = std::fs::read(&path).map_err(|source| ImageLoadError::Read {
                    path: path.clone(),
                    source,
                })?;
                decode(&bytes)
            }
            ImageSource::Bytes(bytes) => decode(&bytes),
            ImageSource::Image(image) => Ok(image),
        }
    }
}

fn decode(bytes: &[u8]) -> Result<RgbaImage, ImageLoadError> {
    let decoded = image::load_from_memory(bytes)?;
    debug!("decoded image {}x{}", decoded.width(), decoded.height());
    Ok(decoded.to_rgba8())
}

/// Display size for a photo: fit within `max` with the aspect ratio
/// preserved. Photos already inside the bound keep their size; nothing is
/// ever upscaled.
pub fn fit_within(source: (u32, u32), max: (f32, f32)) -> (u32, u32) {
    let (width, height) = (source.0 as f32, source.1 as f32);
    let ratio = (max.0 / width).min(max.1 / height).min(1.0);
    (
        ((width * ratio).round() as u32).max(1),
        ((height * ratio).round() as u32).max(1),
    )
}

/// Scales a decoded photo down to its display size
pub fn scale_for_display(image: RgbaImage, max: (f32, f32)) -> RgbaImage {
    let dims = image.dimensions();
    let (width, height) = fit_within(dims, max);
    if (width, height) == dims {
        image
    } else {
        debug!(
            "scaling {}x{} photo to {width}x{height} for display",
            dims.0, dims.1
        );
        imageops::resize(&image, width, height, imageops::FilterType::Triangle)
    }
}
