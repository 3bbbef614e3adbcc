use egui::{ColorImage, Context, TextureHandle, TextureOptions};

use crate::surface::RasterSurface;

/// Mirrors the session surface into an egui texture, re-uploading only
/// when the surface version advances. Nearest filtering keeps mosaic
/// cells hard-edged at the 1:1 display scale.
#[derive(Default)]
pub struct SurfaceTexture {
    handle: Option<TextureHandle>,
    uploaded_version: Option<u64>,
}

impl SurfaceTexture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texture for `surface` at `version`, uploading if stale
    pub fn update(
        &mut self,
        ctx: &Context,
        surface: &RasterSurface,
        version: u64,
        label: &str,
    ) -> &TextureHandle {
        let stale = self.uploaded_version != Some(version);
        self.uploaded_version = Some(version);

        let mut fresh = false;
        let handle = self.handle.get_or_insert_with(|| {
            fresh = true;
            ctx.load_texture(label, color_image(surface), TextureOptions::NEAREST)
        });
        // a just-loaded texture already carries this version's pixels
        if stale && !fresh {
            handle.set(color_image(surface), TextureOptions::NEAREST);
        }
        handle
    }

    /// Drops the texture, e.g. when the session closes
    pub fn forget(&mut self) {
        self.handle = None;
        self.uploaded_version = None;
    }

    #[cfg(test)]
    fn uploaded_version(&self) -> Option<u64> {
        self.uploaded_version
    }
}

fn color_image(surface: &RasterSurface) -> ColorImage {
    let image = surface.image();
    let size = [image.width() as usize, image.height() as usize];
    ColorImage::from_rgba_unmultiplied(size, image.as_raw())
}
