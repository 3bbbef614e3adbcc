use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use log::{error, info, warn};
use parking_lot::Mutex;

use crate::config::EditorConfig;
use crate::error::ImageLoadError;
use crate::image_loader::ImageSource;
use crate::input::PointerTranslator;
use crate::panels;
use crate::session::Editor;
use crate::texture::SurfaceTexture;

type DecodeSlot = Arc<Mutex<Option<(u64, Result<RgbaImage, ImageLoadError>)>>>;

/// Demo host around [`Editor`]: opens dropped photos, shows the toolbar
/// and canvas, and writes confirmed sessions to disk as JPEG files.
///
/// Only the config and the save counter persist across runs; sessions are
/// transient by design.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct RedactApp {
    config: EditorConfig,
    save_counter: u32,
    #[serde(skip)]
    pub(crate) editor: Editor,
    #[serde(skip)]
    pub(crate) texture: SurfaceTexture,
    #[serde(skip)]
    pub(crate) translator: PointerTranslator,
    #[serde(skip)]
    pub(crate) decoding: bool,
    #[serde(skip)]
    pub(crate) status: Option<String>,
    /// Decoded photo (or its error) handed over from the decode thread,
    /// tagged with the generation of the open that asked for it
    #[serde(skip)]
    decode_slot: DecodeSlot,
    /// Bumped per open; outcomes of superseded opens are discarded
    #[serde(skip)]
    decode_generation: u64,
    /// Directory of the opened photo, where saves land
    #[serde(skip)]
    source_dir: Option<PathBuf>,
}

impl Default for RedactApp {
    fn default() -> Self {
        Self {
            config: EditorConfig::default(),
            save_counter: 0,
            editor: Editor::default(),
            texture: SurfaceTexture::new(),
            translator: PointerTranslator::default(),
            decoding: false,
            status: None,
            decode_slot: DecodeSlot::default(),
            decode_generation: 0,
            source_dir: None,
        }
    }
}

impl RedactApp {
    /// Called once before the first frame
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut app: RedactApp = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        if app.config.glyph_font.is_none() {
            app.config.glyph_font = default_emoji_font();
        }
        app.editor = Editor::new(app.config.clone());
        app
    }

    /// Starts decoding `path` in the background and shows the loading
    /// state until the session is ready
    pub fn open_path(&mut self, path: PathBuf) {
        let dir = path.parent().map(Path::to_path_buf);
        self.begin_open(ImageSource::Path(path), dir);
    }

    pub(crate) fn begin_open(&mut self, source: ImageSource, source_dir: Option<PathBuf>) {
        self.source_dir = source_dir;
        self.decoding = true;
        self.status = None;
        // supersede any open still in flight: drop an unclaimed outcome
        // and tag this request so late deliveries can be told apart
        self.decode_generation += 1;
        let generation = self.decode_generation;
        let slot = Arc::clone(&self.decode_slot);
        *slot.lock() = None;
        std::thread::spawn(move || {
            let outcome = futures::executor::block_on(source.resolve());
            let mut slot = slot.lock();
            // a slow worker never clobbers a newer open's outcome
            if slot.as_ref().is_none_or(|(newest, _)| *newest < generation) {
                *slot = Some((generation, outcome));
            }
        });
    }

    /// Installs a finished decode as the new session, or keeps waiting
    fn poll_decode(&mut self, ctx: &egui::Context) {
        if !self.decoding {
            return;
        }
        let outcome = self.decode_slot.lock().take();
        match outcome {
            Some((generation, _)) if generation != self.decode_generation => {
                // late delivery from a superseded open; the newest open
                // is still decoding
                ctx.request_repaint_after(std::time::Duration::from_millis(50));
            }
            Some((_, Ok(photo))) => {
                self.decoding = false;
                // the photo is already decoded, so this open resolves
                // without suspending
                match futures::executor::block_on(self.editor.open(ImageSource::Image(photo))) {
                    Ok(()) => {
                        self.texture.forget();
                        self.status = None;
                    }
                    Err(err) => {
                        error!("could not open decoded photo: {err}");
                        self.status = Some(format!("Could not open photo: {err}"));
                    }
                }
            }
            Some((_, Err(err))) => {
                self.decoding = false;
                warn!("photo decode failed: {err}");
                self.status = Some(format!("Could not open photo: {err}"));
            }
            None => {
                ctx.request_repaint_after(std::time::Duration::from_millis(50));
            }
        }
    }

    /// Flattens the session to `redacted-<n>.jpg` beside the source photo
    /// (temp dir as fallback) and closes it
    pub(crate) fn save_flattened(&mut self) {
        match self.editor.confirm() {
            Ok(bytes) => {
                self.save_counter += 1;
                let name = format!("redacted-{}.jpg", self.save_counter);
                let primary = self
                    .source_dir
                    .clone()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(&name);
                let written = match std::fs::write(&primary, &bytes) {
                    Ok(()) => primary,
                    Err(err) => {
                        warn!(
                            "could not write {}: {err}; using the temp dir",
                            primary.display()
                        );
                        let fallback = std::env::temp_dir().join(&name);
                        match std::fs::write(&fallback, &bytes) {
                            Ok(()) => fallback,
                            Err(err) => {
                                error!("could not write {}: {err}", fallback.display());
                                self.status = Some(format!("Save failed: {err}"));
                                return;
                            }
                        }
                    }
                };
                info!("saved {} ({} bytes)", written.display(), bytes.len());
                self.status = Some(format!("Saved {}", written.display()));
                self.texture.forget();
            }
            Err(err) => {
                self.status = Some(format!("Save failed: {err}"));
            }
        }
    }

    pub(crate) fn cancel_session(&mut self) {
        self.editor.cancel();
        self.texture.forget();
        self.status = Some("Editing cancelled".to_string());
    }

    /// Opens the first usable dropped image
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            if !is_image_file(&file) {
                warn!("dropped file is not a supported image: {}", file_label(&file));
                continue;
            }
            if let Some(bytes) = file.bytes {
                let dir = file
                    .path
                    .as_deref()
                    .and_then(Path::parent)
                    .map(Path::to_path_buf);
                self.begin_open(ImageSource::Bytes(bytes.to_vec()), dir);
            } else if let Some(path) = file.path {
                self.open_path(path);
            } else {
                warn!("dropped file has no accessible data: {}", file_label(&file));
                continue;
            }
            break;
        }
    }
}

impl eframe::App for RedactApp {
    /// Called by the framework to save state before shutdown
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_decode(ctx);
        self.handle_dropped_files(ctx);
        preview_files_being_dropped(ctx);

        panels::tools_panel(self, ctx);
        panels::central_panel(self, ctx);
    }
}

fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        return file.mime.starts_with("image/");
    }
    if let Some(path) = &file.path {
        if let Some(ext) = path.extension() {
            let ext = ext.to_string_lossy().to_lowercase();
            return matches!(
                ext.as_str(),
                "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp"
            );
        }
    }
    false
}

fn file_label(file: &egui::DroppedFile) -> String {
    if let Some(path) = &file.path {
        path.display().to_string()
    } else if !file.name.is_empty() {
        file.name.clone()
    } else {
        "unknown".to_owned()
    }
}

/// Dim the window while files hover over it
fn preview_files_being_dropped(ctx: &egui::Context) {
    use egui::{Align2, Color32, Id, LayerId, Order, TextStyle};

    if ctx.input(|i| i.raw.hovered_files.is_empty()) {
        return;
    }
    let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
    let rect = ctx.screen_rect();
    painter.rect_filled(rect, 0.0, Color32::from_black_alpha(192));
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        "Drop to open",
        TextStyle::Heading.resolve(&ctx.style()),
        Color32::WHITE,
    );
}

/// Well-known monochrome emoji font locations; without one, sticker
/// glyphs stay invisible in the rendered surface
fn default_emoji_font() -> Option<PathBuf> {
    const CANDIDATES: [&str; 3] = [
        "/usr/share/fonts/truetype/noto/NotoEmoji-Regular.ttf",
        "/usr/share/fonts/noto/NotoEmoji-Regular.ttf",
        "C:\\Windows\\Fonts\\seguiemj.ttf",
    ];
    for candidate in CANDIDATES {
        let path = PathBuf::from(candidate);
        if path.is_file() {
            info!("using emoji font {}", path.display());
            return Some(path);
        }
    }
    warn!("no emoji font found; stickers will render as empty boxes");
    None
}
