#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod config;
pub mod document;
pub mod element;
pub mod error;
pub mod export;
pub mod geometry;
pub mod image_loader;
pub mod input;
pub mod panels;
pub mod renderer;
pub mod session;
pub mod state;
pub mod surface;
pub mod texture;

pub use app::RedactApp;
pub use config::{ChromeStyle, EditorConfig};
pub use document::Document;
pub use element::{ElementId, OverlayElement, OverlayKind};
pub use error::{EditorError, ImageLoadError};
pub use export::flatten_to_jpeg;
pub use geometry::Handle;
pub use image_loader::ImageSource;
pub use input::{PointerEvent, PointerTranslator};
pub use renderer::{render_editor_view, render_scene};
pub use session::{Editor, EditorSession};
pub use state::{PointerState, ToolKind};
pub use surface::{DrawSurface, RasterSurface, Sampling, TextMetrics};
pub use texture::SurfaceTexture;
