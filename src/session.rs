use ab_glyph::FontArc;
use egui::{CursorIcon, Pos2, Rect, Vec2};
use image::RgbaImage;
use log::{debug, info};
use uuid::Uuid;

use crate::config::EditorConfig;
use crate::document::Document;
use crate::element::{
    OverlayKind, BLOCK_SIZE_RANGE, MIN_ELEMENT_SIZE, UNIFORM_SIZE_RANGE,
};
use crate::error::EditorError;
use crate::export;
use crate::geometry::{nearest_handle, Handle, HANDLE_HIT_RADIUS};
use crate::image_loader::{scale_for_display, ImageSource};
use crate::renderer;
use crate::state::{PointerState, ToolKind};
use crate::surface::{load_glyph_font, RasterSurface};

/// One photo being edited: the display-scaled base image, the overlays on
/// it, and the interaction state driving them.
///
/// All coordinates are surface pixels. The surface is created at the
/// photo's display size (fit within `config.max_display`, never upscaled)
/// and that size never changes for the life of the session.
pub struct EditorSession {
    id: Uuid,
    base: RgbaImage,
    surface: RasterSurface,
    doc: Document,
    active_tool: Option<ToolKind>,
    active_glyph: String,
    pointer: PointerState,
    default_block_size: u32,
    font: Option<FontArc>,
    config: EditorConfig,
    dirty: bool,
    surface_version: u64,
}

impl EditorSession {
    /// Builds a session from already-decoded pixels
    pub fn new(photo: RgbaImage, config: EditorConfig) -> Self {
        let id = Uuid::new_v4();
        let source_dims = photo.dimensions();
        let base = scale_for_display(photo, config.max_display_f32());
        let (width, height) = base.dimensions();
        info!(
            "session {id}: {}x{} photo on a {width}x{height} surface",
            source_dims.0, source_dims.1
        );

        let font = match &config.glyph_font {
            Some(path) => load_glyph_font(path),
            None => {
                debug!("no glyph font configured; emoji render as empty boxes");
                None
            }
        };

        let active_glyph = config
            .emoji_palette
            .first()
            .cloned()
            .unwrap_or_else(|| "😊".to_string());
        let surface = RasterSurface::from_image(base.clone()).with_font(font.clone());

        let mut session = Self {
            id,
            base,
            surface,
            doc: Document::new(),
            active_tool: None,
            active_glyph,
            pointer: PointerState::Idle,
            default_block_size: config.default_block_size.max(1),
            font,
            config,
            dirty: true,
            surface_version: 0,
        };
        session.render();
        session
    }

    /// Resolves `source` and builds a session from it. Decoding is the
    /// only suspension point; a failure leaves nothing behind.
    pub async fn open(source: ImageSource, config: EditorConfig) -> Result<Self, EditorError> {
        let photo = source.resolve().await?;
        Ok(Self::new(photo, config))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Surface dimensions in pixels
    pub fn size(&self) -> (u32, u32) {
        self.base.dimensions()
    }

    /// Surface dimensions as a vector, the canvas for element placement
    pub fn canvas_size(&self) -> Vec2 {
        let (width, height) = self.size();
        Vec2::new(width as f32, height as f32)
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn pointer_state(&self) -> PointerState {
        self.pointer
    }

    pub fn armed_tool(&self) -> Option<ToolKind> {
        self.active_tool
    }

    /// Arms (or disarms) a placement tool. The armed tool consumes the
    /// next canvas press that hits neither a handle nor an element.
    pub fn arm_tool(&mut self, tool: Option<ToolKind>) {
        if self.active_tool != tool {
            debug!("armed tool: {:?}", tool.map(|t| t.label()));
            self.active_tool = tool;
        }
    }

    pub fn active_glyph(&self) -> &str {
        &self.active_glyph
    }

    /// Sticker glyphs this session offers
    pub fn emoji_palette(&self) -> &[String] {
        &self.config.emoji_palette
    }

    /// Glyph used when the armed emoji tool places an element
    pub fn set_active_glyph(&mut self, glyph: impl Into<String>) {
        self.active_glyph = glyph.into();
    }

    pub fn default_block_size(&self) -> u32 {
        self.default_block_size
    }

    /// Block size applied to subsequently placed pixelation elements
    pub fn set_default_block_size(&mut self, block_size: u32) {
        self.default_block_size = block_size
            .clamp(*BLOCK_SIZE_RANGE.start(), *BLOCK_SIZE_RANGE.end());
    }

    /// A press on the canvas. Priority: the selected element's resize
    /// handles, then the topmost element under the pointer, then an armed
    /// tool placing a fresh element, and finally deselection.
    pub fn pointer_down(&mut self, p: Pos2) {
        if let Some(selected) = self.doc.selected() {
            if let Some(handle) = nearest_handle(p, selected.rect, HANDLE_HIT_RADIUS) {
                debug!("resize start: element {} via {:?}", selected.id, handle);
                self.pointer = PointerState::Resizing {
                    id: selected.id,
                    handle,
                };
                return;
            }
        }

        if let Some(element) = self.doc.topmost_at(p) {
            let id = element.id;
            let offset = p - element.rect.min;
            self.doc.select(Some(id));
            self.pointer = PointerState::Dragging { id, offset };
            self.dirty = true;
            debug!("drag start: element {id}");
            return;
        }

        if let Some(tool) = self.active_tool.take() {
            let kind = match tool {
                ToolKind::Pixelate => OverlayKind::pixelate(self.default_block_size),
                ToolKind::Emoji => OverlayKind::emoji(self.active_glyph.clone()),
            };
            let canvas = self.canvas_size();
            let id = self.doc.add_element(kind, Some(p), canvas);
            self.dirty = true;
            info!("placed {} element {id} at {p:?}", tool.label());
            return;
        }

        if self.doc.selected_id().is_some() {
            self.doc.select(None);
            self.dirty = true;
        }
    }

    /// Pointer movement while pressed: advances an active drag or resize
    pub fn pointer_move(&mut self, p: Pos2) {
        match self.pointer {
            PointerState::Dragging { id, offset } => {
                if self.doc.update(id, |e| {
                    e.rect = Rect::from_min_size(p - offset, e.rect.size());
                }) {
                    self.dirty = true;
                }
            }
            PointerState::Resizing { id, handle } => {
                if self.doc.update(id, |e| apply_resize(&mut e.rect, handle, p)) {
                    self.dirty = true;
                }
            }
            PointerState::Idle => {}
        }
    }

    /// Any release ends the gesture, wherever it happens. Selection and
    /// element geometry stay as the gesture left them.
    pub fn pointer_up(&mut self) {
        if !self.pointer.is_idle() {
            debug!("pointer gesture finished");
            self.pointer = PointerState::Idle;
        }
    }

    /// Cursor feedback for the pointer resting at `p`
    pub fn cursor_hint(&self, p: Pos2) -> CursorIcon {
        match self.pointer {
            PointerState::Dragging { .. } => return CursorIcon::Grabbing,
            PointerState::Resizing { handle, .. } => return handle.cursor_icon(),
            PointerState::Idle => {}
        }
        if let Some(selected) = self.doc.selected() {
            if let Some(handle) = nearest_handle(p, selected.rect, HANDLE_HIT_RADIUS) {
                return handle.cursor_icon();
            }
        }
        if self.doc.topmost_at(p).is_some() {
            return CursorIcon::Grab;
        }
        if self.active_tool.is_some() {
            return CursorIcon::Crosshair;
        }
        CursorIcon::Default
    }

    /// Adds a pixelation block in the canvas center, selected. Placement
    /// always spends the armed tool, here as much as on a canvas press.
    pub fn add_pixelate_centered(&mut self) {
        let kind = OverlayKind::pixelate(self.default_block_size);
        let canvas = self.canvas_size();
        let id = self.doc.add_element(kind, None, canvas);
        self.active_tool = None;
        self.dirty = true;
        info!("placed pixelate element {id} at canvas center");
    }

    /// Adds a sticker with `glyph` in the canvas center, selected, and
    /// makes `glyph` the active one for armed placement
    pub fn add_emoji_centered(&mut self, glyph: &str) {
        self.active_glyph = glyph.to_string();
        let canvas = self.canvas_size();
        let id = self.doc.add_element(OverlayKind::emoji(glyph), None, canvas);
        self.active_tool = None;
        self.dirty = true;
        info!("placed emoji element {id} at canvas center");
    }

    /// Sets the selected pixelation element's block size (slider range
    /// applies). No-op on emoji elements and empty selections.
    pub fn set_selected_block_size(&mut self, block_size: u32) -> bool {
        let clamped = block_size.clamp(*BLOCK_SIZE_RANGE.start(), *BLOCK_SIZE_RANGE.end());
        let mut changed = false;
        self.doc.update_selected(|e| {
            if let OverlayKind::Pixelate { block_size } = &mut e.kind {
                if *block_size != clamped {
                    *block_size = clamped;
                    changed = true;
                }
            }
        });
        if changed {
            self.dirty = true;
        }
        changed
    }

    /// Makes the selected element a square of `edge` pixels, keeping its
    /// top-left in place (slider range applies)
    pub fn set_selected_uniform_size(&mut self, edge: f32) -> bool {
        let clamped = edge.clamp(*UNIFORM_SIZE_RANGE.start(), *UNIFORM_SIZE_RANGE.end());
        let mut changed = false;
        self.doc.update_selected(|e| {
            if e.rect.size() != Vec2::splat(clamped) {
                e.rect = Rect::from_min_size(e.rect.min, Vec2::splat(clamped));
                changed = true;
            }
        });
        if changed {
            self.dirty = true;
        }
        changed
    }

    pub fn remove_selected(&mut self) -> bool {
        let removed = self.doc.remove_selected();
        if removed {
            self.dirty = true;
            info!("removed selected element");
        }
        removed
    }

    /// Clears every overlay, keeping the photo
    pub fn reset(&mut self) {
        if !self.doc.is_empty() || self.doc.selected_id().is_some() {
            self.doc.reset();
            self.pointer = PointerState::Idle;
            self.dirty = true;
            info!("session {} reset", self.id);
        }
    }

    /// Redraws the surface if anything changed since the last call.
    /// Mutations only mark the session dirty, so a burst of pointer moves
    /// costs one redraw per frame.
    pub fn render(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        renderer::render_editor_view(&mut self.surface, &self.base, &self.doc, &self.config.style);
        self.surface_version += 1;
        self.dirty = false;
        true
    }

    /// Interactive surface as last rendered
    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    /// Bumped on every redraw; lets the widget skip texture re-uploads
    pub fn surface_version(&self) -> u64 {
        self.surface_version
    }

    /// Flattens photo plus overlays (no chrome) to JPEG bytes
    pub fn export_jpeg(&self) -> Result<Vec<u8>, EditorError> {
        export::flatten_to_jpeg(&self.base, &self.doc, self.font.clone())
    }
}

/// The host-facing editor: at most one open session, plus the config new
/// sessions inherit
#[derive(Default)]
pub struct Editor {
    config: EditorConfig,
    session: Option<EditorSession>,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&EditorSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut EditorSession> {
        self.session.as_mut()
    }

    /// Opens `source` for editing, replacing any current session. On
    /// failure the previous session stays untouched.
    pub async fn open(&mut self, source: ImageSource) -> Result<(), EditorError> {
        let session = EditorSession::open(source, self.config.clone()).await?;
        self.session = Some(session);
        Ok(())
    }

    /// Discards the current session and everything in it
    pub fn cancel(&mut self) {
        if let Some(session) = self.session.take() {
            info!("session {} cancelled", session.id());
        }
    }

    /// Flattens the current session to JPEG bytes and closes it. The
    /// session survives a failed export.
    pub fn confirm(&mut self) -> Result<Vec<u8>, EditorError> {
        let session = self.session.as_ref().ok_or(EditorError::NoActiveSession)?;
        let bytes = session.export_jpeg()?;
        info!("session {} flattened to {} bytes", session.id(), bytes.len());
        self.session = None;
        Ok(bytes)
    }
}

/// One step of a corner resize. The dragged corner follows the pointer on
/// both axes; only width and height are clamped to the minimum, never the
/// computed position, so pushing past the floor slides the box instead of
/// stretching it. Edge handles track the pointer without resizing.
fn apply_resize(rect: &mut Rect, handle: Handle, p: Pos2) {
    let (x, y) = (rect.min.x, rect.min.y);
    let (w, h) = (rect.width(), rect.height());
    let (nx, ny, nw, nh) = match handle {
        Handle::TopLeft => (p.x, p.y, w + (x - p.x), h + (y - p.y)),
        Handle::TopRight => (x, p.y, p.x - x, h + (y - p.y)),
        Handle::BottomRight => (x, y, p.x - x, p.y - y),
        Handle::BottomLeft => (p.x, y, w + (x - p.x), p.y - y),
        _ => return,
    };
    *rect = Rect::from_min_size(
        Pos2::new(nx, ny),
        Vec2::new(nw.max(MIN_ELEMENT_SIZE), nh.max(MIN_ELEMENT_SIZE)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn rect() -> Rect {
        Rect::from_min_size(pos2(100.0, 100.0), Vec2::new(60.0, 40.0))
    }

    #[test]
    fn bottom_right_resize_keeps_origin() {
        let mut r = rect();
        apply_resize(&mut r, Handle::BottomRight, pos2(190.0, 160.0));
        assert_eq!(r.min, pos2(100.0, 100.0));
        assert_eq!(r.width(), 90.0);
        assert_eq!(r.height(), 60.0);
    }

    #[test]
    fn top_left_resize_moves_origin() {
        let mut r = rect();
        apply_resize(&mut r, Handle::TopLeft, pos2(90.0, 80.0));
        assert_eq!(r.min, pos2(90.0, 80.0));
        assert_eq!(r.width(), 70.0);
        assert_eq!(r.height(), 60.0);
    }

    #[test]
    fn top_right_resize_moves_only_y() {
        let mut r = rect();
        apply_resize(&mut r, Handle::TopRight, pos2(180.0, 90.0));
        assert_eq!(r.min, pos2(100.0, 90.0));
        assert_eq!(r.width(), 80.0);
        assert_eq!(r.height(), 50.0);
    }

    #[test]
    fn bottom_left_resize_moves_only_x() {
        let mut r = rect();
        apply_resize(&mut r, Handle::BottomLeft, pos2(80.0, 170.0));
        assert_eq!(r.min, pos2(80.0, 100.0));
        assert_eq!(r.width(), 80.0);
        assert_eq!(r.height(), 70.0);
    }

    #[test]
    fn size_clamps_but_position_follows_the_pointer() {
        let mut r = rect();
        // drag the top-left corner far past the bottom-right
        apply_resize(&mut r, Handle::TopLeft, pos2(400.0, 400.0));
        assert_eq!(r.min, pos2(400.0, 400.0));
        assert_eq!(r.width(), MIN_ELEMENT_SIZE);
        assert_eq!(r.height(), MIN_ELEMENT_SIZE);
    }

    #[test]
    fn edge_handles_leave_the_rect_alone() {
        for handle in [
            Handle::TopMid,
            Handle::RightMid,
            Handle::BottomMid,
            Handle::LeftMid,
        ] {
            let mut r = rect();
            apply_resize(&mut r, handle, pos2(0.0, 0.0));
            assert_eq!(r, rect());
        }
    }
}
