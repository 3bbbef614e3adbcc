use egui::{Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Smallest width/height an interactive resize may leave an element with
pub const MIN_ELEMENT_SIZE: f32 = 20.0;

/// Thumbnail edge length a fresh pixelation block starts with
pub const DEFAULT_BLOCK_SIZE: u32 = 15;
/// Host-facing slider range for per-element block size
pub const BLOCK_SIZE_RANGE: std::ops::RangeInclusive<u32> = 10..=100;
/// Host-facing slider range for the uniform-size control
pub const UNIFORM_SIZE_RANGE: std::ops::RangeInclusive<f32> = 20.0..=300.0;

/// Fraction of the smaller canvas edge a fresh pixelation block covers
pub const PIXELATE_SIZE_FRACTION: f32 = 0.3;
/// Fraction of the smaller canvas edge a fresh emoji sticker covers
pub const EMOJI_SIZE_FRACTION: f32 = 0.2;
/// Emoji glyphs render at this fraction of the smaller element edge
pub const EMOJI_FONT_FRACTION: f32 = 0.8;

/// Stickers offered by default
pub const DEFAULT_EMOJI_PALETTE: [&str; 10] =
    ["😊", "❤️", "🌸", "🌟", "🔞", "💋", "🍑", "💦", "👄", "👅"];

/// Stable identity for an overlay element within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an overlay occludes the photo with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OverlayKind {
    /// Mosaic over the covered region. `block_size` is the edge length of
    /// the intermediate thumbnail the region is collapsed to, so a larger
    /// value yields a finer mosaic.
    Pixelate { block_size: u32 },
    /// A single palette glyph centered in the covered region
    Emoji { glyph: String },
}

impl OverlayKind {
    pub fn pixelate(block_size: u32) -> Self {
        OverlayKind::Pixelate {
            block_size: block_size.max(1),
        }
    }

    pub fn emoji(glyph: impl Into<String>) -> Self {
        OverlayKind::Emoji {
            glyph: glyph.into(),
        }
    }

    /// Fraction of the smaller canvas edge used for a fresh element
    pub fn default_edge_fraction(&self) -> f32 {
        match self {
            OverlayKind::Pixelate { .. } => PIXELATE_SIZE_FRACTION,
            OverlayKind::Emoji { .. } => EMOJI_SIZE_FRACTION,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OverlayKind::Pixelate { .. } => "pixelate",
            OverlayKind::Emoji { .. } => "emoji",
        }
    }
}

/// One occlusion overlay: an axis-aligned box in surface coordinates plus
/// its occlusion kind. Paint order is the owning document's vec order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayElement {
    pub id: ElementId,
    pub rect: Rect,
    pub kind: OverlayKind,
}

impl OverlayElement {
    pub fn new(kind: OverlayKind, rect: Rect) -> Self {
        Self {
            id: ElementId::new(),
            rect,
            kind,
        }
    }

    pub fn is_pixelate(&self) -> bool {
        matches!(self.kind, OverlayKind::Pixelate { .. })
    }

    pub fn is_emoji(&self) -> bool {
        matches!(self.kind, OverlayKind::Emoji { .. })
    }

    /// Default square size for a fresh element of `kind` on a canvas
    pub fn default_size(kind: &OverlayKind, canvas: Vec2) -> Vec2 {
        let edge = kind.default_edge_fraction() * canvas.x.min(canvas.y);
        Vec2::splat(edge)
    }
}
