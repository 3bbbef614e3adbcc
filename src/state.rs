use egui::Vec2;

use crate::element::ElementId;
use crate::geometry::Handle;

/// Placement tools a host can arm. An armed tool turns the next canvas
/// press into a placed element, then disarms (one-shot placement).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Pixelate,
    Emoji,
}

impl ToolKind {
    pub fn label(&self) -> &'static str {
        match self {
            ToolKind::Pixelate => "pixelate",
            ToolKind::Emoji => "emoji",
        }
    }
}

/// What the pointer is doing between press and release.
///
/// Transitions are driven by the session: a press enters `Dragging` or
/// `Resizing` (or stays `Idle` for placement/deselection) and any release
/// returns to `Idle`. There is no deeper nesting, so stray releases are
/// harmless.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PointerState {
    #[default]
    Idle,
    /// Moving the grabbed element; `offset` is press point minus the
    /// element's top-left, so the grab point stays under the pointer.
    Dragging { id: ElementId, offset: Vec2 },
    /// Resizing via one handle of the selected element
    Resizing { id: ElementId, handle: Handle },
}

impl PointerState {
    pub fn is_idle(&self) -> bool {
        matches!(self, PointerState::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, PointerState::Dragging { .. })
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self, PointerState::Resizing { .. })
    }

    /// Element the gesture acts on, if any
    pub fn active_element(&self) -> Option<ElementId> {
        match self {
            PointerState::Idle => None,
            PointerState::Dragging { id, .. } | PointerState::Resizing { id, .. } => Some(*id),
        }
    }
}
