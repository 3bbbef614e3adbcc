use egui::{CursorIcon, Pos2, Rect};

/// Distance in surface pixels within which a pointer press grabs a handle
pub const HANDLE_HIT_RADIUS: f32 = 6.0;

/// One of the eight resize handles on a selection box, in canonical order:
/// top-left, top-mid, top-right, right-mid, bottom-right, bottom-mid,
/// bottom-left, left-mid. Even indices are corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    TopLeft,
    TopMid,
    TopRight,
    RightMid,
    BottomRight,
    BottomMid,
    BottomLeft,
    LeftMid,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::TopLeft,
        Handle::TopMid,
        Handle::TopRight,
        Handle::RightMid,
        Handle::BottomRight,
        Handle::BottomMid,
        Handle::BottomLeft,
        Handle::LeftMid,
    ];

    /// Index in canonical order
    pub fn index(&self) -> usize {
        match self {
            Handle::TopLeft => 0,
            Handle::TopMid => 1,
            Handle::TopRight => 2,
            Handle::RightMid => 3,
            Handle::BottomRight => 4,
            Handle::BottomMid => 5,
            Handle::BottomLeft => 6,
            Handle::LeftMid => 7,
        }
    }

    pub fn from_index(index: usize) -> Option<Handle> {
        Handle::ALL.get(index).copied()
    }

    /// Only corner handles drive a resize; edge handles are visual
    pub fn is_corner(&self) -> bool {
        self.index() % 2 == 0
    }

    pub fn cursor_icon(&self) -> CursorIcon {
        match self {
            Handle::TopLeft | Handle::BottomRight => CursorIcon::ResizeNwSe,
            Handle::TopRight | Handle::BottomLeft => CursorIcon::ResizeNeSw,
            Handle::TopMid | Handle::BottomMid => CursorIcon::ResizeVertical,
            Handle::RightMid | Handle::LeftMid => CursorIcon::ResizeHorizontal,
        }
    }
}

/// Handle centers for a selection box, in canonical order.
/// Index 0 is `rect.min`, index 4 is `rect.max`.
pub fn handle_positions(rect: Rect) -> [Pos2; 8] {
    let (min, max) = (rect.min, rect.max);
    let cx = (min.x + max.x) / 2.0;
    let cy = (min.y + max.y) / 2.0;
    [
        Pos2::new(min.x, min.y),
        Pos2::new(cx, min.y),
        Pos2::new(max.x, min.y),
        Pos2::new(max.x, cy),
        Pos2::new(max.x, max.y),
        Pos2::new(cx, max.y),
        Pos2::new(min.x, max.y),
        Pos2::new(min.x, cy),
    ]
}

/// Inclusive bounding-box containment: points exactly on an edge hit.
pub fn point_in_box(point: Pos2, rect: Rect) -> bool {
    point.x >= rect.min.x && point.x <= rect.max.x && point.y >= rect.min.y && point.y <= rect.max.y
}

/// First handle in canonical order whose center lies within `radius` of
/// `point`, so ties on overlapping handles of a tiny box resolve to the
/// lower index.
pub fn nearest_handle(point: Pos2, rect: Rect, radius: f32) -> Option<Handle> {
    handle_positions(rect)
        .iter()
        .position(|center| point.distance(*center) <= radius)
        .and_then(Handle::from_index)
}
