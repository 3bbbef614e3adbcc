use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::element::{ElementId, OverlayElement, OverlayKind};
use crate::geometry::point_in_box;

/// The overlays placed on one photo, in paint order, plus the selection.
/// Later elements paint over earlier ones; hit-testing walks the list in
/// reverse so the topmost element wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    elements: Vec<OverlayElement>,
    selected: Option<ElementId>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elements in paint order
    pub fn elements(&self) -> &[OverlayElement] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn selected_id(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&OverlayElement> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: ElementId) -> Option<&OverlayElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Selects `id` (or clears the selection). Selecting an id that is not
    /// in the document clears the selection.
    pub fn select(&mut self, id: Option<ElementId>) {
        self.selected = id.filter(|id| self.get(*id).is_some());
    }

    /// Adds a fresh element of `kind`, sized by its default fraction of the
    /// smaller canvas edge and centered on `anchor` (or the canvas center),
    /// then selects it. Appending puts it on top of the paint order.
    pub fn add_element(
        &mut self,
        kind: OverlayKind,
        anchor: Option<Pos2>,
        canvas: Vec2,
    ) -> ElementId {
        let size = OverlayElement::default_size(&kind, canvas);
        let center = anchor.unwrap_or_else(|| (canvas / 2.0).to_pos2());
        let rect = Rect::from_center_size(center, size);
        let element = OverlayElement::new(kind, rect);
        let id = element.id;
        self.elements.push(element);
        self.selected = Some(id);
        id
    }

    /// Removes the selected element. Returns whether anything was removed;
    /// with no selection this is a no-op.
    pub fn remove_selected(&mut self) -> bool {
        let Some(id) = self.selected.take() else {
            return false;
        };
        let before = self.elements.len();
        self.elements.retain(|e| e.id != id);
        before != self.elements.len()
    }

    /// Applies `patch` to the selected element. Returns whether an element
    /// was patched.
    pub fn update_selected(&mut self, patch: impl FnOnce(&mut OverlayElement)) -> bool {
        let Some(id) = self.selected else {
            return false;
        };
        self.update(id, patch)
    }

    /// Applies `patch` to the element with `id`, if present
    pub fn update(&mut self, id: ElementId, patch: impl FnOnce(&mut OverlayElement)) -> bool {
        match self.elements.iter_mut().find(|e| e.id == id) {
            Some(element) => {
                patch(element);
                true
            }
            None => false,
        }
    }

    /// Topmost element whose box contains `point` (reverse paint order,
    /// edge-inclusive)
    pub fn topmost_at(&self, point: Pos2) -> Option<&OverlayElement> {
        self.elements
            .iter()
            .rev()
            .find(|e| point_in_box(point, e.rect))
    }

    /// Drops every element and the selection
    pub fn reset(&mut self) {
        self.elements.clear();
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    #[test]
    fn add_centers_on_canvas_when_no_anchor() {
        let mut doc = Document::new();
        let id = doc.add_element(OverlayKind::pixelate(15), None, vec2(800.0, 600.0));
        let element = doc.get(id).unwrap();
        // 0.3 * min(800, 600) = 180, centered on (400, 300)
        assert_eq!(element.rect.center(), pos2(400.0, 300.0));
        assert_eq!(element.rect.size(), vec2(180.0, 180.0));
        assert_eq!(doc.selected_id(), Some(id));
    }

    #[test]
    fn select_unknown_id_clears_selection() {
        let mut doc = Document::new();
        doc.add_element(OverlayKind::emoji("😊"), None, vec2(400.0, 400.0));
        doc.select(Some(ElementId::new()));
        assert_eq!(doc.selected_id(), None);
    }

    #[test]
    fn topmost_wins_on_overlap() {
        let mut doc = Document::new();
        let first = doc.add_element(OverlayKind::pixelate(15), Some(pos2(100.0, 100.0)), vec2(400.0, 400.0));
        let second = doc.add_element(OverlayKind::pixelate(15), Some(pos2(100.0, 100.0)), vec2(400.0, 400.0));
        assert_ne!(first, second);
        assert_eq!(doc.topmost_at(pos2(100.0, 100.0)).unwrap().id, second);
    }
}
