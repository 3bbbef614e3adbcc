use egui::{Context, PointerButton, Pos2, Rect};

use crate::session::EditorSession;

/// Pointer input in surface coordinates, the only events the session
/// reacts to. Presses and moves are canvas-local; releases arrive from
/// anywhere so a drag that leaves the canvas still ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Pos2),
    Moved(Pos2),
    Up,
}

impl PointerEvent {
    /// Feeds this event into a session
    pub fn apply(self, session: &mut EditorSession) {
        match self {
            PointerEvent::Down(p) => session.pointer_down(p),
            PointerEvent::Moved(p) => session.pointer_move(p),
            PointerEvent::Up => session.pointer_up(),
        }
    }
}

/// Converts raw egui pointer state into [`PointerEvent`]s for the canvas
/// occupying `canvas_rect` on screen. The canvas shows the surface 1:1,
/// so the mapping is a translation.
pub struct PointerTranslator {
    canvas_rect: Rect,
    last_pos: Option<Pos2>,
}

impl Default for PointerTranslator {
    /// Starts with no canvas on screen, so nothing maps until a layout
    /// pass calls [`PointerTranslator::set_canvas_rect`]
    fn default() -> Self {
        Self::new(Rect::NOTHING)
    }
}

impl PointerTranslator {
    pub fn new(canvas_rect: Rect) -> Self {
        Self {
            canvas_rect,
            last_pos: None,
        }
    }

    /// Updates where the canvas sits on screen (layout can move it)
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = rect;
    }

    fn to_surface(&self, pos: Pos2) -> Pos2 {
        Pos2::new(pos.x - self.canvas_rect.min.x, pos.y - self.canvas_rect.min.y)
    }

    /// Reads this frame's pointer input and produces events in gesture
    /// order: press, then movement, then release
    pub fn process(&mut self, ctx: &Context) -> Vec<PointerEvent> {
        let mut events = Vec::new();
        ctx.input(|input| {
            if input.pointer.button_pressed(PointerButton::Primary) {
                let origin = input
                    .pointer
                    .press_origin()
                    .or_else(|| input.pointer.interact_pos());
                if let Some(pos) = origin {
                    if self.canvas_rect.contains(pos) {
                        events.push(PointerEvent::Down(self.to_surface(pos)));
                    }
                }
            }

            if let Some(pos) = input.pointer.hover_pos() {
                if self.last_pos != Some(pos) && self.canvas_rect.contains(pos) {
                    events.push(PointerEvent::Moved(self.to_surface(pos)));
                }
                self.last_pos = Some(pos);
            } else {
                self.last_pos = None;
            }

            // released anywhere, including off-canvas and off-window
            if input.pointer.button_released(PointerButton::Primary) {
                events.push(PointerEvent::Up);
            }
        });
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2, Event, Modifiers, RawInput};

    fn run_frame(ctx: &Context, events: Vec<Event>) {
        let raw = RawInput {
            events,
            ..Default::default()
        };
        let _ = ctx.run(raw, |_| {});
    }

    fn press_at(pos: Pos2) -> Event {
        Event::PointerButton {
            pos,
            button: PointerButton::Primary,
            pressed: true,
            modifiers: Modifiers::default(),
        }
    }

    fn release_at(pos: Pos2) -> Event {
        Event::PointerButton {
            pos,
            button: PointerButton::Primary,
            pressed: false,
            modifiers: Modifiers::default(),
        }
    }

    #[test]
    fn press_inside_canvas_maps_to_surface_coordinates() {
        let ctx = Context::default();
        let mut translator =
            PointerTranslator::new(Rect::from_min_size(pos2(100.0, 50.0), vec2(300.0, 200.0)));
        run_frame(
            &ctx,
            vec![Event::PointerMoved(pos2(150.0, 100.0)), press_at(pos2(150.0, 100.0))],
        );
        let events = translator.process(&ctx);
        assert!(events.contains(&PointerEvent::Down(pos2(50.0, 50.0))));
    }

    #[test]
    fn press_outside_canvas_is_ignored() {
        let ctx = Context::default();
        let mut translator =
            PointerTranslator::new(Rect::from_min_size(pos2(100.0, 50.0), vec2(300.0, 200.0)));
        run_frame(
            &ctx,
            vec![Event::PointerMoved(pos2(10.0, 10.0)), press_at(pos2(10.0, 10.0))],
        );
        let events = translator.process(&ctx);
        assert!(!events
            .iter()
            .any(|e| matches!(e, PointerEvent::Down(_))));
    }

    #[test]
    fn release_fires_even_off_canvas() {
        let ctx = Context::default();
        let mut translator =
            PointerTranslator::new(Rect::from_min_size(pos2(100.0, 50.0), vec2(300.0, 200.0)));
        run_frame(
            &ctx,
            vec![
                Event::PointerMoved(pos2(150.0, 100.0)),
                press_at(pos2(150.0, 100.0)),
            ],
        );
        translator.process(&ctx);

        // drag far off the canvas, then let go there
        run_frame(
            &ctx,
            vec![
                Event::PointerMoved(pos2(900.0, 900.0)),
                release_at(pos2(900.0, 900.0)),
            ],
        );
        let events = translator.process(&ctx);
        assert!(events.contains(&PointerEvent::Up));
        // the off-canvas move itself produced no Moved event
        assert!(!events
            .iter()
            .any(|e| matches!(e, PointerEvent::Moved(_))));
    }
}
