use egui::{pos2, Color32, Rect, Sense, Vec2};

use crate::app::RedactApp;

/// Canvas area: shows the session surface 1:1, routes pointer input into
/// the session, and keeps the cursor hint current
pub fn central_panel(app: &mut RedactApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        if app.decoding {
            ui.centered_and_justified(|ui| {
                ui.spinner();
            });
            return;
        }

        let Some(session) = app.editor.session_mut() else {
            ui.centered_and_justified(|ui| {
                ui.heading("Drag & drop a photo to begin");
            });
            return;
        };

        egui::ScrollArea::both().show(ui, |ui| {
            let (width, height) = session.size();
            let size = Vec2::new(width as f32, height as f32);
            let (response, painter) = ui.allocate_painter(size, Sense::click_and_drag());
            let canvas_rect = response.rect;

            app.translator.set_canvas_rect(canvas_rect);
            for event in app.translator.process(ctx) {
                event.apply(session);
            }

            // dirty-coalesced: at most one redraw per frame
            session.render();
            let label = format!("redact_surface_{}", session.id());
            let texture = app
                .texture
                .update(ctx, session.surface(), session.surface_version(), &label);
            painter.image(
                texture.id(),
                canvas_rect,
                Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                Color32::WHITE,
            );

            if let Some(hover) = response.hover_pos() {
                let local = pos2(hover.x - canvas_rect.min.x, hover.y - canvas_rect.min.y);
                let hint = session.cursor_hint(local);
                ctx.output_mut(|o| o.cursor_icon = hint);
            }
        });
    });
}
