use crate::app::RedactApp;
use crate::element::{OverlayKind, BLOCK_SIZE_RANGE, UNIFORM_SIZE_RANGE};
use crate::state::ToolKind;

/// Left-hand toolbar: placement tools, the sticker palette, sliders for
/// the selected element, and the session actions
pub fn tools_panel(app: &mut RedactApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(false)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading("Photo Redact");
            ui.separator();

            let mut do_save = false;
            let mut do_cancel = false;

            if let Some(session) = app.editor.session_mut() {
                ui.label("Place on next click");
                ui.horizontal(|ui| {
                    for tool in [ToolKind::Pixelate, ToolKind::Emoji] {
                        let armed = session.armed_tool() == Some(tool);
                        if ui.selectable_label(armed, tool.label()).clicked() {
                            session.arm_tool(if armed { None } else { Some(tool) });
                        }
                    }
                });
                if ui.button("Add pixelate block").clicked() {
                    session.add_pixelate_centered();
                }

                ui.separator();
                ui.label("Stickers");
                let palette: Vec<String> = session.emoji_palette().to_vec();
                egui::Grid::new("emoji_palette").show(ui, |ui| {
                    for (i, glyph) in palette.iter().enumerate() {
                        if ui.button(glyph).clicked() {
                            session.add_emoji_centered(glyph);
                        }
                        if i % 5 == 4 {
                            ui.end_row();
                        }
                    }
                });

                ui.separator();
                // copy out what the sliders show before mutating the session
                let selected = session.document().selected().map(|e| {
                    let block = match &e.kind {
                        OverlayKind::Pixelate { block_size } => Some(*block_size),
                        OverlayKind::Emoji { .. } => None,
                    };
                    (e.rect.width(), block)
                });
                if let Some((width, block)) = selected {
                    ui.label("Selection");
                    let mut edge = width;
                    if ui
                        .add(egui::Slider::new(&mut edge, UNIFORM_SIZE_RANGE).text("size"))
                        .changed()
                    {
                        session.set_selected_uniform_size(edge);
                    }
                    if let Some(block) = block {
                        let mut block = block;
                        if ui
                            .add(egui::Slider::new(&mut block, BLOCK_SIZE_RANGE).text("pixel size"))
                            .changed()
                        {
                            session.set_selected_block_size(block);
                        }
                    }
                    if ui.button("Remove").clicked() {
                        session.remove_selected();
                    }
                } else {
                    ui.weak("Click an overlay to edit it");
                }

                ui.separator();
                ui.label(format!("{} overlays", session.document().elements().len()));
                if ui.button("Reset").clicked() {
                    session.reset();
                }

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Save JPEG").clicked() {
                        do_save = true;
                    }
                    if ui.button("Cancel").clicked() {
                        do_cancel = true;
                    }
                });
            } else {
                ui.label("Drop a photo anywhere in the window to start editing.");
            }

            if do_save {
                app.save_flattened();
            }
            if do_cancel {
                app.cancel_session();
            }

            if let Some(status) = &app.status {
                ui.separator();
                ui.label(status);
            }
        });
}
