#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use std::path::PathBuf;

fn main() -> eframe::Result {
    env_logger::init(); // log to stderr (if you run with `RUST_LOG=debug`)

    // optional photo to open right away: `photo_redact path/to/photo.jpg`
    let initial_photo = std::env::args().nth(1).map(PathBuf::from);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Photo Redact"),
        ..Default::default()
    };
    eframe::run_native(
        "photo_redact",
        native_options,
        Box::new(move |cc| {
            let mut app = photo_redact::RedactApp::new(cc);
            if let Some(path) = initial_photo {
                app.open_path(path);
            }
            Ok(Box::new(app))
        }),
    )
}
