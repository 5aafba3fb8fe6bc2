mod app;
mod chart;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use app::CricketDashApp;
use config::AppConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::load();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([700.0, 450.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    let mut app = CricketDashApp::new(config);
    // Optional file to open on startup.
    if let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) {
        app.state.load_path(&path);
    }

    eframe::run_native(
        "Cricket Analytics Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
}
