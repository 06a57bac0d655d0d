mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;
mod view;

use app::TrafficMonitorApp;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    // Load once; the dataset is immutable for the rest of the session.
    let config = DashboardConfig::load();
    let session = AppState::load(config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Bolton Traffic Forensics",
        options,
        Box::new(|_cc| Ok(Box::new(TrafficMonitorApp::new(session)))),
    )
}
