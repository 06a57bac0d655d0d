use eframe::egui;

use crate::error::DashboardError;
use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

/// Either a running dashboard or a session halted by a missing dataset.
pub enum Session {
    Ready(Box<AppState>),
    Halted(DashboardError),
}

pub struct TrafficMonitorApp {
    pub session: Session,
}

impl TrafficMonitorApp {
    pub fn new(session: Result<AppState, DashboardError>) -> Self {
        let session = match session {
            Ok(state) => Session::Ready(Box::new(state)),
            Err(e) => Session::Halted(e),
        };
        Self { session }
    }
}

impl eframe::App for TrafficMonitorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let state = match &mut self.session {
            Session::Ready(state) => state,
            Session::Halted(error) => {
                // Nothing else is rendered for the rest of the session.
                egui::CentralPanel::default().show(ctx, |ui| {
                    panels::fatal_error(ui, error);
                });
                return;
            }
        };

        // ---- Top panel: menu bar + header ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, state);
        });

        // ---- Left side panel: risk filter ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, state);
            });

        // ---- Central panel: overview + forensic case study ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::dashboard(ui, state);
        });
    }
}
