use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, Size, StripBuilder, TableBuilder};

use crate::error::DashboardError;
use crate::state::AppState;
use crate::ui::map::sensor_map;
use crate::view::{ForensicView, Role};

const WARNING_COLOR: Color32 = Color32::from_rgb(230, 160, 0);
const INFO_COLOR: Color32 = Color32::from_rgb(60, 130, 220);

// ---------------------------------------------------------------------------
// Left side panel – risk filter
// ---------------------------------------------------------------------------

/// Render the multi-select over the risk labels present in the dataset.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Risk map filter");
    ui.separator();

    let labels = state.dataset.labels().clone();
    ui.strong(format!(
        "Risk categories  ({}/{})",
        state.selected.len(),
        labels.len()
    ));

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all();
        }
        if ui.small_button("None").clicked() {
            state.select_none();
        }
    });

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for label in &labels {
                let mut checked = state.selected.contains(label);
                let text = RichText::new(label.as_str()).color(state.colors.color_for(label));
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_label(label);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the menu bar and the page header.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(format!(
            "{}: {} sensors, {} visible",
            state.dataset_path.display(),
            state.dataset.len(),
            state.overview.rows.len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });

    header(ui);
}

fn header(ui: &mut Ui) {
    ui.heading("Bolton Traffic Risk Monitor");
    ui.label("Traffic monitoring and forensics dashboard for Bolton.");
    ui.label(
        RichText::new(
            "Risk categories come from unsupervised K-Means clustering and flag structural road failures.",
        )
        .italics(),
    );
    ui.add_space(4.0);
}

// ---------------------------------------------------------------------------
// Central panel – overview, forensic case study, footer
// ---------------------------------------------------------------------------

pub fn dashboard(ui: &mut Ui, state: &AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            overview_section(ui, state);
            ui.separator();
            forensic_section(ui, state);
            ui.separator();
            ui.small("© 2024 Bolton Traffic Analysis | Built with egui & Rust");
        });
}

fn metric(ui: &mut Ui, caption: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(caption).weak());
        ui.label(RichText::new(value).size(28.0).strong());
    });
}

fn overview_section(ui: &mut Ui, state: &AppState) {
    let metrics = &state.overview.metrics;
    ui.columns(3, |cols| {
        metric(&mut cols[0], "Sensors monitored", metrics.sensor_count.to_string());
        metric(&mut cols[1], "Average speed", metrics.mean_speed_display());
        metric(
            &mut cols[2],
            "Critical bottlenecks",
            metrics.bottleneck_count.to_string(),
        );
    });

    ui.add_space(8.0);
    ui.heading("Risk distribution map (general overview)");
    ui.label("Condition of the whole road network according to the clustering result.");
    if state.overview.is_empty() {
        ui.label(RichText::new("No sensors match the selected risk categories.").weak());
    }

    sensor_map(
        ui,
        "overview_map",
        &state.overview.markers,
        &state.overview.viewport,
        state.config.overview_height,
    );
}

fn forensic_section(ui: &mut Ui, state: &AppState) {
    ui.heading("Case study: root cause investigation");
    ui.strong("Forensic analysis of the 'Critical Bottleneck' cluster");
    ui.add_space(4.0);

    let view = match &state.forensic {
        Ok(view) => view,
        Err(e) => {
            ui.label(RichText::new(e.user_message()).color(WARNING_COLOR));
            return;
        }
    };

    let height = state.config.forensic_height;
    ui.allocate_ui(egui::vec2(ui.available_width(), height + 30.0), |ui: &mut Ui| {
        StripBuilder::new(ui)
            .size(Size::relative(1.0 / 3.0))
            .size(Size::remainder())
            .horizontal(|mut strip| {
                strip.cell(|ui: &mut Ui| forensic_narrative(ui, state, view));
                strip.cell(|ui: &mut Ui| {
                    ui.strong("Forensic map (zoom view)");
                    sensor_map(ui, "forensic_map", &view.markers, &view.viewport, height);
                });
            });
    });

    ui.add_space(8.0);
    forensic_table(ui, state, view);
}

fn forensic_narrative(ui: &mut Ui, state: &AppState, view: &ForensicView) {
    let Some(root) = view.target(&state.dataset) else {
        return;
    };

    ui.label(
        RichText::new(format!("{} link failure detected", root.fclass))
            .color(Color32::RED)
            .size(20.0)
            .strong(),
    );
    ui.add_space(4.0);
    ui.label(format!(
        "Location: sensor {} ({}).",
        root.detid, state.config.forensic_location
    ));

    ui.add_space(4.0);
    ui.strong("Data facts");
    ui.label(format!("• Limit: {} km/h", root.limit));
    ui.label(format!("• Actual speed: {:.1} km/h", root.avg_speed));
    ui.label(format!("• Flow: {:.0} vehicles/hour", root.avg_flow));

    ui.add_space(4.0);
    ui.strong("Analysis");
    ui.label(format!(
        "Structural bottleneck. This {} road fails to carry its flow, leaving {} surrounding \
         sensors in '{}' congested (domino effect).",
        root.fclass, view.affected_count, view.target_risk
    ));

    ui.add_space(8.0);
    ui.label(RichText::new(format!("Recommendation: {}", state.config.recommendation)).color(INFO_COLOR));
}

/// List the root and every affected sensor.
fn forensic_table(ui: &mut Ui, state: &AppState, view: &ForensicView) {
    egui::CollapsingHeader::new(format!("Affected sensors ({})", view.rows.len()))
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .column(Column::auto())
                .column(Column::auto())
                .column(Column::auto())
                .column(Column::auto())
                .column(Column::remainder())
                .header(20.0, |mut header| {
                    for title in ["Sensor", "Class", "Avg speed", "Speed gap", "Role"] {
                        header.col(|ui: &mut Ui| {
                            ui.strong(title);
                        });
                    }
                })
                .body(|mut body| {
                    for row in &view.rows {
                        let Some(rec) = state.dataset.get(row.index) else {
                            continue;
                        };
                        body.row(18.0, |mut cells| {
                            cells.col(|ui: &mut Ui| {
                                ui.label(rec.detid.as_str());
                            });
                            cells.col(|ui: &mut Ui| {
                                ui.label(rec.fclass.as_str());
                            });
                            cells.col(|ui: &mut Ui| {
                                ui.label(format!("{:.1}", rec.avg_speed));
                            });
                            cells.col(|ui: &mut Ui| {
                                ui.label(format!("{:.1}", rec.speed_gap));
                            });
                            cells.col(|ui: &mut Ui| {
                                let text = RichText::new(row.role.to_string())
                                    .color(state.colors.role_color(row.role));
                                if row.role == Role::RootCause {
                                    ui.label(text.strong());
                                } else {
                                    ui.label(text);
                                }
                            });
                        });
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Halted session
// ---------------------------------------------------------------------------

/// Shown instead of the dashboard when the dataset could not be loaded.
pub fn fatal_error(ui: &mut Ui, error: &DashboardError) {
    ui.heading("Bolton Traffic Risk Monitor");
    ui.add_space(12.0);
    ui.label(RichText::new(error.user_message()).color(Color32::RED).size(18.0).strong());
    ui.add_space(4.0);
    ui.label(RichText::new(error.to_string()).monospace());
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sensor dataset")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}
