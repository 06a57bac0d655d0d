use eframe::egui::Ui;
use egui_plot::{Legend, MarkerShape, Plot, Points};

use crate::view::{nearest_marker, Marker, Viewport};

// ---------------------------------------------------------------------------
// Sensor scatter map
// ---------------------------------------------------------------------------

/// Draw `markers` on a longitude / latitude plot covering at least `viewport`.
///
/// Markers sharing a legend name are grouped into one legend entry. Hovering
/// shows the payload of the nearest sensor.
pub fn sensor_map(ui: &mut Ui, id: &str, markers: &[Marker], viewport: &Viewport, height: f32) {
    let ([min_lon, max_lon], [min_lat, max_lat]) = viewport.bounds();
    let tolerance = viewport.lon_span() / 50.0;
    let hover_markers = markers.to_vec();

    Plot::new(id)
        .height(height)
        .legend(Legend::default())
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .include_x(min_lon)
        .include_x(max_lon)
        .include_y(min_lat)
        .include_y(max_lat)
        .data_aspect(viewport.data_aspect())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .label_formatter(move |_name, value| {
            nearest_marker(&hover_markers, value.x, value.y, tolerance)
                .map(Marker::hover_text)
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            for marker in markers {
                let point = Points::new(vec![[marker.lon, marker.lat]])
                    .name(&marker.legend)
                    .color(marker.color)
                    .radius(marker.radius)
                    .shape(MarkerShape::Circle)
                    .filled(true);
                plot_ui.points(point);
            }
        });
}
