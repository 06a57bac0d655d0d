//! Display-ready views derived from the loaded sensor table.
//!
//! Both composers are pure functions of `(dataset, selection/target, config)`;
//! the UI calls them and only draws what they return.

pub mod forensic;
pub mod overview;

use std::fmt;

use eframe::egui::Color32;

pub use forensic::{compose_forensic, ForensicView};
pub use overview::{compose_overview, OverviewView};

/// Smallest marker radius in pixels, so zero-flow sensors stay visible.
pub const MIN_MARKER_RADIUS: f32 = 1.5;

// ---------------------------------------------------------------------------
// Forensic role
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The investigated sensor itself.
    RootCause,
    /// Another sensor in the root's risk category.
    DominoEffect,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::RootCause => f.write_str("ROOT CAUSE (source of the problem)"),
            Role::DominoEffect => f.write_str("DOMINO EFFECT (affected)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Map markers
// ---------------------------------------------------------------------------

/// One point on a map plot.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub color: Color32,
    /// Radius in screen pixels.
    pub radius: f32,
    /// Legend entry the marker belongs to.
    pub legend: String,
    /// Hover title (the sensor id).
    pub title: String,
    /// Extra hover lines, `(field, value)`.
    pub hover: Vec<(String, String)>,
}

impl Marker {
    pub fn hover_text(&self) -> String {
        let mut text = self.title.clone();
        for (key, value) in &self.hover {
            text.push_str(&format!("\n{key}: {value}"));
        }
        text
    }
}

/// Marker radius whose *area* is proportional to `value / max`, the largest
/// value drawing a marker of diameter `size_max`.
pub fn area_scaled_radius(value: f64, max: f64, size_max: f32) -> f32 {
    if !value.is_finite() || !max.is_finite() || value <= 0.0 || max <= 0.0 {
        return MIN_MARKER_RADIUS;
    }
    let radius = size_max / 2.0 * (value / max).sqrt() as f32;
    radius.max(MIN_MARKER_RADIUS)
}

/// Marker closest to `(lon, lat)`, if any lies within `max_distance` degrees.
pub fn nearest_marker(markers: &[Marker], lon: f64, lat: f64, max_distance: f64) -> Option<&Marker> {
    markers
        .iter()
        .map(|m| {
            let d = ((m.lon - lon).powi(2) + (m.lat - lat).powi(2)).sqrt();
            (d, m)
        })
        .filter(|(d, _)| *d <= max_distance)
        .min_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, m)| m)
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// Map centre and web-map zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: f64,
}

impl Viewport {
    /// Longitude range covered at this zoom (one 256px tile = 360° at zoom 0).
    pub fn lon_span(&self) -> f64 {
        360.0 / 2f64.powf(self.zoom)
    }

    /// Latitude range, shrunk by the Mercator scale at the centre.
    pub fn lat_span(&self) -> f64 {
        self.lon_span() * self.center_lat.to_radians().cos().abs()
    }

    /// Degrees of longitude per pixel over degrees of latitude per pixel, so
    /// the plot keeps the Mercator proportions of the centre.
    pub fn data_aspect(&self) -> f32 {
        let cos = self.center_lat.to_radians().cos().abs();
        if !cos.is_finite() || cos < 1e-6 {
            return 1.0;
        }
        (1.0 / cos) as f32
    }

    /// `([min_lon, max_lon], [min_lat, max_lat])`.
    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        let half_lon = self.lon_span() / 2.0;
        let half_lat = self.lat_span() / 2.0;
        (
            [self.center_lon - half_lon, self.center_lon + half_lon],
            [self.center_lat - half_lat, self.center_lat + half_lat],
        )
    }

    /// Centre on the mean position of `markers`, or `fallback` when there are none.
    pub fn centered_on(markers: &[Marker], zoom: f64, fallback: (f64, f64)) -> Self {
        let (center_lat, center_lon) = if markers.is_empty() {
            fallback
        } else {
            let n = markers.len() as f64;
            (
                markers.iter().map(|m| m.lat).sum::<f64>() / n,
                markers.iter().map(|m| m.lon).sum::<f64>() / n,
            )
        };
        Viewport {
            center_lat,
            center_lon,
            zoom,
        }
    }
}
