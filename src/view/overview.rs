use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::filter::{is_bottleneck, label_selected, matching_indices, LabelSelection};
use crate::data::model::{SensorDataset, SensorRecord};

use super::{area_scaled_radius, Marker, Viewport};

/// Headline numbers over the filtered sensors.
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewMetrics {
    pub sensor_count: usize,
    /// Mean of the finite `avg_speed` values; `None` when there are none.
    pub mean_speed: Option<f64>,
    pub bottleneck_count: usize,
}

impl OverviewMetrics {
    pub fn mean_speed_display(&self) -> String {
        match self.mean_speed {
            Some(v) => format!("{v:.1} km/h"),
            None => "N/A".to_string(),
        }
    }
}

/// The macro view: sensors in the selected risk categories.
#[derive(Debug, Clone)]
pub struct OverviewView {
    /// Dataset indices of the filtered rows.
    pub rows: Vec<usize>,
    pub metrics: OverviewMetrics,
    /// One marker per filtered row that has coordinates.
    pub markers: Vec<Marker>,
    pub viewport: Viewport,
}

impl OverviewView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn compose_overview(
    dataset: &SensorDataset,
    selected: &LabelSelection,
    config: &DashboardConfig,
    colors: &ColorMap,
) -> OverviewView {
    let rows = matching_indices(dataset, |r| label_selected(r, selected));
    let filtered: Vec<&SensorRecord> = rows.iter().filter_map(|&i| dataset.get(i)).collect();

    let speeds: Vec<f64> = filtered
        .iter()
        .map(|r| r.avg_speed)
        .filter(|v| v.is_finite())
        .collect();
    let mean_speed = (!speeds.is_empty()).then(|| speeds.iter().sum::<f64>() / speeds.len() as f64);

    let metrics = OverviewMetrics {
        sensor_count: filtered.len(),
        mean_speed,
        bottleneck_count: filtered
            .iter()
            .filter(|r| is_bottleneck(r, config.bottleneck_threshold))
            .count(),
    };

    let max_flow = filtered
        .iter()
        .map(|r| r.avg_flow)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    let markers: Vec<Marker> = filtered
        .iter()
        .filter(|r| r.has_position())
        .map(|r| Marker {
            lat: r.lat,
            lon: r.long,
            color: colors.color_for(&r.risk_label),
            radius: area_scaled_radius(r.avg_flow, max_flow, config.overview_size_max),
            legend: r.risk_label.to_string(),
            title: r.detid.clone(),
            hover: vec![
                ("fclass".into(), r.fclass.clone()),
                ("avg_speed".into(), format!("{:.1}", r.avg_speed)),
                ("limit".into(), format!("{}", r.limit)),
                ("speed_gap".into(), format!("{:.1}", r.speed_gap)),
            ],
        })
        .collect();

    let viewport = Viewport::centered_on(&markers, config.overview_zoom, dataset.center());

    OverviewView {
        rows,
        metrics,
        markers,
        viewport,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::init_label_selection;
    use crate::data::model::tests::record;
    use crate::data::model::RiskLabel;

    fn dataset() -> SensorDataset {
        let mut far = record("D", RiskLabel::HIGH, 80.0, 30.0);
        far.lat = 54.0;
        far.long = -3.0;
        far.avg_flow = 3200.0;
        let mut unplaced = record("E", RiskLabel::LOW, f64::NAN, -30.0);
        unplaced.long = f64::NAN;

        SensorDataset::from_records(vec![
            record("A", RiskLabel::SAFE, 49.0, -2.0),
            record("B", RiskLabel::LOW, 15.0, -25.0),
            record("C", RiskLabel::LOW, 20.0, -20.0),
            far,
            unplaced,
        ])
        .unwrap()
    }

    fn compose(ds: &SensorDataset, sel: &LabelSelection) -> OverviewView {
        let cfg = DashboardConfig::default();
        compose_overview(ds, sel, &cfg, &ColorMap::from_config(&cfg))
    }

    #[test]
    fn every_label_subset_filters_exactly() {
        let ds = dataset();
        let all: Vec<RiskLabel> = ds.labels().iter().cloned().collect();
        for mask in 0..(1u32 << all.len()) {
            let sel: LabelSelection = all
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, l)| l.clone())
                .collect();
            let view = compose(&ds, &sel);
            let expected = ds.records().iter().filter(|r| sel.contains(&r.risk_label)).count();
            assert_eq!(view.rows.len(), expected);
            assert_eq!(view.metrics.sensor_count, expected);
            assert!(view.rows.iter().all(|&i| sel.contains(&ds.records()[i].risk_label)));
        }
    }

    #[test]
    fn unfiltered_metrics() {
        let ds = dataset();
        let view = compose(&ds, &init_label_selection(&ds));
        assert_eq!(view.metrics.sensor_count, 5);
        // NaN speed of the unplaced row is skipped.
        assert_eq!(view.metrics.mean_speed, Some((49.0 + 15.0 + 20.0 + 80.0) / 4.0));
        assert_eq!(view.metrics.mean_speed_display(), "41.0 km/h");
        // -25 and -30 count, -20 sits on the boundary and does not.
        assert_eq!(view.metrics.bottleneck_count, 2);
    }

    #[test]
    fn empty_selection_yields_empty_view() {
        let ds = dataset();
        let view = compose(&ds, &LabelSelection::new());
        assert!(view.is_empty());
        assert!(view.markers.is_empty());
        assert_eq!(view.metrics.bottleneck_count, 0);
        assert_eq!(view.metrics.mean_speed_display(), "N/A");
    }

    #[test]
    fn markers_skip_rows_without_coordinates() {
        let ds = dataset();
        let sel: LabelSelection = [RiskLabel::Low].into_iter().collect();
        let view = compose(&ds, &sel);
        assert_eq!(view.rows.len(), 3);
        assert_eq!(view.markers.len(), 2);
        assert!(view.markers.iter().all(|m| m.legend == RiskLabel::LOW));
    }

    #[test]
    fn markers_carry_colour_size_and_hover() {
        let ds = dataset();
        let view = compose(&ds, &init_label_selection(&ds));
        let high = view.markers.iter().find(|m| m.title == "D").unwrap();
        let safe = view.markers.iter().find(|m| m.title == "A").unwrap();

        assert_eq!(high.color, eframe::egui::Color32::from_rgb(255, 0, 0));
        assert_eq!(high.radius, 10.0);
        assert!(safe.radius < high.radius);

        let keys: Vec<&str> = high.hover.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["fclass", "avg_speed", "limit", "speed_gap"]);
    }

    #[test]
    fn empty_view_centres_on_whole_dataset() {
        let ds = dataset();
        let view = compose(&ds, &LabelSelection::new());
        assert!((view.viewport.center_lat - (53.58 * 3.0 + 54.0) / 4.0).abs() < 1e-9);
        assert_eq!(view.viewport.zoom, 11.0);
    }
}
