use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::filter::{matching_indices, same_risk};
use crate::data::model::{RiskLabel, SensorDataset, SensorRecord};
use crate::error::DashboardError;

use super::{area_scaled_radius, Marker, Role, Viewport};

/// A sensor in the root's risk category.
#[derive(Debug, Clone, PartialEq)]
pub struct ForensicRow {
    /// Index into the dataset.
    pub index: usize,
    pub role: Role,
    pub marker_size: f32,
}

/// The micro view: the target sensor and every sensor sharing its risk label.
#[derive(Debug, Clone)]
pub struct ForensicView {
    pub target_index: usize,
    pub target_risk: RiskLabel,
    /// Rows in dataset order.
    pub rows: Vec<ForensicRow>,
    /// Sensors affected besides the root, `rows.len() - 1`.
    pub affected_count: usize,
    /// Domino markers first so the root draws on top.
    pub markers: Vec<Marker>,
    pub viewport: Viewport,
}

impl ForensicView {
    pub fn target<'a>(&self, dataset: &'a SensorDataset) -> Option<&'a SensorRecord> {
        dataset.get(self.target_index)
    }
}

/// Build the root-cause drill-down for `target_id`.
///
/// Always reads the full dataset: the result does not depend on the overview
/// filter.
pub fn compose_forensic(
    dataset: &SensorDataset,
    target_id: &str,
    config: &DashboardConfig,
    colors: &ColorMap,
) -> Result<ForensicView, DashboardError> {
    let target_index = dataset
        .position_of(target_id)
        .ok_or_else(|| DashboardError::ForensicTargetNotFound {
            detid: target_id.to_string(),
        })?;
    let root = &dataset.records()[target_index];
    let target_risk = root.risk_label.clone();

    let rows: Vec<ForensicRow> = matching_indices(dataset, |r| same_risk(r, &target_risk))
        .into_iter()
        .map(|index| {
            let role = if index == target_index {
                Role::RootCause
            } else {
                Role::DominoEffect
            };
            let marker_size = match role {
                Role::RootCause => config.root_marker_size,
                Role::DominoEffect => config.domino_marker_size,
            };
            ForensicRow {
                index,
                role,
                marker_size,
            }
        })
        .collect();

    let affected_count = rows.len().saturating_sub(1);

    let size_max = config.root_marker_size.max(config.domino_marker_size) as f64;
    let mut markers: Vec<(Role, Marker)> = rows
        .iter()
        .filter_map(|row| {
            let rec = dataset.get(row.index)?;
            rec.has_position().then(|| {
                let marker = Marker {
                    lat: rec.lat,
                    lon: rec.long,
                    color: colors.role_color(row.role),
                    radius: area_scaled_radius(
                        row.marker_size as f64,
                        size_max,
                        config.overview_size_max,
                    ),
                    legend: row.role.to_string(),
                    title: rec.detid.clone(),
                    hover: vec![
                        ("fclass".into(), rec.fclass.clone()),
                        ("avg_speed".into(), format!("{:.1}", rec.avg_speed)),
                    ],
                };
                (row.role, marker)
            })
        })
        .collect();
    markers.sort_by_key(|(role, _)| *role == Role::RootCause);
    let markers: Vec<Marker> = markers.into_iter().map(|(_, m)| m).collect();

    let viewport = if root.has_position() {
        Viewport {
            center_lat: root.lat,
            center_lon: root.long,
            zoom: config.forensic_zoom,
        }
    } else {
        Viewport::centered_on(&markers, config.forensic_zoom, dataset.center())
    };

    log::debug!(
        "Forensic view for {target_id}: {} sensors in '{target_risk}'",
        rows.len()
    );

    Ok(ForensicView {
        target_index,
        target_risk,
        rows,
        affected_count,
        markers,
        viewport,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::LabelSelection;
    use crate::data::model::tests::record;
    use crate::view::overview::compose_overview;

    fn case_study() -> SensorDataset {
        let root = SensorRecord {
            detid: "N53311D".into(),
            lat: 53.58,
            long: -2.43,
            fclass: "Trunk".into(),
            avg_speed: 40.0,
            limit: 50.0,
            speed_gap: -10.0,
            avg_flow: 1200.0,
            risk_label: RiskLabel::High,
        };
        let mut x1 = record("X1", RiskLabel::HIGH, 20.0, -20.0);
        x1.limit = 40.0;
        SensorDataset::from_records(vec![
            x1,
            record("S1", RiskLabel::SAFE, 48.0, -2.0),
            root,
            record("L1", RiskLabel::LOW, 12.0, -28.0),
        ])
        .unwrap()
    }

    fn compose(ds: &SensorDataset, target: &str) -> Result<ForensicView, DashboardError> {
        let cfg = DashboardConfig::default();
        compose_forensic(ds, target, &cfg, &ColorMap::from_config(&cfg))
    }

    #[test]
    fn root_and_domino_roles() {
        let ds = case_study();
        let view = compose(&ds, "N53311D").unwrap();

        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.affected_count, 1);
        assert_eq!(view.target_risk, RiskLabel::High);

        let roots: Vec<&ForensicRow> =
            view.rows.iter().filter(|r| r.role == Role::RootCause).collect();
        assert_eq!(roots.len(), 1);
        assert_eq!(ds.records()[roots[0].index].detid, "N53311D");
        assert_eq!(roots[0].marker_size, 30.0);

        for row in view.rows.iter().filter(|r| r.role == Role::DominoEffect) {
            assert_eq!(ds.records()[row.index].risk_label, view.target_risk);
            assert_eq!(row.marker_size, 15.0);
        }
    }

    #[test]
    fn affected_count_excludes_root() {
        let ds = case_study();
        let view = compose(&ds, "S1").unwrap();
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.affected_count, 0);
    }

    #[test]
    fn missing_target_is_not_found_and_overview_still_composes() {
        let ds = case_study();
        let err = compose(&ds, "NOPE").unwrap_err();
        assert_eq!(
            err,
            DashboardError::ForensicTargetNotFound {
                detid: "NOPE".into()
            }
        );

        let cfg = DashboardConfig::default();
        let overview = compose_overview(
            &ds,
            &ds.labels().clone(),
            &cfg,
            &ColorMap::from_config(&cfg),
        );
        assert_eq!(overview.metrics.sensor_count, 4);
    }

    #[test]
    fn result_ignores_overview_selection() {
        let ds = case_study();
        let cfg = DashboardConfig::default();
        let colors = ColorMap::from_config(&cfg);
        let baseline = compose(&ds, "N53311D").unwrap();

        for sel in [
            LabelSelection::new(),
            [RiskLabel::Safe].into_iter().collect(),
            ds.labels().clone(),
        ] {
            let _overview = compose_overview(&ds, &sel, &cfg, &colors);
            let view = compose_forensic(&ds, "N53311D", &cfg, &colors).unwrap();
            assert_eq!(view.rows, baseline.rows);
        }
    }

    #[test]
    fn unplaced_root_centres_on_domino_sensors() {
        let mut root = record("R", RiskLabel::HIGH, 40.0, -10.0);
        root.lat = f64::NAN;
        let mut d1 = record("D1", RiskLabel::HIGH, 30.0, -20.0);
        d1.lat = 53.50;
        d1.long = -2.40;
        let mut d2 = record("D2", RiskLabel::HIGH, 30.0, -20.0);
        d2.lat = 53.60;
        d2.long = -2.50;
        let ds = SensorDataset::from_records(vec![root, d1, d2]).unwrap();

        let view = compose(&ds, "R").unwrap();
        assert_eq!(view.markers.len(), 2);
        assert!((view.viewport.center_lat - 53.55).abs() < 1e-9);
        assert!((view.viewport.center_lon + 2.45).abs() < 1e-9);
        assert_eq!(view.viewport.zoom, 13.0);
    }

    #[test]
    fn nothing_placed_centres_on_whole_dataset() {
        let mut root = record("R", RiskLabel::HIGH, 40.0, -10.0);
        root.lat = f64::NAN;
        let mut other = record("S", RiskLabel::SAFE, 48.0, -2.0);
        other.lat = 53.40;
        other.long = -2.30;
        let ds = SensorDataset::from_records(vec![root, other]).unwrap();

        let view = compose(&ds, "R").unwrap();
        assert!(view.markers.is_empty());
        assert_eq!((view.viewport.center_lat, view.viewport.center_lon), (53.40, -2.30));
    }

    #[test]
    fn map_centres_on_root_and_draws_it_last() {
        let ds = case_study();
        let view = compose(&ds, "N53311D").unwrap();

        assert_eq!((view.viewport.center_lat, view.viewport.center_lon), (53.58, -2.43));
        assert_eq!(view.viewport.zoom, 13.0);

        let last = view.markers.last().unwrap();
        assert_eq!(last.title, "N53311D");
        assert!(last.radius > view.markers[0].radius);
        assert_eq!(last.legend, Role::RootCause.to_string());
        let keys: Vec<&str> = last.hover.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["fclass", "avg_speed"]);
    }
}
