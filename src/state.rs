use std::path::{Path, PathBuf};

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::filter::{init_label_selection, LabelSelection};
use crate::data::loader::load_dataset;
use crate::data::model::{RiskLabel, SensorDataset};
use crate::error::DashboardError;
use crate::view::{compose_forensic, compose_overview, ForensicView, OverviewView};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Everything the dashboard shows, built once at startup from a loaded
/// dataset and handed to the UI.
pub struct AppState {
    pub config: DashboardConfig,
    pub colors: ColorMap,

    /// Sensor table; replaced only by an explicit File → Open.
    pub dataset: SensorDataset,
    pub dataset_path: PathBuf,

    /// Risk categories ticked in the side panel.
    pub selected: LabelSelection,

    /// Recomputed on every filter change.
    pub overview: OverviewView,

    /// Independent of `selected`; recomputed only when the dataset changes.
    pub forensic: Result<ForensicView, DashboardError>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig, dataset: SensorDataset) -> Self {
        let colors = ColorMap::from_config(&config);
        let selected = init_label_selection(&dataset);
        let overview = compose_overview(&dataset, &selected, &config, &colors);
        let forensic = Self::build_forensic(&dataset, &config, &colors);
        let dataset_path = config.dataset_path.clone();

        Self {
            config,
            colors,
            dataset,
            dataset_path,
            selected,
            overview,
            forensic,
            status_message: None,
        }
    }

    /// Load the configured dataset. Failure is fatal for the session and is
    /// returned to the caller untouched.
    pub fn load(config: DashboardConfig) -> Result<Self, DashboardError> {
        let dataset = load_dataset(&config.dataset_path)?;
        Ok(Self::new(config, dataset))
    }

    fn build_forensic(
        dataset: &SensorDataset,
        config: &DashboardConfig,
        colors: &ColorMap,
    ) -> Result<ForensicView, DashboardError> {
        let view = compose_forensic(dataset, &config.forensic_target, config, colors);
        if let Err(e) = &view {
            log::warn!("{e}");
        }
        view
    }

    /// Ingest a newly loaded dataset, reset the filter and rebuild both views.
    pub fn set_dataset(&mut self, dataset: SensorDataset, path: &Path) {
        self.selected = init_label_selection(&dataset);
        self.forensic = Self::build_forensic(&dataset, &self.config, &self.colors);
        self.dataset = dataset;
        self.dataset_path = path.to_path_buf();
        self.status_message = None;
        self.refilter();
    }

    /// Replace the dataset from another file. On failure the current data
    /// stays and the error is shown in the top bar.
    pub fn open_path(&mut self, path: &Path) {
        match load_dataset(path) {
            Ok(dataset) => self.set_dataset(dataset, path),
            Err(e) => self.status_message = Some(format!("Error: {e}")),
        }
    }

    /// Recompute the overview after a filter change.
    pub fn refilter(&mut self) {
        self.overview = compose_overview(&self.dataset, &self.selected, &self.config, &self.colors);
    }

    /// Toggle a single risk category.
    pub fn toggle_label(&mut self, label: &RiskLabel) {
        if !self.selected.remove(label) {
            self.selected.insert(label.clone());
        }
        self.refilter();
    }

    pub fn select_all(&mut self) {
        self.selected = init_label_selection(&self.dataset);
        self.refilter();
    }

    pub fn select_none(&mut self) {
        self.selected.clear();
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn state() -> AppState {
        let ds = SensorDataset::from_records(vec![
            record("N53311D", RiskLabel::HIGH, 40.0, -10.0),
            record("X1", RiskLabel::HIGH, 20.0, -20.0),
            record("S1", RiskLabel::SAFE, 48.0, -2.0),
        ])
        .unwrap();
        AppState::new(DashboardConfig::default(), ds)
    }

    #[test]
    fn starts_unfiltered_with_forensic_view() {
        let st = state();
        assert_eq!(st.overview.metrics.sensor_count, 3);
        assert_eq!(st.forensic.as_ref().unwrap().affected_count, 1);
    }

    #[test]
    fn filter_changes_leave_forensic_untouched() {
        let mut st = state();
        let before = st.forensic.as_ref().unwrap().rows.clone();

        st.toggle_label(&RiskLabel::High);
        assert_eq!(st.overview.metrics.sensor_count, 1);
        st.select_none();
        assert!(st.overview.is_empty());
        assert_eq!(st.forensic.as_ref().unwrap().rows, before);

        st.select_all();
        assert_eq!(st.overview.metrics.sensor_count, 3);
    }

    #[test]
    fn failed_open_keeps_current_dataset() {
        let mut st = state();
        let dir = tempfile::TempDir::new().unwrap();
        st.open_path(&dir.path().join("missing.csv"));

        assert_eq!(st.dataset.len(), 3);
        assert!(st.status_message.as_deref().unwrap().contains("missing.csv"));
    }

    #[test]
    fn load_reports_missing_dataset() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = DashboardConfig {
            dataset_path: dir.path().join("bolton_risk_data.csv"),
            ..DashboardConfig::default()
        };
        assert!(matches!(
            AppState::load(config),
            Err(DashboardError::DatasetUnavailable { .. })
        ));
    }
}
