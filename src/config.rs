use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::model::RiskLabel;

/// Default config file, looked up in the working directory.
pub const CONFIG_FILE: &str = "traffic_monitor.json";

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "TRAFFIC_MONITOR_CONFIG";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Every tunable constant of the dashboard. Missing fields take the values of
/// the Bolton case study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Sensor table exported by the clustering notebook.
    pub dataset_path: PathBuf,

    /// Sensor investigated in the root-cause case study.
    pub forensic_target: String,
    /// Street name shown next to the target in the narrative.
    pub forensic_location: String,

    /// A sensor is a critical bottleneck when `speed_gap` is strictly below this.
    pub bottleneck_threshold: f64,

    /// Web-map zoom level of the overview map.
    pub overview_zoom: f64,
    /// Web-map zoom level of the forensic map (closer than the overview).
    pub forensic_zoom: f64,
    pub overview_height: f32,
    pub forensic_height: f32,

    /// Marker diameter in pixels of the highest-flow sensor on the overview.
    pub overview_size_max: f32,
    pub root_marker_size: f32,
    pub domino_marker_size: f32,

    /// Risk label → CSS colour name.
    pub risk_colors: BTreeMap<String, String>,
    /// Colour for labels missing from `risk_colors` and for unknown names.
    pub default_color: String,
    pub root_color: String,
    pub domino_color: String,

    /// Advice printed under the forensic narrative.
    pub recommendation: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let risk_colors = [
            (RiskLabel::HIGH, "red"),
            (RiskLabel::MEDIUM, "orange"),
            (RiskLabel::LOW, "blue"),
            (RiskLabel::SAFE, "green"),
        ]
        .into_iter()
        .map(|(label, color)| (label.to_string(), color.to_string()))
        .collect();

        Self {
            dataset_path: PathBuf::from("bolton_risk_data.csv"),
            forensic_target: "N53311D".to_string(),
            forensic_location: "St. Peter's Way".to_string(),
            bottleneck_threshold: -20.0,
            overview_zoom: 11.0,
            forensic_zoom: 13.0,
            overview_height: 500.0,
            forensic_height: 450.0,
            overview_size_max: 20.0,
            root_marker_size: 30.0,
            domino_marker_size: 15.0,
            risk_colors,
            default_color: "gray".to_string(),
            root_color: "red".to_string(),
            domino_color: "orange".to_string(),
            recommendation: "Apply a Variable Speed Limit (VSL) at the red sensor.".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Resolve the config for this process: `$TRAFFIC_MONITOR_CONFIG`, else
    /// `traffic_monitor.json` if present, else defaults. A broken file is
    /// logged and ignored.
    pub fn load() -> Self {
        Self::load_from(&config_path(std::env::var_os(CONFIG_ENV)))
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            Err(e) => {
                log::warn!("Ignoring config: {e:#}");
                Self::default()
            }
        }
    }
}

/// Config file to read, given the value of `$TRAFFIC_MONITOR_CONFIG`.
fn config_path(env_value: Option<OsString>) -> PathBuf {
    match env_value {
        Some(p) if !p.is_empty() => PathBuf::from(p),
        _ => PathBuf::from(CONFIG_FILE),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_case_study() {
        let cfg = DashboardConfig::default();
        assert_eq!(cfg.forensic_target, "N53311D");
        assert_eq!(cfg.bottleneck_threshold, -20.0);
        assert!(cfg.forensic_zoom > cfg.overview_zoom);
        assert!(cfg.root_marker_size > cfg.domino_marker_size);
        assert_eq!(cfg.risk_colors[RiskLabel::HIGH], "red");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"forensic_target": "X1", "bottleneck_threshold": -15}}"#).unwrap();

        let cfg = DashboardConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.forensic_target, "X1");
        assert_eq!(cfg.bottleneck_threshold, -15.0);
        assert_eq!(cfg.overview_zoom, 11.0);
        assert_eq!(cfg.dataset_path, PathBuf::from("bolton_risk_data.csv"));
    }

    #[test]
    fn env_variable_overrides_config_path() {
        assert_eq!(
            config_path(Some(OsString::from("/etc/bolton/monitor.json"))),
            PathBuf::from("/etc/bolton/monitor.json")
        );
        assert_eq!(config_path(None), PathBuf::from(CONFIG_FILE));
        assert_eq!(config_path(Some(OsString::new())), PathBuf::from(CONFIG_FILE));
    }

    #[test]
    fn env_selected_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"forensic_target": "Z9"}}"#).unwrap();

        let path = config_path(Some(file.path().as_os_str().to_owned()));
        assert_eq!(DashboardConfig::load_from(&path).forensic_target, "Z9");
    }

    #[test]
    fn broken_or_missing_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert_eq!(DashboardConfig::load_from(file.path()), DashboardConfig::default());

        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join(CONFIG_FILE);
        assert_eq!(DashboardConfig::load_from(&missing), DashboardConfig::default());
    }
}
