use std::collections::{BTreeSet, HashMap};
use std::fmt;

use anyhow::{bail, Result};

// ---------------------------------------------------------------------------
// RiskLabel – cluster assignment produced by the offline K-Means step
// ---------------------------------------------------------------------------

/// Risk category attached to every sensor.
///
/// The four canonical labels come from the clustering notebook. Anything else
/// is kept verbatim in [`RiskLabel::Other`] so it can still be filtered and
/// drawn (with the default colour).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLabel {
    Safe,
    Low,
    Medium,
    High,
    Other(String),
}

impl RiskLabel {
    pub const SAFE: &'static str = "SAFE: Compliant & Stable";
    pub const LOW: &'static str = "LOW RISK: Congestion/Slow";
    pub const MEDIUM: &'static str = "MEDIUM RISK: Unstable Flow";
    pub const HIGH: &'static str = "HIGH RISK: Speeding Zone";

    /// Parse a raw label. Never fails: unknown text becomes `Other`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            Self::SAFE => RiskLabel::Safe,
            Self::LOW => RiskLabel::Low,
            Self::MEDIUM => RiskLabel::Medium,
            Self::HIGH => RiskLabel::High,
            other => RiskLabel::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RiskLabel::Safe => Self::SAFE,
            RiskLabel::Low => Self::LOW,
            RiskLabel::Medium => Self::MEDIUM,
            RiskLabel::High => Self::HIGH,
            RiskLabel::Other(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, RiskLabel::Other(_))
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SensorRecord – one row of the exported table
// ---------------------------------------------------------------------------

/// Aggregated measurement of one traffic sensor.
///
/// Numeric cells that were empty in the source file are stored as `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorRecord {
    pub detid: String,
    pub lat: f64,
    pub long: f64,
    /// Road functional class (Trunk, Primary, ...).
    pub fclass: String,
    pub avg_speed: f64,
    pub limit: f64,
    /// `avg_speed - limit`; negative means slower than the limit.
    pub speed_gap: f64,
    pub avg_flow: f64,
    pub risk_label: RiskLabel,
}

impl SensorRecord {
    /// Whether the row can be placed on a map.
    pub fn has_position(&self) -> bool {
        self.lat.is_finite() && self.long.is_finite()
    }
}

/// Column names every input format must provide.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "detid",
    "lat",
    "long",
    "fclass",
    "avg_speed",
    "limit",
    "speed_gap",
    "avg_flow",
    "risk_label",
];

// ---------------------------------------------------------------------------
// SensorDataset – the complete, immutable table
// ---------------------------------------------------------------------------

/// The loaded sensor table plus lookup indices. Never mutated after load.
#[derive(Debug, Clone)]
pub struct SensorDataset {
    records: Vec<SensorRecord>,
    by_detid: HashMap<String, usize>,
    /// Distinct risk labels present in the data, sorted.
    labels: BTreeSet<RiskLabel>,
}

impl SensorDataset {
    /// Build the dataset, rejecting duplicate sensor identifiers.
    pub fn from_records(records: Vec<SensorRecord>) -> Result<Self> {
        let mut by_detid = HashMap::with_capacity(records.len());
        let mut labels = BTreeSet::new();

        for (i, rec) in records.iter().enumerate() {
            if let Some(prev) = by_detid.insert(rec.detid.clone(), i) {
                bail!(
                    "duplicate detid '{}' at rows {prev} and {i}",
                    rec.detid
                );
            }
            labels.insert(rec.risk_label.clone());
        }

        Ok(SensorDataset {
            records,
            by_detid,
            labels,
        })
    }

    pub fn records(&self) -> &[SensorRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&SensorRecord> {
        self.records.get(index)
    }

    /// Index of the row with the given sensor identifier.
    pub fn position_of(&self, detid: &str) -> Option<usize> {
        self.by_detid.get(detid).copied()
    }

    pub fn labels(&self) -> &BTreeSet<RiskLabel> {
        &self.labels
    }

    /// Mean position of every placeable sensor, `(0.0, 0.0)` when none is.
    pub fn center(&self) -> (f64, f64) {
        let placed: Vec<&SensorRecord> = self.records.iter().filter(|r| r.has_position()).collect();
        if placed.is_empty() {
            return (0.0, 0.0);
        }
        let n = placed.len() as f64;
        (
            placed.iter().map(|r| r.lat).sum::<f64>() / n,
            placed.iter().map(|r| r.long).sum::<f64>() / n,
        )
    }

    /// Number of sensors.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
