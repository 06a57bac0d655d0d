use std::path::PathBuf;

use thiserror::Error;

/// The two failure kinds the dashboard distinguishes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    /// The sensor table is missing or malformed. Fatal for the session.
    #[error("dataset '{}' unavailable: {reason}", path.display())]
    DatasetUnavailable { path: PathBuf, reason: String },

    /// The configured forensic sensor is not in the dataset. The overview
    /// still renders; only the case study is replaced by a warning.
    #[error("forensic target sensor '{detid}' not found in the current dataset")]
    ForensicTargetNotFound { detid: String },
}

impl DashboardError {
    /// Message shown to the user when the session halts.
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::DatasetUnavailable { path, .. } => format!(
                "File '{}' not found or unreadable! Export it from the clustering notebook first.",
                path.display()
            ),
            DashboardError::ForensicTargetNotFound { detid } => {
                format!("Forensic data for {detid} was not found in the current dataset.")
            }
        }
    }
}
