//! Hotspot risk predictions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk band of a predicted location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    #[serde(rename = "Low risk")]
    Low,
    #[serde(rename = "Moderate risk")]
    Moderate,
    #[serde(rename = "High risk")]
    High,
    #[serde(rename = "Insufficient data")]
    InsufficientData,
}

impl RiskCategory {
    pub fn label(self) -> &'static str {
        match self {
            RiskCategory::Low => "Low risk",
            RiskCategory::Moderate => "Moderate risk",
            RiskCategory::High => "High risk",
            RiskCategory::InsufficientData => "Insufficient data",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How the HPI estimate behind a prediction was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateBasis {
    /// Computed from concentrations carried by the request row itself.
    Measured,
    /// Inverse-distance weighted from stored samples.
    Interpolated,
    /// No usable data near the location.
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotPrediction {
    pub latitude: f64,
    pub longitude: f64,
    /// Risk in `[0, 1]`; 1 means the estimated HPI reached the high-pollution band.
    pub risk_score: f64,
    pub risk_category: RiskCategory,
    pub estimated_hpi: Option<f64>,
    pub basis: EstimateBasis,
    /// Number of stored samples that contributed to an interpolated estimate.
    pub neighbors: usize,
}
