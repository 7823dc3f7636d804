//! Hotspot risk prediction.
//!
//! A location is scored from an HPI estimate. When the request row carries its
//! own metal concentrations the estimate is that row's HPI. Otherwise the HPI is
//! interpolated from stored samples with inverse-distance weighting over
//! great-circle distances.

use serde::{Deserialize, Serialize};

use super::calculator::{round2, PollutionCalculator, HPI_HIGH_THRESHOLD, HPI_MODERATE_THRESHOLD};
use crate::models::{
    EstimateBasis, HotspotPrediction, HpiCategory, RiskCategory, SampleInput, SampleRecord,
};

/// Mean Earth radius (IUGG) in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Neighbors closer than this (1 m) are treated as the same site.
const COINCIDENT_KM: f64 = 0.001;

/// Interpolation parameters, read from the `[hotspot]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotspotSettings {
    pub radius_km: f64,
    pub max_neighbors: usize,
    pub power: f64,
}

impl Default for HotspotSettings {
    fn default() -> Self {
        Self {
            radius_km: 50.0,
            max_neighbors: 8,
            power: 2.0,
        }
    }
}

impl HotspotSettings {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.radius_km.is_finite() && self.radius_km > 0.0) {
            return Err(format!("hotspot radius_km must be positive, got {}", self.radius_km));
        }
        if self.max_neighbors == 0 {
            return Err("hotspot max_neighbors must be at least 1".to_string());
        }
        if !(self.power.is_finite() && self.power > 0.0) {
            return Err(format!("hotspot power must be positive, got {}", self.power));
        }
        Ok(())
    }
}

/// Great-circle distance between two points given in degrees.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

/// Map an HPI estimate onto a risk score in `[0, 1]` and a risk band.
pub fn score_hpi(hpi: f64) -> (f64, RiskCategory) {
    let score = (hpi / HPI_HIGH_THRESHOLD).clamp(0.0, 1.0);
    let score = (score * 1000.0).round() / 1000.0;

    let category = if hpi < HPI_MODERATE_THRESHOLD {
        RiskCategory::Low
    } else if hpi < HPI_HIGH_THRESHOLD {
        RiskCategory::Moderate
    } else {
        RiskCategory::High
    };

    (score, category)
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HotspotModel {
    settings: HotspotSettings,
    calculator: PollutionCalculator,
}

impl HotspotModel {
    pub fn new(settings: HotspotSettings, calculator: PollutionCalculator) -> Self {
        Self {
            settings,
            calculator,
        }
    }

    pub fn settings(&self) -> &HotspotSettings {
        &self.settings
    }

    /// Predict every location against the same set of stored samples.
    pub fn predict_all(
        &self,
        locations: &[SampleInput],
        samples: &[SampleRecord],
    ) -> Vec<HotspotPrediction> {
        locations
            .iter()
            .map(|location| self.predict(location, samples))
            .collect()
    }

    pub fn predict(&self, location: &SampleInput, samples: &[SampleRecord]) -> HotspotPrediction {
        if !location.concentrations.is_empty() {
            let (hpi, _) = self.calculator.calculate_hpi(&location.concentrations);
            return prediction(location, Some(hpi), EstimateBasis::Measured, 0);
        }

        match self.interpolate(location.latitude, location.longitude, samples) {
            Some((hpi, neighbors)) => prediction(
                location,
                Some(round2(hpi)),
                EstimateBasis::Interpolated,
                neighbors,
            ),
            None => prediction(location, None, EstimateBasis::None, 0),
        }
    }

    /// IDW estimate at a point plus the number of samples used.
    fn interpolate(&self, lat: f64, lon: f64, samples: &[SampleRecord]) -> Option<(f64, usize)> {
        let mut nearby: Vec<(f64, f64)> = samples
            .iter()
            .filter(|s| s.result.hpi_category != HpiCategory::NoData)
            .map(|s| {
                (
                    haversine_km(lat, lon, s.latitude, s.longitude),
                    s.result.heavy_metal_pollution_index,
                )
            })
            .filter(|(distance, _)| *distance <= self.settings.radius_km)
            .collect();

        if nearby.is_empty() {
            return None;
        }

        nearby.sort_by(|a, b| a.0.total_cmp(&b.0));
        nearby.truncate(self.settings.max_neighbors);

        if let Some(&(distance, hpi)) = nearby.first() {
            if distance < COINCIDENT_KM {
                return Some((hpi, 1));
            }
        }

        let (weighted, total_weight) =
            nearby
                .iter()
                .fold((0.0, 0.0), |(weighted, total), &(distance, hpi)| {
                    let weight = 1.0 / distance.powf(self.settings.power);
                    (weighted + weight * hpi, total + weight)
                });

        Some((weighted / total_weight, nearby.len()))
    }
}

fn prediction(
    location: &SampleInput,
    estimated_hpi: Option<f64>,
    basis: EstimateBasis,
    neighbors: usize,
) -> HotspotPrediction {
    let (risk_score, risk_category) = match estimated_hpi {
        Some(hpi) => score_hpi(hpi),
        None => (0.0, RiskCategory::InsufficientData),
    };

    HotspotPrediction {
        latitude: location.latitude,
        longitude: location.longitude,
        risk_score,
        risk_category,
        estimated_hpi,
        basis,
        neighbors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BatchId, MetalConcentrations, SampleId, ScoredSample};

    fn stored(id: i64, lat: f64, lon: f64, c: MetalConcentrations) -> SampleRecord {
        let input = SampleInput::new(lat, lon, c);
        let scored = ScoredSample {
            input,
            result: PollutionCalculator::default().evaluate(&c),
        };
        SampleRecord::from_scored(SampleId::new(id), BatchId::new(1), &scored)
    }

    fn location(lat: f64, lon: f64) -> SampleInput {
        SampleInput::new(lat, lon, MetalConcentrations::default())
    }

    #[test]
    fn test_haversine_known_distance() {
        // Delhi to Mumbai is roughly 1150 km.
        let d = haversine_km(28.6139, 77.2090, 19.0760, 72.8777);
        assert!((d - 1150.0).abs() < 10.0, "distance = {d}");
        assert_eq!(haversine_km(10.0, 10.0, 10.0, 10.0), 0.0);
    }

    #[test]
    fn test_score_hpi_bands_and_clamp() {
        assert_eq!(score_hpi(75.0), (0.5, RiskCategory::Low));
        assert_eq!(score_hpi(120.0), (0.8, RiskCategory::Moderate));
        assert_eq!(score_hpi(300.0), (1.0, RiskCategory::High));
        assert_eq!(score_hpi(100.0 / 3.0).0, 0.222);
    }

    #[test]
    fn test_measured_row_uses_its_own_hpi() {
        let model = HotspotModel::default();
        let row = SampleInput::new(1.0, 1.0, MetalConcentrations::new(15.0, 4.0, 12.0, 5500.0));
        let prediction = model.predict(&row, &[]);
        assert_eq!(prediction.basis, EstimateBasis::Measured);
        assert_eq!(prediction.risk_category, RiskCategory::Moderate);
        assert_eq!(prediction.neighbors, 0);
    }

    #[test]
    fn test_no_samples_in_range_is_insufficient_data() {
        let model = HotspotModel::default();
        let far = stored(1, 40.0, -3.0, MetalConcentrations::new(15.0, 4.0, 12.0, 5500.0));
        let prediction = model.predict(&location(28.7, 77.1), &[far]);
        assert_eq!(prediction.basis, EstimateBasis::None);
        assert_eq!(prediction.estimated_hpi, None);
        assert_eq!(prediction.risk_score, 0.0);
        assert_eq!(prediction.risk_category, RiskCategory::InsufficientData);
    }

    #[test]
    fn test_coincident_sample_returns_its_hpi() {
        let model = HotspotModel::default();
        let sample = stored(1, 28.7, 77.1, MetalConcentrations::new(5.0, 1.0, 4.0, 2000.0));
        let prediction = model.predict(&location(28.7, 77.1), &[sample.clone()]);
        assert_eq!(
            prediction.estimated_hpi,
            Some(sample.result.heavy_metal_pollution_index)
        );
        assert_eq!(prediction.neighbors, 1);
    }

    #[test]
    fn test_interpolation_lies_between_neighbors_and_favors_nearest() {
        let model = HotspotModel::default();
        let low = stored(1, 28.70, 77.10, MetalConcentrations::new(5.0, 1.0, 4.0, 2000.0));
        let high = stored(2, 28.90, 77.10, MetalConcentrations::new(30.0, 9.0, 30.0, 9000.0));
        let low_hpi = low.result.heavy_metal_pollution_index;
        let high_hpi = high.result.heavy_metal_pollution_index;

        let prediction = model.predict(&location(28.72, 77.10), &[low, high]);
        let estimate = prediction.estimated_hpi.unwrap();
        assert_eq!(prediction.basis, EstimateBasis::Interpolated);
        assert_eq!(prediction.neighbors, 2);
        assert!(estimate > low_hpi && estimate < high_hpi);
        assert!(estimate - low_hpi < high_hpi - estimate);
    }

    #[test]
    fn test_no_data_samples_are_ignored() {
        let model = HotspotModel::default();
        let empty = stored(1, 28.7, 77.1, MetalConcentrations::default());
        let prediction = model.predict(&location(28.7, 77.1), &[empty]);
        assert_eq!(prediction.basis, EstimateBasis::None);
    }

    #[test]
    fn test_max_neighbors_limits_contributors() {
        let model = HotspotModel::new(
            HotspotSettings {
                max_neighbors: 2,
                ..Default::default()
            },
            PollutionCalculator::default(),
        );
        let samples: Vec<_> = (0..5)
            .map(|i| {
                stored(
                    i + 1,
                    28.7 + 0.01 * (i as f64 + 1.0),
                    77.1,
                    MetalConcentrations::new(5.0, 1.0, 4.0, 2000.0),
                )
            })
            .collect();
        assert_eq!(model.predict(&location(28.7, 77.1), &samples).neighbors, 2);
    }

    #[test]
    fn test_settings_validation() {
        assert!(HotspotSettings::default().validate().is_ok());
        let bad = HotspotSettings {
            max_neighbors: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
