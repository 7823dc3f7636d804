//! Pollution index calculations.
//!
//! # Heavy Metal Pollution Index (HPI)
//!
//! HPI is the weighted arithmetic mean of the metal sub-indices:
//!
//! ```text
//! Q_i = C_i / S_i * 100        (sub-index)
//! W_i = 1 / S_i                (unit weight)
//! HPI = Σ Q_i W_i / Σ W_i
//! ```
//!
//! # Degree of Contamination (Cd)
//!
//! Cd is the sum of the contamination factors `C_i / S_i`.
//!
//! `C_i` is the measured concentration and `S_i` the permissible value, both in
//! µg/L. Metals without a measurement are left out of both sums.

use serde::{Deserialize, Serialize};

use crate::models::{CdCategory, HpiCategory, Metal, MetalConcentrations, PollutionResult};

/// HPI values at or above this are "Moderate pollution".
pub const HPI_MODERATE_THRESHOLD: f64 = 100.0;
/// HPI values at or above this are "High pollution".
pub const HPI_HIGH_THRESHOLD: f64 = 150.0;
/// Cd values at or above this are "Moderate degree of contamination".
pub const CD_MODERATE_THRESHOLD: f64 = 1.0;
/// Cd values at or above this are "High degree of contamination".
pub const CD_HIGH_THRESHOLD: f64 = 3.0;

/// Standard permissible values `S_i` in µg/L (WHO drinking-water guidelines by default).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissibleLimits {
    pub arsenic: f64,
    pub cadmium: f64,
    pub lead: f64,
    pub zinc: f64,
}

impl Default for PermissibleLimits {
    fn default() -> Self {
        Self {
            arsenic: 10.0,
            cadmium: 3.0,
            lead: 10.0,
            zinc: 5000.0,
        }
    }
}

impl PermissibleLimits {
    pub fn limit(&self, metal: Metal) -> f64 {
        match metal {
            Metal::Arsenic => self.arsenic,
            Metal::Cadmium => self.cadmium,
            Metal::Lead => self.lead,
            Metal::Zinc => self.zinc,
        }
    }

    /// Unit weight `W_i = 1 / S_i`.
    pub fn unit_weight(&self, metal: Metal) -> f64 {
        1.0 / self.limit(metal)
    }

    /// Every limit must be a positive finite number.
    pub fn validate(&self) -> Result<(), String> {
        for metal in Metal::ALL {
            let limit = self.limit(metal);
            if !(limit.is_finite() && limit > 0.0) {
                return Err(format!(
                    "permissible value for {} must be positive, got {}",
                    metal, limit
                ));
            }
        }
        Ok(())
    }
}

/// Computes HPI and Cd against a set of permissible limits.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PollutionCalculator {
    limits: PermissibleLimits,
}

impl PollutionCalculator {
    pub fn new(limits: PermissibleLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &PermissibleLimits {
        &self.limits
    }

    /// HPI of one sample, rounded to two decimals, with its category.
    ///
    /// Returns `(0.0, HpiCategory::NoData)` when no metal is measured.
    pub fn calculate_hpi(&self, concentrations: &MetalConcentrations) -> (f64, HpiCategory) {
        let (numerator, denominator) = concentrations.present().fold(
            (0.0, 0.0),
            |(num, den), (metal, concentration)| {
                let standard = self.limits.limit(metal);
                let weight = self.limits.unit_weight(metal);
                let sub_index = concentration / standard * 100.0;
                (num + sub_index * weight, den + weight)
            },
        );

        if denominator == 0.0 {
            return (0.0, HpiCategory::NoData);
        }

        let hpi = numerator / denominator;
        (round2(hpi), categorize_hpi(hpi))
    }

    /// Degree of contamination of one sample, rounded to two decimals, with its category.
    pub fn calculate_degree_of_contamination(
        &self,
        concentrations: &MetalConcentrations,
    ) -> (f64, CdCategory) {
        let cd: f64 = concentrations
            .present()
            .map(|(metal, concentration)| concentration / self.limits.limit(metal))
            .sum();

        (round2(cd), categorize_cd(cd))
    }

    /// Both indices for one sample.
    pub fn evaluate(&self, concentrations: &MetalConcentrations) -> PollutionResult {
        let (heavy_metal_pollution_index, hpi_category) = self.calculate_hpi(concentrations);
        let (degree_of_contamination, cd_category) =
            self.calculate_degree_of_contamination(concentrations);

        PollutionResult {
            heavy_metal_pollution_index,
            hpi_category,
            degree_of_contamination,
            cd_category,
        }
    }
}

/// HPI with the default permissible limits.
pub fn calculate_hpi(concentrations: &MetalConcentrations) -> (f64, HpiCategory) {
    PollutionCalculator::default().calculate_hpi(concentrations)
}

/// Cd with the default permissible limits.
pub fn calculate_degree_of_contamination(concentrations: &MetalConcentrations) -> (f64, CdCategory) {
    PollutionCalculator::default().calculate_degree_of_contamination(concentrations)
}

pub fn categorize_hpi(hpi: f64) -> HpiCategory {
    if hpi < HPI_MODERATE_THRESHOLD {
        HpiCategory::Low
    } else if hpi < HPI_HIGH_THRESHOLD {
        HpiCategory::Moderate
    } else {
        HpiCategory::High
    }
}

pub fn categorize_cd(cd: f64) -> CdCategory {
    if cd < CD_MODERATE_THRESHOLD {
        CdCategory::Low
    } else if cd < CD_HIGH_THRESHOLD {
        CdCategory::Moderate
    } else {
        CdCategory::High
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moderate_sample() -> MetalConcentrations {
        MetalConcentrations::new(15.0, 4.0, 12.0, 5500.0)
    }

    fn low_sample() -> MetalConcentrations {
        MetalConcentrations::new(5.0, 1.0, 4.0, 2000.0)
    }

    #[test]
    fn test_hpi_moderate_pollution() {
        let (hpi, category) = calculate_hpi(&moderate_sample());
        assert!((hpi - 133.95).abs() < 0.01, "hpi = {hpi}");
        assert_eq!(category, HpiCategory::Moderate);
    }

    #[test]
    fn test_hpi_low_pollution() {
        let (hpi, category) = calculate_hpi(&low_sample());
        assert_eq!(hpi, 37.71);
        assert_eq!(category, HpiCategory::Low);
    }

    #[test]
    fn test_cd_reference_samples() {
        assert_eq!(
            calculate_degree_of_contamination(&moderate_sample()),
            (5.13, CdCategory::High)
        );
        assert_eq!(
            calculate_degree_of_contamination(&low_sample()),
            (1.63, CdCategory::Moderate)
        );
    }

    #[test]
    fn test_no_measurements() {
        let empty = MetalConcentrations::default();
        assert_eq!(calculate_hpi(&empty), (0.0, HpiCategory::NoData));
        assert_eq!(calculate_degree_of_contamination(&empty), (0.0, CdCategory::Low));
    }

    #[test]
    fn test_single_metal_hpi_equals_its_sub_index() {
        let only_lead = MetalConcentrations {
            lead: Some(25.0),
            ..Default::default()
        };
        assert_eq!(calculate_hpi(&only_lead), (250.0, HpiCategory::High));
    }

    #[test]
    fn test_category_boundaries() {
        assert_eq!(categorize_hpi(99.999), HpiCategory::Low);
        assert_eq!(categorize_hpi(100.0), HpiCategory::Moderate);
        assert_eq!(categorize_hpi(149.99), HpiCategory::Moderate);
        assert_eq!(categorize_hpi(150.0), HpiCategory::High);
        assert_eq!(categorize_cd(0.99), CdCategory::Low);
        assert_eq!(categorize_cd(1.0), CdCategory::Moderate);
        assert_eq!(categorize_cd(3.0), CdCategory::High);
    }

    #[test]
    fn test_custom_limits_change_the_result() {
        let strict = PollutionCalculator::new(PermissibleLimits {
            arsenic: 5.0,
            ..Default::default()
        });
        let only_arsenic = MetalConcentrations {
            arsenic: Some(6.0),
            ..Default::default()
        };
        assert_eq!(strict.calculate_hpi(&only_arsenic), (120.0, HpiCategory::Moderate));
        assert_eq!(calculate_hpi(&only_arsenic), (60.0, HpiCategory::Low));
    }

    #[test]
    fn test_limits_validation() {
        assert!(PermissibleLimits::default().validate().is_ok());
        let bad = PermissibleLimits {
            zinc: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().unwrap_err().contains("zinc"));
    }
}
