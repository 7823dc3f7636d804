//! Aggregate view over all stored samples.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::sample::{HpiCategory, SampleRecord};
use crate::services::calculator::round2;

/// Averages and category counts across stored samples.
///
/// `count` and the category maps cover every sample. Averages only cover
/// samples with at least one measured metal, and are `None` when there are none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicesSummary {
    pub count: usize,
    pub avg_hpi: Option<f64>,
    pub avg_cd: Option<f64>,
    pub hpi_categories: BTreeMap<String, usize>,
    pub cd_categories: BTreeMap<String, usize>,
}

impl IndicesSummary {
    pub fn from_samples(samples: &[SampleRecord]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let count = samples.len();
        let mut measured = 0usize;
        let mut hpi_total = 0.0;
        let mut cd_total = 0.0;
        let mut hpi_categories = BTreeMap::new();
        let mut cd_categories = BTreeMap::new();

        for sample in samples {
            if sample.result.hpi_category != HpiCategory::NoData {
                measured += 1;
                hpi_total += sample.result.heavy_metal_pollution_index;
                cd_total += sample.result.degree_of_contamination;
            }
            *hpi_categories
                .entry(sample.result.hpi_category.label().to_string())
                .or_insert(0) += 1;
            *cd_categories
                .entry(sample.result.cd_category.label().to_string())
                .or_insert(0) += 1;
        }

        let average = |total: f64| (measured > 0).then(|| round2(total / measured as f64));

        Self {
            count,
            avg_hpi: average(hpi_total),
            avg_cd: average(cd_total),
            hpi_categories,
            cd_categories,
        }
    }
}
