//! Water sample types: raw concentrations, computed indices and stored records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

crate::define_id_type!(i64, SampleId);
crate::define_id_type!(i64, BatchId);

/// Heavy metals measured per sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metal {
    Arsenic,
    Cadmium,
    Lead,
    Zinc,
}

impl Metal {
    /// All metals, in the column order used for uploads and exports.
    pub const ALL: [Metal; 4] = [Metal::Arsenic, Metal::Cadmium, Metal::Lead, Metal::Zinc];

    /// Column name of this metal in uploaded tables.
    pub fn column(self) -> &'static str {
        match self {
            Metal::Arsenic => "arsenic",
            Metal::Cadmium => "cadmium",
            Metal::Lead => "lead",
            Metal::Zinc => "zinc",
        }
    }
}

impl fmt::Display for Metal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Metal concentrations in µg/L. `None` means the metal was not measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetalConcentrations {
    pub arsenic: Option<f64>,
    pub cadmium: Option<f64>,
    pub lead: Option<f64>,
    pub zinc: Option<f64>,
}

impl MetalConcentrations {
    pub fn new(arsenic: f64, cadmium: f64, lead: f64, zinc: f64) -> Self {
        Self {
            arsenic: Some(arsenic),
            cadmium: Some(cadmium),
            lead: Some(lead),
            zinc: Some(zinc),
        }
    }

    pub fn get(&self, metal: Metal) -> Option<f64> {
        match metal {
            Metal::Arsenic => self.arsenic,
            Metal::Cadmium => self.cadmium,
            Metal::Lead => self.lead,
            Metal::Zinc => self.zinc,
        }
    }

    pub fn set(&mut self, metal: Metal, value: Option<f64>) {
        let slot = match metal {
            Metal::Arsenic => &mut self.arsenic,
            Metal::Cadmium => &mut self.cadmium,
            Metal::Lead => &mut self.lead,
            Metal::Zinc => &mut self.zinc,
        };
        *slot = value;
    }

    /// Measured metals with a finite concentration.
    pub fn present(&self) -> impl Iterator<Item = (Metal, f64)> + '_ {
        Metal::ALL
            .into_iter()
            .filter_map(|metal| self.get(metal).filter(|v| v.is_finite()).map(|v| (metal, v)))
    }

    /// True when no metal carries a usable measurement.
    pub fn is_empty(&self) -> bool {
        self.present().next().is_none()
    }
}

/// One parsed row of an upload: a location plus whatever metals it carries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleInput {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(flatten)]
    pub concentrations: MetalConcentrations,
}

impl SampleInput {
    pub fn new(latitude: f64, longitude: f64, concentrations: MetalConcentrations) -> Self {
        Self {
            latitude,
            longitude,
            concentrations,
        }
    }
}

/// Quality band of the Heavy Metal Pollution Index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HpiCategory {
    #[serde(rename = "No Data")]
    NoData,
    #[serde(rename = "Low pollution")]
    Low,
    #[serde(rename = "Moderate pollution")]
    Moderate,
    #[serde(rename = "High pollution")]
    High,
}

impl HpiCategory {
    pub fn label(self) -> &'static str {
        match self {
            HpiCategory::NoData => "No Data",
            HpiCategory::Low => "Low pollution",
            HpiCategory::Moderate => "Moderate pollution",
            HpiCategory::High => "High pollution",
        }
    }
}

impl fmt::Display for HpiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for HpiCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            HpiCategory::NoData,
            HpiCategory::Low,
            HpiCategory::Moderate,
            HpiCategory::High,
        ]
        .into_iter()
        .find(|c| c.label() == s)
        .ok_or_else(|| format!("Unknown HPI category: {}", s))
    }
}

/// Quality band of the Degree of Contamination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CdCategory {
    #[serde(rename = "Low degree of contamination")]
    Low,
    #[serde(rename = "Moderate degree of contamination")]
    Moderate,
    #[serde(rename = "High degree of contamination")]
    High,
}

impl CdCategory {
    pub fn label(self) -> &'static str {
        match self {
            CdCategory::Low => "Low degree of contamination",
            CdCategory::Moderate => "Moderate degree of contamination",
            CdCategory::High => "High degree of contamination",
        }
    }
}

impl fmt::Display for CdCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CdCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [CdCategory::Low, CdCategory::Moderate, CdCategory::High]
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| format!("Unknown Cd category: {}", s))
    }
}

/// Indices computed for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PollutionResult {
    pub heavy_metal_pollution_index: f64,
    pub hpi_category: HpiCategory,
    pub degree_of_contamination: f64,
    pub cd_category: CdCategory,
}

/// A parsed sample together with its computed indices, ready to be stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredSample {
    pub input: SampleInput,
    pub result: PollutionResult,
}

/// A stored sample as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub id: SampleId,
    pub batch_id: BatchId,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(flatten)]
    pub concentrations: MetalConcentrations,
    pub result: PollutionResult,
}

impl SampleRecord {
    pub fn from_scored(id: SampleId, batch_id: BatchId, scored: &ScoredSample) -> Self {
        Self {
            id,
            batch_id,
            latitude: scored.input.latitude,
            longitude: scored.input.longitude,
            concentrations: scored.input.concentrations,
            result: scored.result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_skips_missing_and_nan() {
        let mut c = MetalConcentrations::new(1.0, 2.0, 3.0, 4.0);
        c.set(Metal::Lead, None);
        c.set(Metal::Zinc, Some(f64::NAN));
        let present: Vec<_> = c.present().collect();
        assert_eq!(present, vec![(Metal::Arsenic, 1.0), (Metal::Cadmium, 2.0)]);
        assert!(!c.is_empty());
        assert!(MetalConcentrations::default().is_empty());
    }

    #[test]
    fn test_category_labels_round_trip_through_from_str() {
        assert_eq!("Moderate pollution".parse::<HpiCategory>(), Ok(HpiCategory::Moderate));
        assert_eq!("No Data".parse::<HpiCategory>(), Ok(HpiCategory::NoData));
        assert_eq!(
            "High degree of contamination".parse::<CdCategory>(),
            Ok(CdCategory::High)
        );
        assert!("unknown".parse::<CdCategory>().is_err());
    }

    #[test]
    fn test_sample_record_json_shape() {
        let record = SampleRecord {
            id: SampleId::new(7),
            batch_id: BatchId::new(2),
            latitude: 28.7,
            longitude: 77.1,
            concentrations: MetalConcentrations {
                arsenic: Some(15.0),
                cadmium: None,
                lead: Some(12.0),
                zinc: Some(5500.0),
            },
            result: PollutionResult {
                heavy_metal_pollution_index: 128.9,
                hpi_category: HpiCategory::Moderate,
                degree_of_contamination: 3.8,
                cd_category: CdCategory::High,
            },
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["arsenic"], 15.0);
        assert!(json["cadmium"].is_null());
        assert_eq!(json["result"]["hpi_category"], "Moderate pollution");
        assert_eq!(json["result"]["cd_category"], "High degree of contamination");
    }
}
