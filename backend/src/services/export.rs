//! CSV export of stored samples.

use crate::models::{Metal, SampleRecord};

pub const EXPORT_FILE_NAME: &str = "water_quality_results.csv";

pub const EXPORT_HEADER: [&str; 11] = [
    "id",
    "latitude",
    "longitude",
    "arsenic",
    "cadmium",
    "lead",
    "zinc",
    "heavy_metal_pollution_index",
    "hpi_category",
    "degree_of_contamination",
    "cd_category",
];

/// Render samples as CSV with a fixed column order. Unmeasured metals are empty cells.
pub fn samples_to_csv(samples: &[SampleRecord]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER)?;

    for sample in samples {
        let mut row = vec![
            sample.id.to_string(),
            sample.latitude.to_string(),
            sample.longitude.to_string(),
        ];
        row.extend(Metal::ALL.into_iter().map(|metal| {
            sample
                .concentrations
                .get(metal)
                .map(|v| v.to_string())
                .unwrap_or_default()
        }));
        row.push(sample.result.heavy_metal_pollution_index.to_string());
        row.push(sample.result.hpi_category.label().to_string());
        row.push(sample.result.degree_of_contamination.to_string());
        row.push(sample.result.cd_category.label().to_string());
        writer.write_record(&row)?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}
