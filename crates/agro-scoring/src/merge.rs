//! Left join of seasonal features onto the embedding table

use agro_core::{SeasonalFeatureRow, Statistic, STAGE_COUNT};

use crate::{EmbeddingTable, SampleId};

/// Number of seasonal feature columns in a model row
pub const FEATURE_COUNT: usize = STAGE_COUNT * Statistic::COUNT;

/// One model input row: `year`, `embeddings`, then every stage feature
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub sample: SampleId,
    pub year: i32,
    pub embeddings: Vec<f64>,
    /// Seasonal features in [`agro_core::feature_columns`] order; NaN where missing
    pub features: Vec<f64>,
}

/// Flatten a seasonal row into fixed column order; absent stages and an
/// absent row both become NaN
pub fn feature_vector(row: Option<&SeasonalFeatureRow>) -> Vec<f64> {
    let mut features = Vec::with_capacity(FEATURE_COUNT);
    for slot in 0..STAGE_COUNT {
        match row.and_then(|r| r.stages[slot].as_ref()) {
            Some(stage) => features.extend(Statistic::ALL.into_iter().map(|s| stage.get(s))),
            None => features.extend([f64::NAN; Statistic::COUNT]),
        }
    }
    features
}

/// Every sample takes `year`; samples keep their place even without a
/// matching weather row
pub fn merge(table: &EmbeddingTable, year: i32, weather: &[SeasonalFeatureRow]) -> Vec<FeatureRow> {
    let matched = weather.iter().find(|row| row.year == year);
    let features = feature_vector(matched);

    table
        .records()
        .iter()
        .map(|record| FeatureRow {
            sample: record.sample.clone(),
            year,
            embeddings: record.embeddings.clone(),
            features: features.clone(),
        })
        .collect()
}
