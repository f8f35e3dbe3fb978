//! Regression models over merged feature rows

use agro_core::feature_columns;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::{FeatureRow, ScoringError, ScoringResult, FEATURE_COUNT};

/// Opaque scorer: one prediction per input row, same order
pub trait Regressor: Send + Sync {
    fn name(&self) -> &str;

    fn predict(&self, rows: &[FeatureRow]) -> ScoringResult<Vec<f64>>;
}

#[derive(Debug, Deserialize)]
struct LinearWeights {
    bias: f64,
    #[serde(default)]
    year: f64,
    #[serde(default)]
    embeddings: Vec<f64>,
    #[serde(default)]
    features: BTreeMap<String, f64>,
}

/// Linear model: `bias + w_year * year + w_emb . emb + sum(w_i * x_i)`
///
/// Non-finite feature values contribute nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    bias: f64,
    year: f64,
    embeddings: Vec<f64>,
    features: Vec<f64>,
}

impl LinearModel {
    pub fn from_json(body: &str) -> ScoringResult<Self> {
        let weights: LinearWeights = serde_json::from_str(body)?;
        let columns = feature_columns();

        let mut features = vec![0.0; FEATURE_COUNT];
        for (name, weight) in weights.features {
            let index = columns
                .iter()
                .position(|c| *c == name)
                .ok_or(ScoringError::UnknownColumn(name))?;
            features[index] = weight;
        }

        Ok(Self {
            bias: weights.bias,
            year: weights.year,
            embeddings: weights.embeddings,
            features,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> ScoringResult<Self> {
        let path = path.as_ref();
        let model = Self::from_json(&fs::read_to_string(path)?)?;
        info!(path = %path.display(), "Linear model loaded");
        Ok(model)
    }

    fn score(&self, row: &FeatureRow) -> ScoringResult<f64> {
        if !self.embeddings.is_empty() && self.embeddings.len() != row.embeddings.len() {
            return Err(ScoringError::EmbeddingDimension {
                sample: row.sample.to_string(),
                expected: self.embeddings.len(),
                actual: row.embeddings.len(),
            });
        }

        let embedding: f64 = self
            .embeddings
            .iter()
            .zip(&row.embeddings)
            .map(|(w, x)| w * x)
            .sum();
        let weather: f64 = self
            .features
            .iter()
            .zip(&row.features)
            .filter(|(_, x)| x.is_finite())
            .map(|(w, x)| w * x)
            .sum();

        Ok(self.bias + self.year * f64::from(row.year) + embedding + weather)
    }
}

impl Regressor for LinearModel {
    fn name(&self) -> &str {
        "linear"
    }

    fn predict(&self, rows: &[FeatureRow]) -> ScoringResult<Vec<f64>> {
        rows.iter().map(|row| self.score(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SampleId;

    fn row(embeddings: Vec<f64>, features: Vec<f64>) -> FeatureRow {
        FeatureRow {
            sample: SampleId::Integer(1),
            year: 2023,
            embeddings,
            features,
        }
    }

    #[test]
    fn test_linear_prediction() {
        let model = LinearModel::from_json(
            r#"{
                "bias": 10.0,
                "year": 0.001,
                "embeddings": [2.0, -1.0],
                "features": {"sum_rain_prorastanie": 0.5, "gtd_vshody": 3.0}
            }"#,
        )
        .unwrap();

        let mut features = vec![f64::NAN; FEATURE_COUNT];
        features[4] = 100.0; // sum_rain_prorastanie
        features[15] = f64::INFINITY; // gtd_vshody

        let prediction = model.predict(&[row(vec![1.0, 1.0], features)]).unwrap();
        let expected = 10.0 + 2.023 + 1.0 + 50.0;
        assert!((prediction[0] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_feature_rejected() {
        let err = LinearModel::from_json(r#"{"bias": 0.0, "features": {"avg_wind": 1.0}}"#)
            .unwrap_err();
        assert!(matches!(err, ScoringError::UnknownColumn(name) if name == "avg_wind"));
    }

    #[test]
    fn test_embedding_dimension_checked() {
        let model = LinearModel::from_json(r#"{"bias": 0.0, "embeddings": [1.0, 1.0]}"#).unwrap();
        let result = model.predict(&[row(vec![1.0], vec![0.0; FEATURE_COUNT])]);
        assert!(matches!(
            result,
            Err(ScoringError::EmbeddingDimension { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_bias_only_model() {
        let model = LinearModel::from_json(r#"{"bias": 7.5}"#).unwrap();
        let rows = vec![
            row(vec![], vec![f64::NAN; FEATURE_COUNT]),
            row(vec![3.0], vec![1.0; FEATURE_COUNT]),
        ];
        assert_eq!(model.predict(&rows).unwrap(), vec![7.5, 7.5]);
    }
}
