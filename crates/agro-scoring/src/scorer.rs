//! Merge, score and rank

use agro_core::SeasonalFeatureRow;
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::{merge, EmbeddingTable, Regressor, SampleId, ScoringError, ScoringResult};

/// Predicted yield for one sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub sample: SampleId,
    #[serde(rename = "yield")]
    pub value: f64,
}

/// Descending by value; NaN last; ties keep their input order
pub fn rank(predictions: &mut [Prediction]) {
    predictions.sort_by(|a, b| match (a.value.is_nan(), b.value.is_nan()) {
        (false, false) => b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => Ordering::Equal,
    });
}

/// Shared, read-only scoring state
#[derive(Clone)]
pub struct YieldScorer {
    table: Arc<EmbeddingTable>,
    model: Arc<dyn Regressor>,
}

impl YieldScorer {
    pub fn new(table: Arc<EmbeddingTable>, model: Arc<dyn Regressor>) -> Self {
        Self { table, model }
    }

    pub fn table(&self) -> &EmbeddingTable {
        &self.table
    }

    /// Score every sample of the table for `year`, best first
    #[instrument(skip(self, weather), fields(model = self.model.name()))]
    pub fn predict(
        &self,
        year: i32,
        weather: &[SeasonalFeatureRow],
    ) -> ScoringResult<Vec<Prediction>> {
        let rows = merge(&self.table, year, weather);
        let values = self.model.predict(&rows)?;

        if values.len() != rows.len() {
            return Err(ScoringError::PredictionCount {
                expected: rows.len(),
                actual: values.len(),
            });
        }

        let mut predictions: Vec<Prediction> = rows
            .into_iter()
            .zip(values)
            .map(|(row, value)| Prediction {
                sample: row.sample,
                value,
            })
            .collect();
        rank(&mut predictions);

        debug!(samples = predictions.len(), "Predictions ranked");
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EmbeddingRecord, FeatureRow, LinearModel};

    fn prediction(name: &str, value: f64) -> Prediction {
        Prediction {
            sample: SampleId::Text(name.into()),
            value,
        }
    }

    fn table() -> Arc<EmbeddingTable> {
        let records = [1.0, 3.0, 2.0]
            .iter()
            .enumerate()
            .map(|(i, &e)| EmbeddingRecord {
                sample: SampleId::Integer(i as i64),
                embeddings: vec![e],
            })
            .collect();
        Arc::new(EmbeddingTable::new(records).unwrap())
    }

    struct ShortModel;

    impl Regressor for ShortModel {
        fn name(&self) -> &str {
            "short"
        }

        fn predict(&self, _rows: &[FeatureRow]) -> ScoringResult<Vec<f64>> {
            Ok(vec![1.0])
        }
    }

    #[test]
    fn test_rank_descending_nan_last() {
        let mut predictions = vec![
            prediction("a", 1.0),
            prediction("b", f64::NAN),
            prediction("c", 3.0),
            prediction("d", 1.0),
        ];
        rank(&mut predictions);

        let order: Vec<_> = predictions.iter().map(|p| p.sample.to_string()).collect();
        assert_eq!(order, vec!["c", "a", "d", "b"]);
    }

    #[test]
    fn test_predict_ranks_samples() {
        let model = LinearModel::from_json(r#"{"bias": 1.0, "embeddings": [10.0]}"#).unwrap();
        let scorer = YieldScorer::new(table(), Arc::new(model));

        let predictions = scorer.predict(2023, &[]).unwrap();
        let samples: Vec<_> = predictions.iter().map(|p| p.sample.to_string()).collect();
        assert_eq!(samples, vec!["1", "2", "0"]);
        assert_eq!(predictions[0].value, 31.0);
    }

    #[test]
    fn test_prediction_count_checked() {
        let scorer = YieldScorer::new(table(), Arc::new(ShortModel));
        assert!(matches!(
            scorer.predict(2023, &[]),
            Err(ScoringError::PredictionCount {
                expected: 3,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_prediction_json() {
        let json = serde_json::to_value(prediction("x", 2.5)).unwrap();
        assert_eq!(json, serde_json::json!({"sample": "x", "yield": 2.5}));
    }
}
