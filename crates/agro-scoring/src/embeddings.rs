//! Static per-sample embedding table

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::{ScoringError, ScoringResult};

/// Sample identifier as stored in the table (text or integer)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleId {
    Integer(i64),
    Text(String),
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleId::Integer(v) => write!(f, "{v}"),
            SampleId::Text(v) => f.write_str(v),
        }
    }
}

/// One sample: identifier plus its precomputed embedding vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub sample: SampleId,
    pub embeddings: Vec<f64>,
}

/// On-disk layouts: a list of records, or one object per column keyed by
/// row position (`{"sample": {"0": ..}, "embeddings": {"0": [..]}}`)
#[derive(Deserialize)]
#[serde(untagged)]
enum EmbeddingFile {
    Records(Vec<EmbeddingRecord>),
    Columns {
        sample: BTreeMap<String, SampleId>,
        embeddings: BTreeMap<String, Vec<f64>>,
    },
}

/// Read-only table loaded once at startup and shared across requests
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingTable {
    records: Vec<EmbeddingRecord>,
    dimension: usize,
}

impl EmbeddingTable {
    pub fn new(records: Vec<EmbeddingRecord>) -> ScoringResult<Self> {
        let first = records.first().ok_or(ScoringError::EmptyTable)?;
        let dimension = first.embeddings.len();

        if let Some(bad) = records.iter().find(|r| r.embeddings.len() != dimension) {
            return Err(ScoringError::EmbeddingDimension {
                sample: bad.sample.to_string(),
                expected: dimension,
                actual: bad.embeddings.len(),
            });
        }

        Ok(Self { records, dimension })
    }

    pub fn from_json(body: &str) -> ScoringResult<Self> {
        let records = match serde_json::from_str::<EmbeddingFile>(body)? {
            EmbeddingFile::Records(records) => records,
            EmbeddingFile::Columns {
                sample,
                mut embeddings,
            } => {
                let mut rows: Vec<(usize, EmbeddingRecord)> = Vec::with_capacity(sample.len());
                for (key, sample) in sample {
                    let embeddings = embeddings.remove(&key).unwrap_or_default();
                    let position = key.parse().unwrap_or(usize::MAX);
                    rows.push((position, EmbeddingRecord { sample, embeddings }));
                }
                rows.sort_by_key(|(position, _)| *position);
                rows.into_iter().map(|(_, r)| r).collect()
            }
        };

        Self::new(records)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> ScoringResult<Self> {
        let path = path.as_ref();
        let table = Self::from_json(&fs::read_to_string(path)?)?;
        info!(
            path = %path.display(),
            samples = table.len(),
            dimension = table.dimension,
            "Embedding table loaded"
        );
        Ok(table)
    }

    pub fn records(&self) -> &[EmbeddingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_records_layout() {
        let json = r#"[
            {"sample": "A-1", "embeddings": [0.1, 0.2], "year": 0},
            {"sample": 42, "embeddings": [0.3, 0.4], "year": 0}
        ]"#;
        let table = EmbeddingTable::from_json(json).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.dimension(), 2);
        assert_eq!(table.records()[0].sample, SampleId::Text("A-1".into()));
        assert_eq!(table.records()[1].sample.to_string(), "42");
    }

    #[test]
    fn test_columns_layout_keeps_row_order() {
        let json = r#"{
            "sample": {"0": "first", "10": "last", "2": "middle"},
            "embeddings": {"0": [1.0], "10": [3.0], "2": [2.0]},
            "year": {"0": 0, "10": 0, "2": 0}
        }"#;
        let table = EmbeddingTable::from_json(json).unwrap();

        let names: Vec<_> = table.records().iter().map(|r| r.sample.to_string()).collect();
        assert_eq!(names, vec!["first", "middle", "last"]);
        assert_eq!(table.records()[2].embeddings, vec![3.0]);
    }

    #[test]
    fn test_ragged_embeddings_rejected() {
        let json = r#"[
            {"sample": "a", "embeddings": [0.1, 0.2]},
            {"sample": "b", "embeddings": [0.3]}
        ]"#;
        match EmbeddingTable::from_json(json) {
            Err(ScoringError::EmbeddingDimension {
                sample,
                expected,
                actual,
            }) => {
                assert_eq!(sample, "b");
                assert_eq!((expected, actual), (2, 1));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(matches!(
            EmbeddingTable::from_json("[]"),
            Err(ScoringError::EmptyTable)
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"sample": "s", "embeddings": [1.0, 2.0, 3.0]}}]"#).unwrap();

        let table = EmbeddingTable::load(file.path()).unwrap();
        assert_eq!(table.dimension(), 3);
    }
}
