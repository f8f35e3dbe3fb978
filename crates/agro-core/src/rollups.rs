//! Aggregation primitives with missing-value semantics
//!
//! Missing values (`None` or NaN) are skipped. Once skipped, an empty
//! `Min`/`Max`/`Avg` is NaN while an empty `Sum` is 0.

use serde::{Deserialize, Serialize};

/// Aggregation type for rollups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateType {
    Min,
    Max,
    Sum,
    Avg,
}

/// Streaming accumulator over optional observations
#[derive(Debug, Clone)]
pub struct Accumulator {
    aggregate_type: AggregateType,
    sum: f64,
    min: f64,
    max: f64,
    count: usize,
}

impl Accumulator {
    pub fn new(aggregate_type: AggregateType) -> Self {
        Self {
            aggregate_type,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            count: 0,
        }
    }

    pub fn add(&mut self, value: Option<f64>) {
        let Some(value) = value.filter(|v| !v.is_nan()) else {
            return;
        };
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.count += 1;
    }

    pub fn result(&self) -> f64 {
        match self.aggregate_type {
            AggregateType::Sum => self.sum,
            _ if self.count == 0 => f64::NAN,
            AggregateType::Min => self.min,
            AggregateType::Max => self.max,
            AggregateType::Avg => self.sum / self.count as f64,
        }
    }
}

/// Fold a sequence of optional observations with one aggregate
pub fn aggregate<I>(aggregate_type: AggregateType, values: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut acc = Accumulator::new(aggregate_type);
    for value in values {
        acc.add(value);
    }
    acc.result()
}
