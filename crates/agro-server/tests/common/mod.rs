#![allow(dead_code)]

use std::sync::Arc;

use agro_core::{MonthDay, RawWeatherPayload, WeatherRequest, WeatherSource};
use agro_ingest::SimulatorSource;
use agro_scoring::{EmbeddingRecord, EmbeddingTable, LinearModel, SampleId, YieldScorer};
use axum::Router;

/// Valid resolution-5 cell near San Jose
pub const CELL: &str = "85283473fffffff";

/// 2023-06-15T12:00:00Z
pub const NOW_MS: i64 = 1_686_830_400_000;

pub fn table() -> Arc<EmbeddingTable> {
    let records = vec![
        EmbeddingRecord {
            sample: SampleId::Text("low".into()),
            embeddings: vec![0.0, 1.0],
        },
        EmbeddingRecord {
            sample: SampleId::Text("high".into()),
            embeddings: vec![1.0, 0.0],
        },
    ];
    Arc::new(EmbeddingTable::new(records).unwrap())
}

pub fn model() -> LinearModel {
    LinearModel::from_json(
        r#"{
            "bias": 20.0,
            "embeddings": [5.0, 1.0],
            "features": {"sum_rain_cvetenie": 0.01}
        }"#,
    )
    .unwrap()
}

pub fn app_with_source(source: Arc<dyn WeatherSource>) -> (Router, Arc<agro_server::AppState>) {
    agro_server::build_app(agro_server::Services {
        source,
        scorer: YieldScorer::new(table(), Arc::new(model())),
        season_start: MonthDay::new(5, 1),
        season_end: MonthDay::new(10, 1),
    })
    .unwrap()
}

pub fn app() -> (Router, Arc<agro_server::AppState>) {
    app_with_source(Arc::new(SimulatorSource::new()))
}

/// Source returning a fixed payload regardless of the request
pub struct FixedSource(pub RawWeatherPayload);

#[async_trait::async_trait]
impl WeatherSource for FixedSource {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn fetch(&self, _request: &WeatherRequest) -> anyhow::Result<RawWeatherPayload> {
        Ok(self.0.clone())
    }
}

/// Source that always fails, as an unreachable upstream would
pub struct FailingSource;

#[async_trait::async_trait]
impl WeatherSource for FailingSource {
    fn name(&self) -> &str {
        "failing"
    }

    async fn fetch(&self, _request: &WeatherRequest) -> anyhow::Result<RawWeatherPayload> {
        anyhow::bail!("connection refused")
    }
}
