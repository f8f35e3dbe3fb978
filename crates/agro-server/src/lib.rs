use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use agro_core::{analyze, DailyWeather, MonthDay, WeatherRequest, WeatherSource};
use agro_scoring::{Prediction, YieldScorer};
use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Datelike, Utc};
use opentelemetry::metrics::{Counter, MeterProvider};
use opentelemetry_prometheus::exporter;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::{Encoder, Registry, TextEncoder};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{info, instrument};

pub mod error;
pub mod hexagon;

pub use error::ApiError;
pub use hexagon::{hexagon, Hexagon};

/// Collaborators wired in at startup
pub struct Services {
    pub source: Arc<dyn WeatherSource>,
    pub scorer: YieldScorer,
    pub season_start: MonthDay,
    pub season_end: MonthDay,
}

pub struct AppState {
    ready: AtomicBool,
    registry: Registry,
    #[allow(dead_code)]
    provider: SdkMeterProvider,
    requests_total: Counter<u64>,
    predictions_total: Counter<u64>,
    source: Arc<dyn WeatherSource>,
    scorer: YieldScorer,
    season_start: MonthDay,
    season_end: MonthDay,
}

pub fn build_app(services: Services) -> Result<(Router, Arc<AppState>)> {
    // Prometheus exporter via OpenTelemetry
    let registry = Registry::new();
    let reader = exporter()
        .with_registry(registry.clone())
        .build()
        .context("failed to build prometheus exporter")?;
    let provider = SdkMeterProvider::builder().with_reader(reader).build();
    let meter = provider.meter("agro-server");

    let requests_total = meter
        .u64_counter("agro_requests_total")
        .with_description("Total HTTP requests served")
        .init();
    let predictions_total = meter
        .u64_counter("agro_predictions_total")
        .with_description("Total sample yield predictions produced")
        .init();

    let state = Arc::new(AppState {
        ready: AtomicBool::new(false),
        registry,
        provider,
        requests_total,
        predictions_total,
        source: services.source,
        scorer: services.scorer,
        season_start: services.season_start,
        season_end: services.season_end,
    });

    let router = Router::new()
        .route("/api/health", get(health))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/polygons", post(polygons))
        .route("/api/polygons/:cell_id", get(polygon))
        .layer(CorsLayer::permissive())
        .with_state(Arc::clone(&state));

    Ok((router, state))
}

pub fn set_ready(state: &Arc<AppState>, is_ready: bool) {
    state.ready.store(is_ready, Ordering::Relaxed);
}

/// Calendar year (UTC) of an epoch-millisecond instant
pub fn target_year(now_ms: i64) -> Result<i32, ApiError> {
    DateTime::<Utc>::from_timestamp_millis(now_ms)
        .map(|dt| dt.year())
        .ok_or(ApiError::InvalidTime(now_ms))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    state.requests_total.add(1, &[]);
    Json(serde_json::json!({ "status": "OK" }))
}

async fn readyz(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.ready.load(Ordering::Relaxed) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn metrics(
    State(state): State<Arc<AppState>>,
) -> (
    [(axum::http::header::HeaderName, axum::http::HeaderValue); 1],
    String,
) {
    let encoder = TextEncoder::new();
    let metric_families = state.registry.gather();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        tracing::warn!(error=?e, "failed to encode metrics");
    }
    let body = String::from_utf8(buf).unwrap_or_default();
    let header = (
        header::CONTENT_TYPE,
        axum::http::HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    ([header], body)
}

#[derive(Debug, Deserialize)]
pub struct PolygonsRequest {
    pub ids: Vec<String>,
    pub now: i64,
}

async fn polygons(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PolygonsRequest>,
) -> Result<Json<Vec<Hexagon>>, ApiError> {
    state.requests_total.add(1, &[]);
    let hexagons = request
        .ids
        .iter()
        .map(|id| hexagon(id))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(hexagons))
}

#[derive(Debug, Deserialize)]
pub struct PolygonQuery {
    /// Epoch milliseconds; its year selects the season
    pub now: i64,
}

/// Cell geometry plus the season's daily weather and ranked predictions
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellPrediction {
    #[serde(flatten)]
    pub hexagon: Hexagon,
    pub weather: DailyWeather,
    pub yield_prediction: Vec<Prediction>,
}

#[instrument(skip(state, query), fields(now = query.now))]
async fn polygon(
    State(state): State<Arc<AppState>>,
    Path(cell_id): Path<String>,
    Query(query): Query<PolygonQuery>,
) -> Result<Json<CellPrediction>, ApiError> {
    state.requests_total.add(1, &[]);

    let hexagon = hexagon(&cell_id)?;
    let year = target_year(query.now)?;
    let request = WeatherRequest::for_season(
        hexagon.latitude(),
        hexagon.longitude(),
        year,
        state.season_start,
        state.season_end,
    )
    .ok_or(ApiError::InvalidSeason(year))?;

    let payload = state
        .source
        .fetch(&request)
        .await
        .map_err(ApiError::Upstream)?;
    let analysis = analyze(&payload)?;
    let predictions = state.scorer.predict(year, &analysis.seasonal)?;

    state
        .predictions_total
        .add(predictions.len() as u64, &[]);
    let stages: Vec<&str> = analysis
        .seasonal
        .iter()
        .find(|row| row.year == year)
        .map(|row| row.present_stages().collect())
        .unwrap_or_default();
    info!(
        year,
        ?stages,
        years = analysis.seasonal.len(),
        days = analysis.daily.len(),
        samples = predictions.len(),
        "Cell scored"
    );

    Ok(Json(CellPrediction {
        hexagon,
        weather: analysis.daily,
        yield_prediction: predictions,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_year() {
        // 2023-06-15T12:00:00Z
        assert_eq!(target_year(1_686_830_400_000).unwrap(), 2023);
        // 2024-01-01T00:00:00Z minus one millisecond
        assert_eq!(target_year(1_704_067_199_999).unwrap(), 2023);
        assert_eq!(target_year(1_704_067_200_000).unwrap(), 2024);
        assert!(matches!(target_year(i64::MAX), Err(ApiError::InvalidTime(_))));
    }
}
