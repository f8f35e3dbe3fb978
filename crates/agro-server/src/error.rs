use agro_core::WeatherError;
use agro_scoring::ScoringError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Request failure, rendered as `{"detail": ..}` with a matching status
#[derive(Debug)]
pub enum ApiError {
    InvalidCell(String),
    InvalidTime(i64),
    InvalidSeason(i32),
    Upstream(anyhow::Error),
    Payload(WeatherError),
    Scoring(ScoringError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidCell(_) | ApiError::InvalidTime(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidSeason(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Payload(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Scoring(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::InvalidCell(id) => format!("invalid H3 cell: {id}"),
            ApiError::InvalidTime(ms) => format!("invalid timestamp: {ms}"),
            ApiError::InvalidSeason(year) => format!("season window does not exist in {year}"),
            ApiError::Upstream(e) => format!("weather provider error: {e:#}"),
            ApiError::Payload(e) => format!("invalid weather payload: {e}"),
            ApiError::Scoring(e) => format!("scoring failed: {e}"),
        }
    }
}

impl From<WeatherError> for ApiError {
    fn from(e: WeatherError) -> Self {
        ApiError::Payload(e)
    }
}

impl From<ScoringError> for ApiError {
    fn from(e: ScoringError) -> Self {
        ApiError::Scoring(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.detail();
        if status.is_server_error() {
            tracing::error!(%status, %detail, "request failed");
        } else {
            tracing::warn!(%status, %detail, "request rejected");
        }
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}
