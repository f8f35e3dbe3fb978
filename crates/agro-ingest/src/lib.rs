//! Weather payload sources
//!
//! Implementations of [`agro_core::WeatherSource`]: the Open-Meteo
//! historical archive, and a deterministic simulator for offline runs.

pub mod open_meteo;
pub mod simulator;

pub use open_meteo::*;
pub use simulator::*;

use agro_core::WeatherSource;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Unknown weather source: {0}")]
    UnknownSource(String),

    #[error("Invalid archive URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned {status}: {body}")]
    UpstreamStatus {
        status: reqwest::StatusCode,
        body: String,
    },
}

pub type IngestResult<T> = Result<T, IngestError>;

/// Create a source by its configured name
pub fn build_source(name: &str, settings: OpenMeteoSettings) -> IngestResult<Arc<dyn WeatherSource>> {
    match name {
        "open-meteo" => Ok(Arc::new(OpenMeteoSource::new(settings)?)),
        "simulator" => Ok(Arc::new(SimulatorSource::new())),
        other => Err(IngestError::UnknownSource(other.to_string())),
    }
}
