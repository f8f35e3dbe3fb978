//! Core data types, normalization, and seasonal aggregation for yield prediction
//!
//! This crate turns a raw hourly weather payload into the per-stage seasonal
//! feature rows consumed by the scorer, and into the daily summaries shown
//! next to a prediction. Everything here is pure and synchronous.

pub mod daily;
pub mod normalize;
pub mod pipeline;
pub mod rollups;
pub mod seasonal;
pub mod stages;
pub mod types;

pub use daily::*;
pub use normalize::*;
pub use pipeline::*;
pub use rollups::*;
pub use seasonal::*;
pub use stages::*;
pub use types::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Invalid timestamp at index {index}: {value:?}")]
    InvalidTimestamp { index: usize, value: String },

    #[error("Length mismatch for {variable}: expected {expected} values, got {actual}")]
    LengthMismatch {
        variable: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid month-day: {0}")]
    InvalidMonthDay(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

pub type WeatherResult<T> = Result<T, WeatherError>;
