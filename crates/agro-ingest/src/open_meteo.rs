//! Open-Meteo historical archive client

use agro_core::{RawWeatherPayload, Variable, WeatherRequest, WeatherSource};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::{IngestError, IngestResult};

pub const DEFAULT_ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

#[derive(Debug, Clone, PartialEq)]
pub struct OpenMeteoSettings {
    pub archive_url: String,
    pub timezone: String,
    pub models: String,
    pub timeout: Duration,
}

impl Default for OpenMeteoSettings {
    fn default() -> Self {
        Self {
            archive_url: DEFAULT_ARCHIVE_URL.to_string(),
            timezone: "Europe/Moscow".to_string(),
            models: "best_match".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct OpenMeteoSource {
    client: reqwest::Client,
    archive_url: Url,
    timezone: String,
    models: String,
}

impl OpenMeteoSource {
    pub fn new(settings: OpenMeteoSettings) -> IngestResult<Self> {
        let archive_url = Url::parse(&settings.archive_url)?;
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;

        Ok(Self {
            client,
            archive_url,
            timezone: settings.timezone,
            models: settings.models,
        })
    }

    /// Query string for a request, all six hourly variables included
    pub fn query(&self, request: &WeatherRequest) -> Vec<(&'static str, String)> {
        let hourly = Variable::ALL
            .iter()
            .map(|v| v.name())
            .collect::<Vec<_>>()
            .join(",");

        vec![
            ("latitude", request.latitude.to_string()),
            ("longitude", request.longitude.to_string()),
            ("start_date", request.start_date.format("%Y-%m-%d").to_string()),
            ("end_date", request.end_date.format("%Y-%m-%d").to_string()),
            ("hourly", hourly),
            ("timezone", self.timezone.clone()),
            ("models", self.models.clone()),
        ]
    }

    async fn get(&self, request: &WeatherRequest) -> IngestResult<RawWeatherPayload> {
        let response = self
            .client
            .get(self.archive_url.clone())
            .query(&self.query(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IngestError::UpstreamStatus { status, body });
        }

        Ok(response.json::<RawWeatherPayload>().await?)
    }
}

#[async_trait::async_trait]
impl WeatherSource for OpenMeteoSource {
    fn name(&self) -> &str {
        "open-meteo"
    }

    #[instrument(skip(self), fields(source = "open-meteo"))]
    async fn fetch(&self, request: &WeatherRequest) -> anyhow::Result<RawWeatherPayload> {
        let payload = self.get(request).await?;
        debug!(hours = payload.hourly.time.len(), "Archive payload received");
        Ok(payload)
    }
}
