use agro_core::MonthDay;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WeatherConfig {
    /// `open-meteo` or `simulator`
    pub source: Option<String>,
    pub archive_url: Option<String>,
    pub timezone: Option<String>,
    pub models: Option<String>,
    pub season_start: Option<MonthDay>,
    pub season_end: Option<MonthDay>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModelConfig {
    pub embeddings_path: Option<PathBuf>,
    pub weights_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub server: Option<ServerConfig>,
    pub weather: Option<WeatherConfig>,
    pub model: Option<ModelConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppConfig {
    /// Load configuration from AGRO_CONFIG path (TOML) if present, with reasonable defaults
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("AGRO_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from(path)
    }

    /// Load from an explicit path; a missing file yields the defaults
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let cfg = if path.exists() {
            let s = fs::read_to_string(path)?;
            toml::from_str::<AppConfig>(&s)?
        } else {
            AppConfig::default()
        };
        Ok(cfg)
    }

    fn weather(&self) -> Option<&WeatherConfig> {
        self.weather.as_ref()
    }

    fn model(&self) -> Option<&ModelConfig> {
        self.model.as_ref()
    }

    /// Get HTTP bind address (default 0.0.0.0:8010)
    pub fn http_bind(&self) -> String {
        self.server
            .as_ref()
            .and_then(|s| s.bind.clone())
            .unwrap_or_else(|| "0.0.0.0:8010".to_string())
    }

    pub fn weather_source(&self) -> String {
        self.weather()
            .and_then(|w| w.source.clone())
            .unwrap_or_else(|| "open-meteo".to_string())
    }

    pub fn archive_url(&self) -> String {
        self.weather()
            .and_then(|w| w.archive_url.clone())
            .unwrap_or_else(|| "https://archive-api.open-meteo.com/v1/archive".to_string())
    }

    pub fn timezone(&self) -> String {
        self.weather()
            .and_then(|w| w.timezone.clone())
            .unwrap_or_else(|| "Europe/Moscow".to_string())
    }

    pub fn models(&self) -> String {
        self.weather()
            .and_then(|w| w.models.clone())
            .unwrap_or_else(|| "best_match".to_string())
    }

    /// First day of the fetched season (default May 1)
    pub fn season_start(&self) -> MonthDay {
        self.weather()
            .and_then(|w| w.season_start)
            .unwrap_or(MonthDay::new(5, 1))
    }

    /// Last day of the fetched season (default October 1)
    pub fn season_end(&self) -> MonthDay {
        self.weather()
            .and_then(|w| w.season_end)
            .unwrap_or(MonthDay::new(10, 1))
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.weather().and_then(|w| w.timeout_secs).unwrap_or(30))
    }

    pub fn embeddings_path(&self) -> PathBuf {
        self.model()
            .and_then(|m| m.embeddings_path.clone())
            .unwrap_or_else(|| PathBuf::from("./weights/embeddings.json"))
    }

    pub fn weights_path(&self) -> PathBuf {
        self.model()
            .and_then(|m| m.weights_path.clone())
            .unwrap_or_else(|| PathBuf::from("./weights/model.json"))
    }
}
