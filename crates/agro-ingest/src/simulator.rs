//! Simulated weather archive for offline runs and tests

use agro_core::{HourlyPayload, RawWeatherPayload, Variable, WeatherRequest, WeatherSource};
use chrono::{Duration, NaiveTime};
use std::f64::consts::PI;

/// Generates a smooth, deterministic hourly season for any location
#[derive(Debug, Clone)]
pub struct SimulatorSource {
    base_temp: f64,
}

impl SimulatorSource {
    pub fn new() -> Self {
        Self {
            base_temp: 16.0, // °C at 50° latitude
        }
    }

    /// Hourly payload covering every hour of the requested dates
    pub fn generate(&self, request: &WeatherRequest) -> RawWeatherPayload {
        let start = request.start_date.and_time(NaiveTime::MIN);
        let days = (request.end_date - request.start_date).num_days() + 1;
        let hours = (days.max(0) * 24) as usize;

        let latitude_offset = (request.latitude - 50.0) * 0.3;
        let mut hourly = HourlyPayload::default();
        let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(hours); Variable::COUNT];

        for h in 0..hours {
            let ts = start + Duration::hours(h as i64);
            let day = (h / 24) as f64;
            let hour_of_day = (h % 24) as f64;
            let diurnal = (2.0 * PI * (hour_of_day - 9.0) / 24.0).sin();

            let temperature = self.base_temp - latitude_offset + 8.0 * diurnal + day * 0.05;
            let rain = if (h * 7 + 3) % 23 == 0 { 1.2 } else { 0.0 };

            let values = [
                temperature,
                70.0 - 15.0 * diurnal,
                rain,
                ((h / 24) * 13 % 100) as f64,
                0.32 - day * 0.0005,
                8.0 + day * 0.05,
            ];
            for (column, value) in columns.iter_mut().zip(values) {
                column.push(Some(value));
            }

            hourly.time.push(ts.format("%Y-%m-%dT%H:%M").to_string());
        }

        for (variable, column) in Variable::ALL.into_iter().zip(columns) {
            hourly.set(variable, column);
        }

        RawWeatherPayload { hourly }
    }
}

impl Default for SimulatorSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl WeatherSource for SimulatorSource {
    fn name(&self) -> &str {
        "simulator"
    }

    async fn fetch(&self, request: &WeatherRequest) -> anyhow::Result<RawWeatherPayload> {
        let payload = self.generate(request);
        tracing::debug!(hours = payload.hourly.time.len(), "Simulated payload generated");
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agro_core::{analyze, MonthDay};

    fn season(year: i32) -> WeatherRequest {
        WeatherRequest::for_season(55.0, 37.0, year, MonthDay::new(5, 1), MonthDay::new(10, 1))
            .unwrap()
    }

    #[test]
    fn test_generated_payload_shape() {
        let payload = SimulatorSource::new().generate(&season(2023));

        // May 1 through October 1 inclusive
        let hours = 154 * 24;
        assert_eq!(payload.hourly.time.len(), hours);
        assert_eq!(payload.hourly.time[0], "2023-05-01T00:00");
        for v in Variable::ALL {
            assert_eq!(payload.hourly.values(v).len(), hours, "{}", v.name());
        }
    }

    #[test]
    fn test_generated_season_covers_every_stage() {
        let payload = SimulatorSource::new().generate(&season(2022));
        let analysis = analyze(&payload).unwrap();

        assert_eq!(analysis.seasonal.len(), 1);
        assert!(analysis.seasonal[0].stages.iter().all(Option::is_some));
        assert_eq!(analysis.daily.len(), 154);
    }

    #[tokio::test]
    async fn test_fetch_is_deterministic() {
        let source = SimulatorSource::new();
        let a = source.fetch(&season(2021)).await.unwrap();
        let b = source.fetch(&season(2021)).await.unwrap();
        assert_eq!(a, b);
    }
}
