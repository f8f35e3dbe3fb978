use anyhow::Result;
use serde::Serialize;

use crate::{
    daily_weather, seasonal_features, DailyWeather, NormalizedSeries, RawWeatherPayload,
    SeasonalFeatureRow, WeatherRequest, WeatherResult,
};

/// Supplier of raw hourly payloads (the upstream archive, or a stand-in)
#[async_trait::async_trait]
pub trait WeatherSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, request: &WeatherRequest) -> Result<RawWeatherPayload>;
}

/// Both views of one payload, computed from a single normalization pass
#[derive(Debug, Clone, Serialize)]
pub struct SeasonAnalysis {
    pub seasonal: Vec<SeasonalFeatureRow>,
    pub daily: DailyWeather,
}

pub fn analyze(payload: &RawWeatherPayload) -> WeatherResult<SeasonAnalysis> {
    let series = NormalizedSeries::from_payload(payload)?;

    Ok(SeasonAnalysis {
        seasonal: seasonal_features(&series),
        daily: daily_weather(&series),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HourlyPayload, WeatherError};

    #[test]
    fn test_analyze_counts() {
        let mut hourly = HourlyPayload {
            time: vec![
                "2023-05-01T00:00".into(),
                "2023-05-01T01:00".into(),
                "2023-05-02T00:00".into(),
            ],
            ..Default::default()
        };
        hourly.set(crate::Variable::Temperature2m, vec![Some(12.0); 3]);

        let analysis = analyze(&RawWeatherPayload { hourly }).unwrap();
        assert_eq!(analysis.seasonal.len(), 1);
        assert_eq!(analysis.daily.len(), 2);
    }

    #[test]
    fn test_analyze_propagates_errors() {
        let hourly = HourlyPayload {
            time: vec!["garbage".into()],
            ..Default::default()
        };
        assert!(matches!(
            analyze(&RawWeatherPayload { hourly }),
            Err(WeatherError::InvalidTimestamp { index: 0, .. })
        ));
    }
}
