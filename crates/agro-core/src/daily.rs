//! Daily display aggregation

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::rollups::aggregate;
use crate::{NormalizedSeries, Timestamp, Variable};

/// Summary of one calendar date
#[derive(Debug, Clone, PartialEq)]
pub struct DailyAggregateRow {
    pub date: NaiveDate,
    /// First observation instant seen for the date
    pub time: Timestamp,
    pub temperature_2m: f64,
    pub relative_humidity_2m: f64,
    pub rain: f64,
    pub cloud_cover_high: f64,
    pub soil_temperature_100_to_255cm: f64,
    pub soil_moisture_100_to_255cm: f64,
}

impl DailyAggregateRow {
    pub fn get(&self, variable: Variable) -> f64 {
        match variable {
            Variable::Temperature2m => self.temperature_2m,
            Variable::RelativeHumidity2m => self.relative_humidity_2m,
            Variable::Rain => self.rain,
            Variable::CloudCoverHigh => self.cloud_cover_high,
            Variable::SoilMoisture100To255cm => self.soil_moisture_100_to_255cm,
            Variable::SoilTemperature100To255cm => self.soil_temperature_100_to_255cm,
        }
    }
}

/// Column-oriented daily view, aligned by date index
///
/// Non-finite means (dates with no observations of a variable) serialize
/// as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyWeather {
    pub temperature_2m: Vec<f64>,
    pub relative_humidity_2m: Vec<f64>,
    pub rain: Vec<f64>,
    pub cloud_cover_high: Vec<f64>,
    pub soil_temperature_100_to_255cm: Vec<f64>,
    pub soil_moisture_100_to_255cm: Vec<f64>,
    pub time: Vec<Timestamp>,
}

impl DailyWeather {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

impl From<&[DailyAggregateRow]> for DailyWeather {
    fn from(rows: &[DailyAggregateRow]) -> Self {
        let column = |v: Variable| rows.iter().map(|r| r.get(v)).collect::<Vec<_>>();

        Self {
            temperature_2m: column(Variable::Temperature2m),
            relative_humidity_2m: column(Variable::RelativeHumidity2m),
            rain: column(Variable::Rain),
            cloud_cover_high: column(Variable::CloudCoverHigh),
            soil_temperature_100_to_255cm: column(Variable::SoilTemperature100To255cm),
            soil_moisture_100_to_255cm: column(Variable::SoilMoisture100To255cm),
            time: rows.iter().map(|r| r.time).collect(),
        }
    }
}

/// One row per calendar date, ascending
pub fn daily_aggregates(series: &NormalizedSeries) -> Vec<DailyAggregateRow> {
    series
        .group_by_date()
        .into_iter()
        .map(|(date, rows)| {
            let fold = |v: Variable| aggregate(v.daily_aggregate(), series.select(v, &rows));

            DailyAggregateRow {
                date,
                time: series.time()[rows[0]],
                temperature_2m: fold(Variable::Temperature2m),
                relative_humidity_2m: fold(Variable::RelativeHumidity2m),
                rain: fold(Variable::Rain),
                cloud_cover_high: fold(Variable::CloudCoverHigh),
                soil_temperature_100_to_255cm: fold(Variable::SoilTemperature100To255cm),
                soil_moisture_100_to_255cm: fold(Variable::SoilMoisture100To255cm),
            }
        })
        .collect()
}

pub fn daily_weather(series: &NormalizedSeries) -> DailyWeather {
    DailyWeather::from(daily_aggregates(series).as_slice())
}
