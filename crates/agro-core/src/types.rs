//! Core data types for hourly weather payloads

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::rollups::AggregateType;
use crate::stages::MonthDay;

/// Timezone-naive wall-clock instant of an hourly observation
pub type Timestamp = NaiveDateTime;

/// Hourly variables requested from the weather provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variable {
    Temperature2m,
    RelativeHumidity2m,
    Rain,
    CloudCoverHigh,
    SoilMoisture100To255cm,
    SoilTemperature100To255cm,
}

impl Variable {
    pub const COUNT: usize = 6;

    /// All variables, in the order they are requested upstream
    pub const ALL: [Variable; Variable::COUNT] = [
        Variable::Temperature2m,
        Variable::RelativeHumidity2m,
        Variable::Rain,
        Variable::CloudCoverHigh,
        Variable::SoilMoisture100To255cm,
        Variable::SoilTemperature100To255cm,
    ];

    /// Key used in the provider payload
    pub fn name(self) -> &'static str {
        match self {
            Variable::Temperature2m => "temperature_2m",
            Variable::RelativeHumidity2m => "relative_humidity_2m",
            Variable::Rain => "rain",
            Variable::CloudCoverHigh => "cloud_cover_high",
            Variable::SoilMoisture100To255cm => "soil_moisture_100_to_255cm",
            Variable::SoilTemperature100To255cm => "soil_temperature_100_to_255cm",
        }
    }

    /// Position of the variable's column in a normalized series
    pub fn index(self) -> usize {
        self as usize
    }

    /// How the variable is folded into a daily summary
    pub fn daily_aggregate(self) -> AggregateType {
        match self {
            Variable::Rain => AggregateType::Sum,
            _ => AggregateType::Avg,
        }
    }
}

/// Raw response body from the weather provider
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawWeatherPayload {
    pub hourly: HourlyPayload,
}

/// Hourly block of a provider response: a time axis plus index-aligned arrays
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HourlyPayload {
    /// ISO-8601 timestamps
    pub time: Vec<String>,

    /// Variable name -> hourly values (null marks a gap)
    #[serde(flatten)]
    pub variables: BTreeMap<String, Vec<Option<f64>>>,
}

impl RawWeatherPayload {
    pub fn from_json(body: &str) -> crate::WeatherResult<Self> {
        Ok(serde_json::from_str(body)?)
    }
}

impl HourlyPayload {
    /// Values for a variable; an absent variable yields an empty slice
    pub fn values(&self, variable: Variable) -> &[Option<f64>] {
        self.variables
            .get(variable.name())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn set(&mut self, variable: Variable, values: Vec<Option<f64>>) {
        self.variables.insert(variable.name().to_string(), values);
    }
}

/// Upstream query for one location over a date range (both ends inclusive)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl WeatherRequest {
    /// Growing-season window of `year` for a location
    pub fn for_season(
        latitude: f64,
        longitude: f64,
        year: i32,
        season_start: MonthDay,
        season_end: MonthDay,
    ) -> Option<Self> {
        Some(Self {
            latitude,
            longitude,
            start_date: season_start.in_year(year)?,
            end_date: season_end.in_year(year)?,
        })
    }
}
