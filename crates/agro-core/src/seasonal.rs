//! Seasonal feature aggregation
//!
//! Each calendar year present in a series becomes one [`SeasonalFeatureRow`]
//! holding, for every phenological stage with at least one observation,
//! eight statistics. Stages without observations are left out of the row
//! entirely rather than zero-filled.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::rollups::{aggregate, AggregateType};
use crate::stages::{PhenologicalStage, STAGES, STAGE_COUNT};
use crate::{NormalizedSeries, Variable};

/// Temperatures at or below this do not count towards the GTD heat sum
pub const GTD_BASE_TEMPERATURE: f64 = 10.0;

/// Per-stage statistic, in fixed output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    AvgDayTemp,
    MinDayTemp,
    MaxDayTemp,
    AvgSoilMoisture,
    SumRain,
    AvgTemperatureSoil,
    AvgCloudCoverHigh,
    Gtd,
}

impl Statistic {
    pub const COUNT: usize = 8;

    pub const ALL: [Statistic; Statistic::COUNT] = [
        Statistic::AvgDayTemp,
        Statistic::MinDayTemp,
        Statistic::MaxDayTemp,
        Statistic::AvgSoilMoisture,
        Statistic::SumRain,
        Statistic::AvgTemperatureSoil,
        Statistic::AvgCloudCoverHigh,
        Statistic::Gtd,
    ];

    /// Column name prefix; the stage name is appended after an underscore
    pub fn prefix(self) -> &'static str {
        match self {
            Statistic::AvgDayTemp => "avg_day_temp",
            Statistic::MinDayTemp => "min_day_temp",
            Statistic::MaxDayTemp => "max_day_temp",
            Statistic::AvgSoilMoisture => "avg_soil_moisture_100_to_255cm",
            Statistic::SumRain => "sum_rain",
            Statistic::AvgTemperatureSoil => "avg_temperature_soil",
            Statistic::AvgCloudCoverHigh => "avg_cloud_cover_high",
            Statistic::Gtd => "gtd",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Statistic> {
        Statistic::ALL.into_iter().find(|s| s.prefix() == prefix)
    }
}

/// Output column name for a statistic of a stage
pub fn column_name(statistic: Statistic, stage: &PhenologicalStage) -> String {
    format!("{}_{}", statistic.prefix(), stage.name)
}

/// All seasonal feature columns, stage-major, in scorer order
pub fn feature_columns() -> Vec<String> {
    STAGES
        .iter()
        .flat_map(|stage| Statistic::ALL.into_iter().map(move |s| column_name(s, stage)))
        .collect()
}

/// Statistics of one stage in one year
///
/// Values are NaN when the underlying variable had no observations, and GTD
/// may be infinite or NaN when the heat sum is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageFeatures {
    pub avg_day_temp: f64,
    pub min_day_temp: f64,
    pub max_day_temp: f64,
    pub avg_soil_moisture: f64,
    pub sum_rain: f64,
    pub avg_temperature_soil: f64,
    pub avg_cloud_cover_high: f64,
    pub gtd: f64,
}

impl StageFeatures {
    /// Compute stage statistics over the given (non-empty) row subset
    pub fn compute(series: &NormalizedSeries, rows: &[usize]) -> Self {
        let temp = || series.select(Variable::Temperature2m, rows);

        let sum_rain = aggregate(AggregateType::Sum, series.select(Variable::Rain, rows));
        let warm_sum = aggregate(
            AggregateType::Sum,
            temp().filter(|t| t.is_some_and(|t| t > GTD_BASE_TEMPERATURE)),
        );

        Self {
            avg_day_temp: aggregate(AggregateType::Avg, temp()),
            min_day_temp: aggregate(AggregateType::Min, temp()),
            max_day_temp: aggregate(AggregateType::Max, temp()),
            avg_soil_moisture: aggregate(
                AggregateType::Avg,
                series.select(Variable::SoilMoisture100To255cm, rows),
            ),
            sum_rain,
            avg_temperature_soil: aggregate(
                AggregateType::Avg,
                series.select(Variable::SoilTemperature100To255cm, rows),
            ),
            avg_cloud_cover_high: aggregate(
                AggregateType::Avg,
                series.select(Variable::CloudCoverHigh, rows),
            ),
            gtd: gtd(sum_rain, warm_sum),
        }
    }

    pub fn get(&self, statistic: Statistic) -> f64 {
        match statistic {
            Statistic::AvgDayTemp => self.avg_day_temp,
            Statistic::MinDayTemp => self.min_day_temp,
            Statistic::MaxDayTemp => self.max_day_temp,
            Statistic::AvgSoilMoisture => self.avg_soil_moisture,
            Statistic::SumRain => self.sum_rain,
            Statistic::AvgTemperatureSoil => self.avg_temperature_soil,
            Statistic::AvgCloudCoverHigh => self.avg_cloud_cover_high,
            Statistic::Gtd => self.gtd,
        }
    }
}

/// Hydrothermal ratio: rainfall over a tenth of the above-base heat sum.
/// A zero heat sum yields the raw IEEE result (inf or NaN).
pub fn gtd(sum_rain: f64, warm_temperature_sum: f64) -> f64 {
    sum_rain / (0.1 * warm_temperature_sum)
}

/// One year's seasonal features; `None` marks a stage with no observations
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalFeatureRow {
    pub year: i32,
    pub stages: [Option<StageFeatures>; STAGE_COUNT],
}

impl SeasonalFeatureRow {
    /// Value of a named column; `None` if the column is not present
    pub fn get(&self, column: &str) -> Option<f64> {
        STAGES.iter().zip(&self.stages).find_map(|(stage, features)| {
            let prefix = column.strip_suffix(stage.name)?.strip_suffix('_')?;
            let statistic = Statistic::from_prefix(prefix)?;
            features.as_ref().map(|f| f.get(statistic))
        })
    }

    /// Present columns in fixed order
    pub fn columns(&self) -> Vec<(String, f64)> {
        STAGES
            .iter()
            .zip(&self.stages)
            .filter_map(|(stage, features)| features.as_ref().map(|f| (stage, f)))
            .flat_map(|(stage, f)| {
                Statistic::ALL
                    .into_iter()
                    .map(move |s| (column_name(s, stage), f.get(s)))
            })
            .collect()
    }

    pub fn present_stages(&self) -> impl Iterator<Item = &'static str> + '_ {
        STAGES
            .iter()
            .zip(&self.stages)
            .filter(|(_, f)| f.is_some())
            .map(|(stage, _)| stage.name)
    }
}

/// Serializes as a sparse map: `year` then only the present columns
impl Serialize for SeasonalFeatureRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let columns = self.columns();
        let mut map = serializer.serialize_map(Some(columns.len() + 1))?;
        map.serialize_entry("year", &self.year)?;
        for (name, value) in &columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Aggregate a series into one row per calendar year, in first-seen order
pub fn seasonal_features(series: &NormalizedSeries) -> Vec<SeasonalFeatureRow> {
    series
        .years()
        .into_iter()
        .map(|year| {
            let year_rows = series.rows_in_year(year);
            let mut stages = [None; STAGE_COUNT];

            for (slot, stage) in stages.iter_mut().zip(STAGES.iter()) {
                let Some(window) = stage.window(year) else {
                    continue;
                };
                let rows = series.filter_window(&year_rows, &window);
                if rows.is_empty() {
                    continue;
                }
                *slot = Some(StageFeatures::compute(series, &rows));
            }

            SeasonalFeatureRow { year, stages }
        })
        .collect()
}
