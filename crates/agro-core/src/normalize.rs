//! Normalization of a raw payload into an index-aligned hourly series

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;

use crate::stages::StageWindow;
use crate::{RawWeatherPayload, Timestamp, Variable, WeatherError, WeatherResult};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Parse an ISO-8601 timestamp into wall-clock time
///
/// Offsets are dropped, keeping the local reading. A bare date is midnight.
pub fn parse_timestamp(value: &str) -> Option<Timestamp> {
    let value = value.trim();

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M%:z"))
                .ok()
                .map(|dt| dt.naive_local())
        })
}

/// Hourly observations keyed by timestamp, one column per [`Variable`]
///
/// Every column has exactly one entry per timestamp. A variable that was
/// absent from the payload is a column of `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    time: Vec<Timestamp>,
    columns: [Vec<Option<f64>>; Variable::COUNT],
}

impl NormalizedSeries {
    pub fn from_payload(payload: &RawWeatherPayload) -> WeatherResult<Self> {
        let time = payload
            .hourly
            .time
            .iter()
            .enumerate()
            .map(|(index, value)| {
                parse_timestamp(value).ok_or_else(|| WeatherError::InvalidTimestamp {
                    index,
                    value: value.clone(),
                })
            })
            .collect::<WeatherResult<Vec<_>>>()?;

        let expected = time.len();
        let mut columns: [Vec<Option<f64>>; Variable::COUNT] = Default::default();

        for variable in Variable::ALL {
            let values = payload.hourly.values(variable);
            columns[variable.index()] = if values.is_empty() {
                vec![None; expected]
            } else if values.len() != expected {
                return Err(WeatherError::LengthMismatch {
                    variable: variable.name(),
                    expected,
                    actual: values.len(),
                });
            } else {
                values.to_vec()
            };
        }

        Ok(Self { time, columns })
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn time(&self) -> &[Timestamp] {
        &self.time
    }

    pub fn column(&self, variable: Variable) -> &[Option<f64>] {
        &self.columns[variable.index()]
    }

    /// Values of `variable` at the given row indices
    pub fn select<'a>(
        &'a self,
        variable: Variable,
        rows: &'a [usize],
    ) -> impl Iterator<Item = Option<f64>> + 'a {
        let column = self.column(variable);
        rows.iter().map(move |&i| column[i])
    }

    /// Distinct calendar years, in order of first appearance
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = Vec::new();
        for ts in &self.time {
            if !years.contains(&ts.year()) {
                years.push(ts.year());
            }
        }
        years
    }

    /// Row indices falling in `year`, in series order
    pub fn rows_in_year(&self, year: i32) -> Vec<usize> {
        self.time
            .iter()
            .enumerate()
            .filter(|(_, ts)| ts.year() == year)
            .map(|(i, _)| i)
            .collect()
    }

    /// Subset of `rows` whose timestamp lies inside `window`
    pub fn filter_window(&self, rows: &[usize], window: &StageWindow) -> Vec<usize> {
        rows.iter()
            .copied()
            .filter(|&i| window.contains(&self.time[i]))
            .collect()
    }

    /// Row indices grouped by the date portion of their timestamp
    pub fn group_by_date(&self) -> BTreeMap<NaiveDate, Vec<usize>> {
        let mut groups: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
        for (i, ts) in self.time.iter().enumerate() {
            groups.entry(ts.date()).or_default().push(i);
        }
        groups
    }
}
