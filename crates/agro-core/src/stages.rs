//! Phenological stage calendar
//!
//! Stages are fixed month-day ranges re-anchored to whichever calendar year
//! is being aggregated. Both ends of a range are whole days, so a stage
//! window runs from midnight of its first day up to, but excluding,
//! midnight after its last day.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::{Timestamp, WeatherError};

/// A calendar day without a year
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    pub const fn new(month: u32, day: u32) -> Self {
        Self { month, day }
    }

    /// Anchor to a concrete year; `None` if the day does not exist in it
    pub fn in_year(self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }
}

impl FromStr for MonthDay {
    type Err = WeatherError;

    /// Parses `MM-DD`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || WeatherError::InvalidMonthDay(s.to_string());
        let (month, day) = s.trim().split_once('-').ok_or_else(invalid)?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let day: u32 = day.parse().map_err(|_| invalid())?;

        // 2000 is a leap year, so 02-29 is accepted here
        NaiveDate::from_ymd_opt(2000, month, day).ok_or_else(invalid)?;
        Ok(Self { month, day })
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

impl Serialize for MonthDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A named crop growth phase bounded by an inclusive month-day range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhenologicalStage {
    pub name: &'static str,
    pub start: MonthDay,
    pub end: MonthDay,
}

pub const STAGE_COUNT: usize = 7;

/// The seven stages, contiguous from May 1 through September 20
pub const STAGES: [PhenologicalStage; STAGE_COUNT] = [
    PhenologicalStage {
        name: "prorastanie",
        start: MonthDay::new(5, 1),
        end: MonthDay::new(5, 14),
    },
    PhenologicalStage {
        name: "vshody",
        start: MonthDay::new(5, 15),
        end: MonthDay::new(5, 28),
    },
    PhenologicalStage {
        name: "veg_faza",
        start: MonthDay::new(5, 29),
        end: MonthDay::new(6, 11),
    },
    PhenologicalStage {
        name: "cvetenie",
        start: MonthDay::new(6, 12),
        end: MonthDay::new(6, 25),
    },
    PhenologicalStage {
        name: "form_bobov",
        start: MonthDay::new(6, 26),
        end: MonthDay::new(7, 9),
    },
    PhenologicalStage {
        name: "sozrevanie",
        start: MonthDay::new(7, 10),
        end: MonthDay::new(7, 23),
    },
    PhenologicalStage {
        name: "ubor_urozhaya",
        start: MonthDay::new(7, 24),
        end: MonthDay::new(9, 20),
    },
];

/// Half-open instant range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl StageWindow {
    pub fn contains(&self, ts: &Timestamp) -> bool {
        self.start <= *ts && *ts < self.end
    }
}

impl PhenologicalStage {
    /// Concrete window of this stage in `year`
    ///
    /// The end runs through 23:00 of the last day instead of stopping at
    /// that day's midnight hour.
    pub fn window(&self, year: i32) -> Option<StageWindow> {
        let start = self.start.in_year(year)?;
        let last_day = self.end.in_year(year)?;
        let end = last_day.checked_add_days(Days::new(1))?;

        Some(StageWindow {
            start: start.and_time(chrono::NaiveTime::MIN),
            end: end.and_time(chrono::NaiveTime::MIN),
        })
    }

}
