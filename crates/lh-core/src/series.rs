//! Zero-filled time series over the index, one point per bucket key.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::index::TimeIndex;
use crate::range::{TimeRange, resolve_range};
use crate::time_key::{parse_day, parse_month};
use crate::types::{EntityKind, Granularity, ParseError};

const MS_PER_HOUR: u64 = 3_600_000;

/// Value plotted for each bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesMetric {
    #[default]
    Plays,
    /// Play time in whole hours, rounded to nearest.
    Hours,
    /// Number of distinct entities with activity in the bucket.
    Distinct,
}

impl SeriesMetric {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Plays => "plays",
            Self::Hours => "hours",
            Self::Distinct => "distinct",
        }
    }
}

impl fmt::Display for SeriesMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SeriesMetric {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plays" => Ok(Self::Plays),
            "hours" => Ok(Self::Hours),
            "distinct" | "artists" | "albums" | "tracks" => Ok(Self::Distinct),
            _ => Err(ParseError::UnknownMetric {
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub key: String,
    /// First day of the bucket.
    pub date: NaiveDate,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series {
    pub granularity: Granularity,
    pub points: Vec<SeriesPoint>,
}

impl Series {
    const fn empty() -> Self {
        Self {
            granularity: Granularity::Day,
            points: Vec::new(),
        }
    }
}

fn key_date(granularity: Granularity, key: &str) -> Option<NaiveDate> {
    match granularity {
        Granularity::Day => parse_day(key),
        Granularity::Month => parse_month(key),
    }
}

/// Builds one point per bucket key in the resolved range.
///
/// An empty dataset or an inverted window yields no points at day granularity.
pub fn build_series(
    index: &TimeIndex,
    range: &TimeRange,
    kind: EntityKind,
    metric: SeriesMetric,
) -> Series {
    let Some(window) = resolve_range(range, index.min_day.as_deref(), index.max_day.as_deref())
    else {
        return Series::empty();
    };

    let granularity = window.granularity();
    let source = index.buckets(kind, granularity);
    let points = window
        .keys(granularity)
        .into_iter()
        .filter_map(|key| {
            let date = key_date(granularity, &key)?;
            let value = source.get(&key).map_or(0, |bucket| match metric {
                SeriesMetric::Distinct => bucket.len() as u64,
                SeriesMetric::Plays => bucket
                    .values()
                    .fold(0, |acc: u64, agg| acc.saturating_add(agg.plays)),
                SeriesMetric::Hours => {
                    let ms = bucket
                        .values()
                        .fold(0, |acc: u64, agg| acc.saturating_add(agg.ms));
                    ms.saturating_add(MS_PER_HOUR / 2) / MS_PER_HOUR
                }
            });
            Some(SeriesPoint { key, date, value })
        })
        .collect();

    Series {
        granularity,
        points,
    }
}
