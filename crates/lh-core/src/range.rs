//! Time-range selectors and their resolution against a dataset.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::time_key::{self, add_months, add_years, build_keys, choose_granularity, parse_day};
use crate::types::{Granularity, ParseError};

/// A window relative to the last day with data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FixedRange {
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "1Y")]
    OneYear,
    #[default]
    All,
}

impl FixedRange {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OneMonth => "1M",
            Self::ThreeMonths => "3M",
            Self::SixMonths => "6M",
            Self::OneYear => "1Y",
            Self::All => "All",
        }
    }

    /// Start day of the window ending at `max`, before clamping.
    fn start(self, min: NaiveDate, max: NaiveDate) -> NaiveDate {
        match self {
            Self::OneMonth => add_months(max, -1),
            Self::ThreeMonths => add_months(max, -3),
            Self::SixMonths => add_months(max, -6),
            Self::OneYear => add_years(max, -1),
            Self::All => min,
        }
    }
}

/// Selects the time window of a query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeRange {
    /// Relative window ending at the dataset's last day.
    Fixed { value: FixedRange },
    /// Explicit inclusive day pair. Only the first ten characters are read.
    Explicit { from: String, to: String },
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::Fixed {
            value: FixedRange::All,
        }
    }
}

impl From<FixedRange> for TimeRange {
    fn from(value: FixedRange) -> Self {
        Self::Fixed { value }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed { value } => write!(f, "{}", value.as_str()),
            Self::Explicit { from, to } => write!(f, "{from}..{to}"),
        }
    }
}

impl FromStr for TimeRange {
    type Err = ParseError;

    /// Parses `1M`, `3M`, `6M`, `1Y`, `All` or `YYYY-MM-DD..YYYY-MM-DD`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fixed = match s.trim() {
            "1M" | "1m" => Some(FixedRange::OneMonth),
            "3M" | "3m" => Some(FixedRange::ThreeMonths),
            "6M" | "6m" => Some(FixedRange::SixMonths),
            "1Y" | "1y" => Some(FixedRange::OneYear),
            "All" | "all" | "ALL" => Some(FixedRange::All),
            _ => None,
        };
        if let Some(value) = fixed {
            return Ok(Self::Fixed { value });
        }

        let Some((from, to)) = s.trim().split_once("..") else {
            return Err(ParseError::InvalidTimeRange {
                value: s.to_string(),
            });
        };
        for day in [from, to] {
            if day.len() != 10 || parse_day(day).is_none() {
                return Err(ParseError::InvalidDay {
                    value: day.to_string(),
                });
            }
        }
        Ok(Self::Explicit {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

/// A concrete, non-empty, inclusive day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DayRange {
    /// Day or month, depending on the span.
    pub fn granularity(&self) -> Granularity {
        choose_granularity(self.from, self.to)
    }

    /// Ordered bucket keys covering the window at `granularity`.
    pub fn keys(&self, granularity: Granularity) -> Vec<String> {
        build_keys(granularity, self.from, self.to)
    }
}

/// Resolves a selector into a day window clamped to `[min_day, max_day]`.
///
/// Returns `None` when the dataset is empty, the keys are unparseable, or the
/// clamped window is inverted. Callers treat that as "no data".
pub fn resolve_range(
    range: &TimeRange,
    min_day: Option<&str>,
    max_day: Option<&str>,
) -> Option<DayRange> {
    let (min, max) = (min_day?, max_day?);

    let (from, to) = match range {
        TimeRange::Explicit { from, to } => (
            time_key::clamp_day(from.get(..10).unwrap_or(from.as_str()), min, max).to_string(),
            time_key::clamp_day(to.get(..10).unwrap_or(to.as_str()), min, max).to_string(),
        ),
        TimeRange::Fixed { value } => {
            let end = parse_day(max)?;
            let start = value.start(parse_day(min)?, end);
            let start = time_key::format_day(start);
            let end = time_key::format_day(end);
            (
                time_key::clamp_day(&start, min, max).to_string(),
                time_key::clamp_day(&end, min, max).to_string(),
            )
        }
    };

    if from > to {
        return None;
    }
    Some(DayRange {
        from: parse_day(&from)?,
        to: parse_day(&to)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        parse_day(s).unwrap()
    }

    #[test]
    fn parses_fixed_and_explicit_ranges() {
        assert_eq!("3M".parse::<TimeRange>().unwrap(), FixedRange::ThreeMonths.into());
        assert_eq!("all".parse::<TimeRange>().unwrap(), TimeRange::default());
        assert_eq!(
            "2024-01-01..2024-02-01".parse::<TimeRange>().unwrap(),
            TimeRange::Explicit {
                from: "2024-01-01".into(),
                to: "2024-02-01".into()
            }
        );
        assert!("2Y".parse::<TimeRange>().is_err());
        assert!(matches!(
            "2024-13-01..2024-02-01".parse::<TimeRange>(),
            Err(ParseError::InvalidDay { .. })
        ));
    }

    #[test]
    fn explicit_days_must_be_exact_keys() {
        for text in [
            "2024-01-01junk..2024-02-01",
            "2024-01-01..2024-02-01T00:00:00Z",
            "2024-1-01..2024-02-01",
        ] {
            assert!(
                matches!(
                    text.parse::<TimeRange>(),
                    Err(ParseError::InvalidDay { .. })
                ),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn display_roundtrips() {
        for text in ["1M", "3M", "6M", "1Y", "All", "2024-01-01..2024-02-01"] {
            assert_eq!(text.parse::<TimeRange>().unwrap().to_string(), text);
        }
    }

    #[test]
    fn empty_dataset_resolves_to_none() {
        assert_eq!(resolve_range(&TimeRange::default(), None, None), None);
    }

    #[test]
    fn all_covers_dataset() {
        let r = resolve_range(&TimeRange::default(), Some("2023-05-01"), Some("2024-03-31")).unwrap();
        assert_eq!(r.from, day("2023-05-01"));
        assert_eq!(r.to, day("2024-03-31"));
    }

    #[test]
    fn one_month_from_march_31_starts_end_of_february() {
        let range = FixedRange::OneMonth.into();
        let r = resolve_range(&range, Some("2023-01-01"), Some("2024-03-31")).unwrap();
        assert_eq!(r.from, day("2024-02-29"));
        assert_eq!(r.to, day("2024-03-31"));
    }

    #[test]
    fn fixed_window_is_clamped_to_min_day() {
        let range = FixedRange::OneYear.into();
        let r = resolve_range(&range, Some("2024-02-01"), Some("2024-03-31")).unwrap();
        assert_eq!(r.from, day("2024-02-01"));
    }

    #[test]
    fn explicit_range_is_clamped_and_truncated() {
        let range = TimeRange::Explicit {
            from: "2020-01-01T00:00:00Z".into(),
            to: "2024-02-10".into(),
        };
        let r = resolve_range(&range, Some("2024-01-05"), Some("2024-03-01")).unwrap();
        assert_eq!(r.from, day("2024-01-05"));
        assert_eq!(r.to, day("2024-02-10"));
    }

    #[test]
    fn inverted_explicit_range_is_empty() {
        let range = TimeRange::Explicit {
            from: "2024-02-10".into(),
            to: "2024-02-01".into(),
        };
        assert_eq!(resolve_range(&range, Some("2024-01-01"), Some("2024-03-01")), None);
    }

    #[test]
    fn window_entirely_outside_dataset_collapses_to_boundary() {
        let range = TimeRange::Explicit {
            from: "2025-01-01".into(),
            to: "2025-02-01".into(),
        };
        let r = resolve_range(&range, Some("2024-01-01"), Some("2024-03-01")).unwrap();
        assert_eq!(r.from, day("2024-03-01"));
        assert_eq!(r.to, day("2024-03-01"));
    }
}
