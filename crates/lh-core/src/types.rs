//! Shared enums and parse errors used across the engine.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when parsing user-facing selector text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The time-range selector was not recognised.
    #[error("invalid time range: {value} (expected 1M, 3M, 6M, 1Y, All or FROM..TO)")]
    InvalidTimeRange { value: String },

    /// A day key was not a valid `YYYY-MM-DD` date.
    #[error("invalid day: {value} (expected YYYY-MM-DD)")]
    InvalidDay { value: String },

    /// The sort key is not known for this entity kind.
    #[error("unknown sort key for {kind}: {value}")]
    UnknownSortKey { kind: EntityKind, value: String },

    /// The entity kind was not recognised.
    #[error("unknown entity kind: {value}")]
    UnknownEntityKind { value: String },

    /// The sort order was not `asc` or `desc`.
    #[error("invalid sort order: {value}")]
    InvalidSortOrder { value: String },

    /// The chart metric was not recognised.
    #[error("unknown metric: {value}")]
    UnknownMetric { value: String },

    /// The weekday name was not recognised.
    #[error("invalid week start: {value}")]
    InvalidWeekStart { value: String },
}

/// The three entity levels of the aggregated tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Artist,
    Album,
    Track,
}

impl EntityKind {
    /// Singular lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::Album => "album",
            Self::Track => "track",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = ParseError;

    /// Accepts singular and plural names (`artist`, `artists`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "artist" | "artists" => Ok(Self::Artist),
            "album" | "albums" => Ok(Self::Album),
            "track" | "tracks" => Ok(Self::Track),
            _ => Err(ParseError::UnknownEntityKind {
                value: s.to_string(),
            }),
        }
    }
}

/// Time-bucketing resolution of the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Month,
}

impl Granularity {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Month => "month",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction applied to a whole comparator chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SortOrder {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(ParseError::InvalidSortOrder {
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_kind_accepts_plural_names() {
        assert_eq!("artists".parse::<EntityKind>().unwrap(), EntityKind::Artist);
        assert_eq!("Album".parse::<EntityKind>().unwrap(), EntityKind::Album);
        assert_eq!("track".parse::<EntityKind>().unwrap(), EntityKind::Track);
        assert!("playlist".parse::<EntityKind>().is_err());
    }

    #[test]
    fn entity_kind_serde_is_lowercase() {
        let json = serde_json::to_string(&EntityKind::Album).unwrap();
        assert_eq!(json, "\"album\"");
    }

    #[test]
    fn sort_order_defaults_to_desc() {
        assert_eq!(SortOrder::default(), SortOrder::Desc);
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert!("up".parse::<SortOrder>().is_err());
    }

    #[test]
    fn granularity_display() {
        assert_eq!(Granularity::Day.to_string(), "day");
        assert_eq!(Granularity::Month.to_string(), "month");
    }
}
