use std::borrow::Cow;
use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use super::{RangeStats, View, normalize_sort_key, number_desc, unknown_sort_key};
use crate::library::Library;
use crate::types::{EntityKind, ParseError};

/// Sort keys for artist rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ArtistSort {
    RangePlays,
    #[default]
    RangeMs,
    LifetimeMs,
    Name,
}

impl FromStr for ArtistSort {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_sort_key(s).as_str() {
            "rangeplays" => Ok(Self::RangePlays),
            "rangems" | "rangetime" => Ok(Self::RangeMs),
            "lifetimems" | "lifetimetime" => Ok(Self::LifetimeMs),
            "name" => Ok(Self::Name),
            _ => Err(unknown_sort_key(EntityKind::Artist, s)),
        }
    }
}

/// All-time artist figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistLifetime {
    pub unique_tracks: u64,
    pub unique_albums: u64,
    pub plays: u64,
    pub ms: u64,
    pub first_ts: Option<String>,
    pub last_ts: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistRow {
    pub id: Arc<str>,
    pub name: Arc<str>,
    pub lifetime: ArtistLifetime,
    pub range: RangeStats,
}

/// Artist schema: keyed by artist name.
#[derive(Debug, Clone, Copy)]
pub struct ArtistView;

impl View for ArtistView {
    type Row = ArtistRow;
    type SortKey = ArtistSort;
    const KIND: EntityKind = EntityKind::Artist;

    fn project(library: &Library, id: &Arc<str>, range: RangeStats) -> Option<ArtistRow> {
        let artist = library.artist(id)?;
        Some(ArtistRow {
            id: Arc::clone(id),
            name: Arc::clone(&artist.name),
            lifetime: ArtistLifetime {
                unique_tracks: artist.unique_tracks_count,
                unique_albums: artist.unique_albums_count,
                plays: artist.plays_count,
                ms: artist.play_time_ms,
                first_ts: artist.seen.first_ts.clone(),
                last_ts: artist.seen.last_ts.clone(),
            },
            range,
        })
    }

    fn search_text(row: &ArtistRow) -> Cow<'_, str> {
        Cow::Borrowed(&row.name)
    }

    fn compare(key: ArtistSort, a: &ArtistRow, b: &ArtistRow) -> Ordering {
        match key {
            ArtistSort::RangeMs => number_desc(a.range.ms, b.range.ms),
            ArtistSort::RangePlays => number_desc(a.range.plays, b.range.plays),
            ArtistSort::LifetimeMs => number_desc(a.lifetime.ms, b.lifetime.ms),
            ArtistSort::Name => Self::tie_break(a, b),
        }
    }

    fn tie_break(a: &ArtistRow, b: &ArtistRow) -> Ordering {
        a.name.cmp(&b.name)
    }
}
