use std::borrow::Cow;
use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use super::{RangeStats, View, normalize_sort_key, number_desc, unknown_sort_key};
use crate::library::Library;
use crate::types::{EntityKind, ParseError};

/// Sort keys for album rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AlbumSort {
    RangePlays,
    #[default]
    RangeMs,
    LifetimeMs,
    LifetimeTracks,
    Name,
}

impl FromStr for AlbumSort {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_sort_key(s).as_str() {
            "rangeplays" => Ok(Self::RangePlays),
            "rangems" | "rangetime" => Ok(Self::RangeMs),
            "lifetimems" | "lifetimetime" => Ok(Self::LifetimeMs),
            "lifetimetracks" | "tracks" => Ok(Self::LifetimeTracks),
            "name" => Ok(Self::Name),
            _ => Err(unknown_sort_key(EntityKind::Album, s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumLifetime {
    pub unique_tracks: u64,
    pub plays: u64,
    pub ms: u64,
    pub first_ts: Option<String>,
    pub last_ts: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumRow {
    pub id: Arc<str>,
    pub name: String,
    pub artist_name: Arc<str>,
    pub lifetime: AlbumLifetime,
    pub range: RangeStats,
}

/// Album schema: keyed by `artist::album`, searched on "artist album".
#[derive(Debug, Clone, Copy)]
pub struct AlbumView;

fn name_key(a: &AlbumRow, b: &AlbumRow) -> Ordering {
    a.artist_name
        .cmp(&b.artist_name)
        .then_with(|| a.name.cmp(&b.name))
}

impl View for AlbumView {
    type Row = AlbumRow;
    type SortKey = AlbumSort;
    const KIND: EntityKind = EntityKind::Album;

    fn project(library: &Library, id: &Arc<str>, range: RangeStats) -> Option<AlbumRow> {
        let album = library.album(id)?;
        Some(AlbumRow {
            id: Arc::clone(id),
            name: album.name.clone(),
            artist_name: Arc::clone(&album.artist_name),
            lifetime: AlbumLifetime {
                unique_tracks: album.unique_tracks_count,
                plays: album.plays_count,
                ms: album.play_time_ms,
                first_ts: album.seen.first_ts.clone(),
                last_ts: album.seen.last_ts.clone(),
            },
            range,
        })
    }

    fn search_text(row: &AlbumRow) -> Cow<'_, str> {
        Cow::Owned(format!("{} {}", row.artist_name, row.name))
    }

    fn compare(key: AlbumSort, a: &AlbumRow, b: &AlbumRow) -> Ordering {
        match key {
            AlbumSort::RangeMs => number_desc(a.range.ms, b.range.ms),
            AlbumSort::RangePlays => number_desc(a.range.plays, b.range.plays),
            AlbumSort::LifetimeMs => number_desc(a.lifetime.ms, b.lifetime.ms),
            AlbumSort::LifetimeTracks => {
                number_desc(a.lifetime.unique_tracks, b.lifetime.unique_tracks)
            }
            AlbumSort::Name => name_key(a, b),
        }
    }

    // The album id is `artist::album`, so ties fall back to the id itself.
    fn tie_break(a: &AlbumRow, b: &AlbumRow) -> Ordering {
        name_key(a, b).then_with(|| a.id.cmp(&b.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_album_only_keys() {
        assert_eq!(
            "lifetime-tracks".parse::<AlbumSort>().unwrap(),
            AlbumSort::LifetimeTracks
        );
        assert_eq!(
            "lifetimeTracks".parse::<AlbumSort>().unwrap(),
            AlbumSort::LifetimeTracks
        );
        assert!("lifetime-plays".parse::<AlbumSort>().is_err());
    }
}
