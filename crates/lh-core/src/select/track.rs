use std::borrow::Cow;
use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use super::{RangeStats, View, normalize_sort_key, number_desc, unknown_sort_key};
use crate::library::{Library, TrackMeta};
use crate::types::{EntityKind, ParseError};

/// Sort keys for track rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackSort {
    RangePlays,
    #[default]
    RangeMs,
    LifetimeMs,
    LifetimePlays,
    Name,
}

impl FromStr for TrackSort {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_sort_key(s).as_str() {
            "rangeplays" => Ok(Self::RangePlays),
            "rangems" | "rangetime" => Ok(Self::RangeMs),
            "lifetimems" | "lifetimetime" => Ok(Self::LifetimeMs),
            "lifetimeplays" => Ok(Self::LifetimePlays),
            "name" => Ok(Self::Name),
            _ => Err(unknown_sort_key(EntityKind::Track, s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackLifetime {
    pub plays: u64,
    pub ms: u64,
    pub first_ts: Option<String>,
    pub last_ts: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackRow {
    pub id: Arc<str>,
    pub name: Option<String>,
    pub artist_name: Option<String>,
    pub album_name: Option<String>,
    pub lifetime: TrackLifetime,
    pub range: RangeStats,
    pub meta: TrackMeta,
}

/// Track schema: keyed by content id, searched on "track artist album".
#[derive(Debug, Clone, Copy)]
pub struct TrackView;

fn text(value: Option<&String>) -> &str {
    value.map_or("", String::as_str)
}

/// Compares `artist::album::track`, with missing parts as empty strings.
fn name_key(a: &TrackRow, b: &TrackRow) -> Ordering {
    text(a.artist_name.as_ref())
        .cmp(text(b.artist_name.as_ref()))
        .then_with(|| text(a.album_name.as_ref()).cmp(text(b.album_name.as_ref())))
        .then_with(|| text(a.name.as_ref()).cmp(text(b.name.as_ref())))
}

impl View for TrackView {
    type Row = TrackRow;
    type SortKey = TrackSort;
    const KIND: EntityKind = EntityKind::Track;

    fn project(library: &Library, id: &Arc<str>, range: RangeStats) -> Option<TrackRow> {
        let track = library.track(id)?;
        Some(TrackRow {
            id: Arc::clone(id),
            name: track.track_name.clone(),
            artist_name: track.artist_name.clone(),
            album_name: track.album_name.clone(),
            lifetime: TrackLifetime {
                plays: track.plays_count,
                ms: track.total_ms,
                first_ts: track.seen.first_ts.clone(),
                last_ts: track.seen.last_ts.clone(),
            },
            range,
            meta: track.meta.clone(),
        })
    }

    fn search_text(row: &TrackRow) -> Cow<'_, str> {
        Cow::Owned(format!(
            "{} {} {}",
            text(row.name.as_ref()),
            text(row.artist_name.as_ref()),
            text(row.album_name.as_ref())
        ))
    }

    fn compare(key: TrackSort, a: &TrackRow, b: &TrackRow) -> Ordering {
        match key {
            TrackSort::RangeMs => number_desc(a.range.ms, b.range.ms),
            TrackSort::RangePlays => number_desc(a.range.plays, b.range.plays),
            TrackSort::LifetimeMs => number_desc(a.lifetime.ms, b.lifetime.ms),
            TrackSort::LifetimePlays => number_desc(a.lifetime.plays, b.lifetime.plays),
            TrackSort::Name => name_key(a, b),
        }
    }

    // Distinct URIs can share all three names; the id keeps the order total.
    fn tie_break(a: &TrackRow, b: &TrackRow) -> Ordering {
        name_key(a, b).then_with(|| a.id.cmp(&b.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Granularity;

    fn row(id: &str, name: Option<&str>, artist: &str, plays: u64) -> TrackRow {
        TrackRow {
            id: Arc::from(id),
            name: name.map(String::from),
            artist_name: Some(artist.into()),
            album_name: None,
            lifetime: TrackLifetime {
                plays,
                ms: 0,
                first_ts: None,
                last_ts: None,
            },
            range: RangeStats {
                ms: 0,
                plays,
                first_key: String::new(),
                last_key: String::new(),
                granularity: Granularity::Day,
            },
            meta: TrackMeta::default(),
        }
    }

    #[test]
    fn missing_names_sort_as_empty() {
        let named = row("a", Some("Song"), "A", 1);
        let unnamed = row("b", None, "A", 1);
        assert_eq!(TrackView::tie_break(&unnamed, &named), Ordering::Less);
    }

    #[test]
    fn identical_names_fall_back_to_id() {
        let first = row("spotify:track:1", Some("Song"), "A", 1);
        let second = row("spotify:track:2", Some("Song"), "A", 1);
        assert_eq!(TrackView::tie_break(&first, &second), Ordering::Less);
    }

    #[test]
    fn search_text_skips_missing_parts() {
        let unnamed = row("b", None, "Artist", 1);
        assert_eq!(TrackView::search_text(&unnamed), " Artist ");
    }
}
