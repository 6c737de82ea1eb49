//! Range-scoped queries over the aggregated library.
//!
//! A query resolves its time window, folds the index buckets inside it into
//! one aggregate per entity, joins those with lifetime entity data, filters by
//! search text and sorts. Each entity kind plugs in through [`View`].

mod album;
mod artist;
mod track;

use std::borrow::Cow;
use std::cmp::Ordering;
use std::sync::Arc;

use serde::Serialize;

use crate::aggregate::Snapshot;
use crate::index::MergedAgg;
use crate::library::Library;
use crate::range::{TimeRange, resolve_range};
use crate::types::{EntityKind, Granularity, ParseError, SortOrder};

pub use album::{AlbumLifetime, AlbumRow, AlbumSort, AlbumView};
pub use artist::{ArtistLifetime, ArtistRow, ArtistSort, ArtistView};
pub use track::{TrackLifetime, TrackRow, TrackSort, TrackView};

/// Stats of one entity inside the queried window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeStats {
    pub ms: u64,
    pub plays: u64,
    /// First bucket key with activity inside the window.
    pub first_key: String,
    /// Last bucket key with activity inside the window.
    pub last_key: String,
    pub granularity: Granularity,
}

impl RangeStats {
    fn new(agg: MergedAgg, granularity: Granularity) -> Self {
        Self {
            ms: agg.ms,
            plays: agg.plays,
            first_key: agg.first_key,
            last_key: agg.last_key,
            granularity,
        }
    }
}

/// Filters and ordering for one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectQuery<K> {
    /// Case-insensitive substring filter; blank matches everything.
    pub search: String,
    pub range: TimeRange,
    pub sort: K,
    pub order: SortOrder,
}

/// Per-entity-kind schema for [`select`].
pub trait View {
    /// Display row produced for each entity.
    type Row;

    /// Named primary sort keys.
    type SortKey: Copy;

    /// Which index buckets to read.
    const KIND: EntityKind;

    /// Joins a merged aggregate with entity data. `None` drops the row.
    fn project(library: &Library, id: &Arc<str>, range: RangeStats) -> Option<Self::Row>;

    /// Text the search filter matches against.
    fn search_text(row: &Self::Row) -> Cow<'_, str>;

    /// Primary comparator for `key`, in its natural direction.
    fn compare(key: Self::SortKey, a: &Self::Row, b: &Self::Row) -> Ordering;

    /// Deterministic secondary key applied after every primary comparator.
    fn tie_break(a: &Self::Row, b: &Self::Row) -> Ordering;
}

/// Numeric comparator, largest first.
pub(crate) fn number_desc(a: u64, b: u64) -> Ordering {
    b.cmp(&a)
}

/// Normalizes sort-key text so `range-plays`, `range_plays` and `rangePlays` match.
pub(crate) fn normalize_sort_key(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

pub(crate) fn unknown_sort_key(kind: EntityKind, value: &str) -> ParseError {
    ParseError::UnknownSortKey {
        kind,
        value: value.to_string(),
    }
}

/// Orders rows by the primary comparator then the tie-break.
///
/// `order` flips the whole chain, tie-break included.
pub fn sort_rows<V: View>(rows: &mut [V::Row], key: V::SortKey, order: SortOrder) {
    rows.sort_by(|a, b| {
        let ord = V::compare(key, a, b).then_with(|| V::tie_break(a, b));
        match order {
            SortOrder::Desc => ord,
            SortOrder::Asc => ord.reverse(),
        }
    });
}

/// Runs a query for one entity kind.
///
/// Pure over the snapshot: nothing is mutated, so repeated calls with
/// different queries are independent.
pub fn select<V: View>(snapshot: &Snapshot, query: &SelectQuery<V::SortKey>) -> Vec<V::Row> {
    let index = snapshot.time_index();
    let Some(range) = resolve_range(
        &query.range,
        index.min_day.as_deref(),
        index.max_day.as_deref(),
    ) else {
        return Vec::new();
    };

    let granularity = range.granularity();
    let keys = range.keys(granularity);
    let merged = index.merge(V::KIND, granularity, &keys);

    let needle = query.search.trim().to_lowercase();
    let mut rows: Vec<V::Row> = merged
        .into_iter()
        .filter_map(|(id, agg)| V::project(snapshot.library(), &id, RangeStats::new(agg, granularity)))
        .filter(|row| needle.is_empty() || V::search_text(row).to_lowercase().contains(&needle))
        .collect();

    sort_rows::<V>(&mut rows, query.sort, query.order);
    rows
}

/// Artist rows for a query.
pub fn select_artists(snapshot: &Snapshot, query: &SelectQuery<ArtistSort>) -> Vec<ArtistRow> {
    select::<ArtistView>(snapshot, query)
}

/// Album rows for a query.
pub fn select_albums(snapshot: &Snapshot, query: &SelectQuery<AlbumSort>) -> Vec<AlbumRow> {
    select::<AlbumView>(snapshot, query)
}

/// Track rows for a query.
pub fn select_tracks(snapshot: &Snapshot, query: &SelectQuery<TrackSort>) -> Vec<TrackRow> {
    select::<TrackView>(snapshot, query)
}
