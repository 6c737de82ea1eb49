//! Multi-granularity time index.
//!
//! Six bucket maps, one per entity kind and granularity. Each bucket maps an
//! entity id to the plays and milliseconds recorded for it under that key.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::types::{EntityKind, Granularity};

/// Plays and play time accumulated in one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CountAgg {
    pub ms: u64,
    pub plays: u64,
}

impl CountAgg {
    fn add_play(&mut self, ms: u64) {
        self.ms = self.ms.saturating_add(ms);
        self.plays = self.plays.saturating_add(1);
    }

    /// Adds another aggregate into this one, saturating at `u64::MAX`.
    pub fn absorb(&mut self, other: Self) {
        self.ms = self.ms.saturating_add(other.ms);
        self.plays = self.plays.saturating_add(other.plays);
    }
}

/// Several buckets folded into one range-scoped aggregate.
///
/// `first_key`/`last_key` are the first and last bucket keys (not timestamps)
/// in which the entity was seen inside the queried window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedAgg {
    pub ms: u64,
    pub plays: u64,
    pub first_key: String,
    pub last_key: String,
}

/// Entity id to aggregate, for one bucket key.
pub type Bucket = HashMap<Arc<str>, CountAgg>;

/// Bucket key to bucket, for one entity kind and granularity.
pub type BucketMap = HashMap<String, Bucket>;

/// Time index over every aggregated play.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeIndex {
    pub artists_by_day: BucketMap,
    pub artists_by_month: BucketMap,
    pub albums_by_day: BucketMap,
    pub albums_by_month: BucketMap,
    pub tracks_by_day: BucketMap,
    pub tracks_by_month: BucketMap,
    /// Lexically smallest day key seen.
    pub min_day: Option<String>,
    /// Lexically largest day key seen.
    pub max_day: Option<String>,
}

/// Ids of the three entities touched by one play.
pub(crate) struct PlayIds<'a> {
    pub artist: &'a Arc<str>,
    pub album: &'a Arc<str>,
    pub track: &'a Arc<str>,
}

fn add_to(map: &mut BucketMap, key: &str, id: &Arc<str>, ms: u64) {
    // Keys repeat for nearly every event, so look up before allocating.
    let bucket = match map.get_mut(key) {
        Some(bucket) => bucket,
        None => map.entry(key.to_string()).or_default(),
    };
    match bucket.get_mut(id.as_ref()) {
        Some(agg) => agg.add_play(ms),
        None => {
            bucket.insert(Arc::clone(id), CountAgg { ms, plays: 1 });
        }
    }
}

impl TimeIndex {
    /// Bucket map for one entity kind at one granularity.
    pub const fn buckets(&self, kind: EntityKind, granularity: Granularity) -> &BucketMap {
        match (kind, granularity) {
            (EntityKind::Artist, Granularity::Day) => &self.artists_by_day,
            (EntityKind::Artist, Granularity::Month) => &self.artists_by_month,
            (EntityKind::Album, Granularity::Day) => &self.albums_by_day,
            (EntityKind::Album, Granularity::Month) => &self.albums_by_month,
            (EntityKind::Track, Granularity::Day) => &self.tracks_by_day,
            (EntityKind::Track, Granularity::Month) => &self.tracks_by_month,
        }
    }

    /// True when nothing has been indexed.
    pub const fn is_empty(&self) -> bool {
        self.min_day.is_none()
    }

    /// Records one play in all six bucket maps and extends the day bounds.
    pub(crate) fn record(&mut self, day: &str, month: &str, ids: &PlayIds<'_>, ms: u64) {
        add_to(&mut self.artists_by_day, day, ids.artist, ms);
        add_to(&mut self.artists_by_month, month, ids.artist, ms);
        add_to(&mut self.albums_by_day, day, ids.album, ms);
        add_to(&mut self.albums_by_month, month, ids.album, ms);
        add_to(&mut self.tracks_by_day, day, ids.track, ms);
        add_to(&mut self.tracks_by_month, month, ids.track, ms);

        if self.min_day.as_deref().is_none_or(|min| day < min) {
            self.min_day = Some(day.to_string());
        }
        if self.max_day.as_deref().is_none_or(|max| day > max) {
            self.max_day = Some(day.to_string());
        }
    }

    /// Folds the buckets named by `keys` into one aggregate per entity.
    ///
    /// `keys` must be ascending; keys absent from the index are skipped. The
    /// result holds every entity with at least one play in those buckets.
    pub fn merge(
        &self,
        kind: EntityKind,
        granularity: Granularity,
        keys: &[String],
    ) -> HashMap<Arc<str>, MergedAgg> {
        let source = self.buckets(kind, granularity);
        let mut out: HashMap<Arc<str>, MergedAgg> = HashMap::new();
        for key in keys {
            let Some(bucket) = source.get(key) else {
                continue;
            };
            for (id, agg) in bucket {
                match out.get_mut(id) {
                    Some(merged) => {
                        merged.ms = merged.ms.saturating_add(agg.ms);
                        merged.plays = merged.plays.saturating_add(agg.plays);
                        merged.last_key.clone_from(key);
                    }
                    None => {
                        out.insert(
                            Arc::clone(id),
                            MergedAgg {
                                ms: agg.ms,
                                plays: agg.plays,
                                first_key: key.clone(),
                                last_key: key.clone(),
                            },
                        );
                    }
                }
            }
        }
        out
    }

    /// Sum of every bucket for one entity, at day granularity.
    pub fn lifetime_of(&self, kind: EntityKind, id: &str) -> CountAgg {
        self.buckets(kind, Granularity::Day)
            .values()
            .filter_map(|bucket| bucket.get(id))
            .fold(CountAgg::default(), |mut acc, agg| {
                acc.absorb(*agg);
                acc
            })
    }
}
