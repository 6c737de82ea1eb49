//! Single-pass aggregation of play events into entities and a time index.
//!
//! # Algorithm Summary
//!
//! 1. Classify each entry and drop what the options exclude
//! 2. Upsert artist, album and track, then apply the play to all three
//! 3. Add the play to the six day/month buckets of the time index
//! 4. After the pass, sort each track's timestamps once
//!
//! There is no incremental path: every change to the raw data goes through
//! [`recompute`] again and replaces the previous [`Snapshot`].

use crate::entry::StreamingEntry;
use crate::index::{PlayIds, TimeIndex};
use crate::library::Library;
use crate::summary::{EntitiesSummary, summarise};

/// Policy knobs for aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Plays shorter than this many milliseconds are dropped.
    pub min_ms_to_count: u64,
    /// Aggregate podcast episodes. Default: off.
    pub include_podcasts: bool,
    /// Aggregate audiobook chapters. Default: off.
    pub include_audiobooks: bool,
}

/// Immutable result of one aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    library: Library,
    time_index: TimeIndex,
    summary: EntitiesSummary,
    skipped: usize,
}

impl Snapshot {
    /// Entity arenas and lookups.
    pub const fn library(&self) -> &Library {
        &self.library
    }

    pub const fn time_index(&self) -> &TimeIndex {
        &self.time_index
    }

    pub const fn summary(&self) -> &EntitiesSummary {
        &self.summary
    }

    /// Entries dropped by classification or the options.
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    /// True when no play was aggregated.
    pub const fn is_empty(&self) -> bool {
        self.time_index.is_empty()
    }
}

/// Accumulates plays during one aggregation pass.
#[derive(Debug, Default)]
struct Aggregator {
    options: AggregateOptions,
    library: Library,
    time_index: TimeIndex,
    skipped: usize,
}

impl Aggregator {
    fn new(options: &AggregateOptions) -> Self {
        Self {
            options: options.clone(),
            ..Self::default()
        }
    }

    fn accepts(&self, entry: &StreamingEntry) -> Option<String> {
        let kind = entry.kind();
        if kind.is_unknown()
            || (kind.is_podcast && !self.options.include_podcasts)
            || (kind.is_audiobook && !self.options.include_audiobooks)
            || entry.ms_played < self.options.min_ms_to_count
        {
            return None;
        }
        Some(entry.content_id(kind))
    }

    fn add(&mut self, entry: &StreamingEntry) {
        let Some(content_id) = self.accepts(entry) else {
            self.skipped += 1;
            return;
        };

        let slots = self.library.apply_play(entry, &content_id);
        let ids = PlayIds {
            artist: self.library.artist_id(slots.artist),
            album: self.library.album_id(slots.album),
            track: self.library.track_id(slots.track),
        };
        self.time_index
            .record(entry.day_key(), entry.month_key(), &ids, entry.ms_played);
    }

    fn finish(mut self) -> Snapshot {
        self.library.finish();
        let summary = summarise(&self.library);
        tracing::debug!(
            artists = summary.total_artists,
            albums = summary.total_albums,
            tracks = summary.unique_tracks_count,
            skipped = self.skipped,
            "aggregated listening history"
        );
        Snapshot {
            library: self.library,
            time_index: self.time_index,
            summary,
            skipped: self.skipped,
        }
    }
}

/// Aggregates batches of validated entries into a fresh snapshot.
///
/// Batch boundaries do not affect the result; only the overall entry order
/// matters (for first-seen tie-breaks).
pub fn recompute<B>(batches: &[B], options: &AggregateOptions) -> Snapshot
where
    B: AsRef<[StreamingEntry]>,
{
    let mut aggregator = Aggregator::new(options);
    for entry in batches.iter().flat_map(AsRef::as_ref) {
        aggregator.add(entry);
    }
    aggregator.finish()
}
