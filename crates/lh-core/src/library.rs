//! Artist, album and track entities.
//!
//! Entities live in three arenas owned by [`Library`]. An artist lists its
//! albums, an album lists its tracks, and every entity is also reachable by id
//! through a flat lookup. Each track exists once and belongs to exactly one
//! album, which belongs to exactly one artist.
//!
//! Iteration follows first-seen order, so "first wins" tie-breaks downstream
//! are deterministic for a given input order.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;

use crate::entry::{StreamingEntry, album_key};

/// Categorical tallies collected per track.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrackMeta {
    pub platforms: BTreeMap<String, u64>,
    pub countries: BTreeMap<String, u64>,
    pub reason_start: BTreeMap<String, u64>,
    pub reason_end: BTreeMap<String, u64>,
    pub shuffle_true: u64,
    pub skipped_true: u64,
    pub offline_true: u64,
    pub incognito_true: u64,
}

fn tally(map: &mut BTreeMap<String, u64>, value: Option<&String>) {
    let key = value.map_or("", String::as_str);
    match map.get_mut(key) {
        Some(count) => *count += 1,
        None => {
            map.insert(key.to_string(), 1);
        }
    }
}

impl TrackMeta {
    fn record(&mut self, entry: &StreamingEntry) {
        tally(&mut self.platforms, entry.platform.as_ref());
        tally(&mut self.countries, entry.conn_country.as_ref());
        tally(&mut self.reason_start, entry.reason_start.as_ref());
        tally(&mut self.reason_end, entry.reason_end.as_ref());
        self.shuffle_true += u64::from(entry.shuffle);
        self.skipped_true += u64::from(entry.skipped);
        self.offline_true += u64::from(entry.offline);
        self.incognito_true += u64::from(entry.incognito_mode);
    }
}

/// First and last time an entity was played.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeenRange {
    pub first_ts: Option<String>,
    pub last_ts: Option<String>,
}

impl SeenRange {
    /// Extends the range with a normalized timestamp (lexical comparison).
    fn extend(&mut self, ts: &str) {
        if self.first_ts.as_deref().is_none_or(|first| ts < first) {
            self.first_ts = Some(ts.to_string());
        }
        if self.last_ts.as_deref().is_none_or(|last| ts > last) {
            self.last_ts = Some(ts.to_string());
        }
    }
}

/// A track (or episode/chapter, when those are included).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedTrack {
    pub id: Arc<str>,
    pub track_name: Option<String>,
    pub artist_name: Option<String>,
    pub album_name: Option<String>,
    pub plays_count: u64,
    pub total_ms: u64,
    /// Every play timestamp, ascending once aggregation finishes.
    pub timestamps: Vec<String>,
    #[serde(flatten)]
    pub seen: SeenRange,
    pub meta: TrackMeta,
    #[serde(skip)]
    album: usize,
}

impl EnrichedTrack {
    fn new(id: Arc<str>, entry: &StreamingEntry, album: usize) -> Self {
        Self {
            id,
            track_name: entry.master_metadata_track_name.clone(),
            artist_name: entry.master_metadata_album_artist_name.clone(),
            album_name: entry.master_metadata_album_album_name.clone(),
            plays_count: 0,
            total_ms: 0,
            timestamps: Vec::new(),
            seen: SeenRange::default(),
            meta: TrackMeta::default(),
            album,
        }
    }

    fn apply(&mut self, entry: &StreamingEntry) {
        self.plays_count = self.plays_count.saturating_add(1);
        self.total_ms = self.total_ms.saturating_add(entry.ms_played);
        self.timestamps.push(entry.ts.clone());
        self.seen.extend(&entry.ts);
        self.meta.record(entry);
    }
}

/// An album, identified by `artist::album`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedAlbum {
    pub id: Arc<str>,
    pub name: String,
    pub artist_name: Arc<str>,
    pub unique_tracks_count: u64,
    pub plays_count: u64,
    pub play_time_ms: u64,
    #[serde(flatten)]
    pub seen: SeenRange,
    #[serde(skip)]
    tracks: Vec<usize>,
}

impl EnrichedAlbum {
    fn apply(&mut self, entry: &StreamingEntry) {
        self.plays_count = self.plays_count.saturating_add(1);
        self.play_time_ms = self.play_time_ms.saturating_add(entry.ms_played);
        self.seen.extend(&entry.ts);
    }
}

/// An artist, identified by its exact name.
///
/// Names are case-sensitive and never merged: "Beatles" and "The Beatles" are
/// two artists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedArtist {
    pub name: Arc<str>,
    pub unique_albums_count: u64,
    pub unique_tracks_count: u64,
    pub plays_count: u64,
    pub play_time_ms: u64,
    #[serde(flatten)]
    pub seen: SeenRange,
    #[serde(skip)]
    albums: Vec<usize>,
    /// Album name to arena slot.
    #[serde(skip)]
    album_names: HashMap<String, usize>,
}

impl EnrichedArtist {
    fn apply(&mut self, entry: &StreamingEntry) {
        self.plays_count = self.plays_count.saturating_add(1);
        self.play_time_ms = self.play_time_ms.saturating_add(entry.ms_played);
        self.seen.extend(&entry.ts);
    }
}

/// Arena slots touched by one play.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Slots {
    pub artist: usize,
    pub album: usize,
    pub track: usize,
}

/// Owner of every aggregated entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Library {
    artists: Vec<EnrichedArtist>,
    artist_ids: HashMap<Arc<str>, usize>,
    albums: Vec<EnrichedAlbum>,
    album_ids: HashMap<Arc<str>, usize>,
    tracks: Vec<EnrichedTrack>,
    track_ids: HashMap<Arc<str>, usize>,
}

impl Library {
    /// Artists in first-seen order.
    pub fn artists(&self) -> impl Iterator<Item = &EnrichedArtist> {
        self.artists.iter()
    }

    /// Albums of every artist, flat, in first-seen order.
    pub fn albums(&self) -> impl Iterator<Item = &EnrichedAlbum> {
        self.albums.iter()
    }

    /// Tracks in first-seen order.
    pub fn tracks(&self) -> impl Iterator<Item = &EnrichedTrack> {
        self.tracks.iter()
    }

    pub fn artist(&self, name: &str) -> Option<&EnrichedArtist> {
        self.artist_ids.get(name).map(|&i| &self.artists[i])
    }

    /// Looks up an album by id (`artist::album`).
    pub fn album(&self, id: &str) -> Option<&EnrichedAlbum> {
        self.album_ids.get(id).map(|&i| &self.albums[i])
    }

    /// Looks up an album by artist and album name.
    pub fn album_of(&self, artist: &EnrichedArtist, album_name: &str) -> Option<&EnrichedAlbum> {
        artist.album_names.get(album_name).map(|&i| &self.albums[i])
    }

    pub fn track(&self, id: &str) -> Option<&EnrichedTrack> {
        self.track_ids.get(id).map(|&i| &self.tracks[i])
    }

    /// Albums owned by `artist`, in first-seen order.
    pub fn artist_albums<'a>(
        &'a self,
        artist: &'a EnrichedArtist,
    ) -> impl Iterator<Item = &'a EnrichedAlbum> {
        artist.albums.iter().map(|&i| &self.albums[i])
    }

    /// Tracks owned by `album`, in first-seen order.
    pub fn album_tracks<'a>(
        &'a self,
        album: &'a EnrichedAlbum,
    ) -> impl Iterator<Item = &'a EnrichedTrack> {
        album.tracks.iter().map(|&i| &self.tracks[i])
    }

    /// Album a track belongs to.
    pub fn track_album(&self, track: &EnrichedTrack) -> &EnrichedAlbum {
        &self.albums[track.album]
    }

    pub fn artist_count(&self) -> usize {
        self.artists.len()
    }

    pub fn album_count(&self) -> usize {
        self.albums.len()
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Creates the artist if absent.
    fn upsert_artist(&mut self, name: &str) -> usize {
        if let Some(&slot) = self.artist_ids.get(name) {
            return slot;
        }
        let name: Arc<str> = Arc::from(name);
        let slot = self.artists.len();
        self.artists.push(EnrichedArtist {
            name: Arc::clone(&name),
            unique_albums_count: 0,
            unique_tracks_count: 0,
            plays_count: 0,
            play_time_ms: 0,
            seen: SeenRange::default(),
            albums: Vec::new(),
            album_names: HashMap::new(),
        });
        self.artist_ids.insert(name, slot);
        slot
    }

    /// Creates the album under `artist` if absent, counting it once.
    fn upsert_album(&mut self, artist: usize, album_name: &str) -> usize {
        if let Some(&slot) = self.artists[artist].album_names.get(album_name) {
            return slot;
        }
        let owner = &mut self.artists[artist];
        let id: Arc<str> = Arc::from(album_key(&owner.name, album_name));
        let slot = self.albums.len();
        owner.albums.push(slot);
        owner.album_names.insert(album_name.to_string(), slot);
        owner.unique_albums_count += 1;
        self.albums.push(EnrichedAlbum {
            id: Arc::clone(&id),
            name: album_name.to_string(),
            artist_name: Arc::clone(&owner.name),
            unique_tracks_count: 0,
            plays_count: 0,
            play_time_ms: 0,
            seen: SeenRange::default(),
            tracks: Vec::new(),
        });
        self.album_ids.insert(id, slot);
        slot
    }

    /// Creates the track if absent and attaches it to the album of this play.
    ///
    /// An existing track keeps its original album even if later plays carry
    /// different album metadata.
    fn upsert_track(&mut self, artist: usize, album: usize, id: &str, entry: &StreamingEntry) -> usize {
        if let Some(&slot) = self.track_ids.get(id) {
            return slot;
        }
        let id: Arc<str> = Arc::from(id);
        let slot = self.tracks.len();
        self.tracks.push(EnrichedTrack::new(Arc::clone(&id), entry, album));
        self.track_ids.insert(id, slot);

        let owner = &mut self.albums[album];
        owner.tracks.push(slot);
        owner.unique_tracks_count += 1;
        self.artists[artist].unique_tracks_count += 1;
        slot
    }

    /// Upserts artist, album and track for a play and applies it to all three.
    pub(crate) fn apply_play(&mut self, entry: &StreamingEntry, content_id: &str) -> Slots {
        let artist = self.upsert_artist(entry.artist_name());
        let album = self.upsert_album(artist, entry.album_name());
        let track = self.upsert_track(artist, album, content_id, entry);

        self.tracks[track].apply(entry);
        self.albums[album].apply(entry);
        self.artists[artist].apply(entry);
        Slots {
            artist,
            album,
            track,
        }
    }

    pub(crate) fn artist_id(&self, slot: usize) -> &Arc<str> {
        &self.artists[slot].name
    }

    pub(crate) fn album_id(&self, slot: usize) -> &Arc<str> {
        &self.albums[slot].id
    }

    pub(crate) fn track_id(&self, slot: usize) -> &Arc<str> {
        &self.tracks[slot].id
    }

    /// Sorts every track's timestamps once, after the pass.
    pub(crate) fn finish(&mut self) {
        for track in &mut self.tracks {
            track.timestamps.sort_unstable();
        }
    }
}
