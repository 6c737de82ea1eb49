//! Library-wide totals and single winners per entity kind.

use std::sync::Arc;

use serde::Serialize;

use crate::library::Library;

/// Ids of the top entity for each (kind, metric) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TopEntities {
    pub artist_by_plays: Option<Arc<str>>,
    pub artist_by_time: Option<Arc<str>>,
    pub album_by_plays: Option<Arc<str>>,
    pub album_by_time: Option<Arc<str>>,
    pub track_by_plays: Option<Arc<str>>,
    pub track_by_time: Option<Arc<str>>,
}

/// Totals across the library plus the winners.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntitiesSummary {
    pub top: TopEntities,
    pub total_artists: u64,
    pub total_albums: u64,
    pub total_played_time_ms: u64,
    pub unique_tracks_count: u64,
}

/// Running maximum. Strict `>` keeps the first-seen item on ties.
struct Leader<'a> {
    id: Option<&'a Arc<str>>,
    value: u64,
}

impl<'a> Leader<'a> {
    const fn new() -> Self {
        Self { id: None, value: 0 }
    }

    fn offer(&mut self, id: &'a Arc<str>, value: u64) {
        if self.id.is_none() || value > self.value {
            self.id = Some(id);
            self.value = value;
        }
    }

    fn into_id(self) -> Option<Arc<str>> {
        self.id.cloned()
    }
}

/// One pass over artists (with nested albums) and one over tracks.
pub fn summarise(library: &Library) -> EntitiesSummary {
    let mut artist_by_plays = Leader::new();
    let mut artist_by_time = Leader::new();
    let mut album_by_plays = Leader::new();
    let mut album_by_time = Leader::new();
    let mut track_by_plays = Leader::new();
    let mut track_by_time = Leader::new();
    let mut total_albums = 0;
    let mut total_played_time_ms: u64 = 0;

    for artist in library.artists() {
        artist_by_plays.offer(&artist.name, artist.plays_count);
        artist_by_time.offer(&artist.name, artist.play_time_ms);

        for album in library.artist_albums(artist) {
            total_albums += 1;
            album_by_plays.offer(&album.id, album.plays_count);
            album_by_time.offer(&album.id, album.play_time_ms);
        }
    }

    for track in library.tracks() {
        track_by_plays.offer(&track.id, track.plays_count);
        track_by_time.offer(&track.id, track.total_ms);
        total_played_time_ms = total_played_time_ms.saturating_add(track.total_ms);
    }

    EntitiesSummary {
        top: TopEntities {
            artist_by_plays: artist_by_plays.into_id(),
            artist_by_time: artist_by_time.into_id(),
            album_by_plays: album_by_plays.into_id(),
            album_by_time: album_by_time.into_id(),
            track_by_plays: track_by_plays.into_id(),
            track_by_time: track_by_time.into_id(),
        },
        total_artists: library.artist_count() as u64,
        total_albums,
        total_played_time_ms,
        unique_tracks_count: library.track_count() as u64,
    }
}
