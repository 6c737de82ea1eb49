//! Lifetime rankings for artist and album detail views.

use std::cmp::Ordering;

use crate::library::{EnrichedAlbum, EnrichedArtist, EnrichedTrack, Library};

/// Default number of tracks in an artist's popular list.
pub const POPULAR_TRACKS_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrackRanking {
    /// Plays, then play time.
    #[default]
    Popularity,
    /// Play time, then plays.
    PlayTime,
}

fn track_name(track: &EnrichedTrack) -> &str {
    track.track_name.as_deref().unwrap_or("")
}

fn compare_tracks(ranking: TrackRanking, a: &EnrichedTrack, b: &EnrichedTrack) -> Ordering {
    let by_plays = b.plays_count.cmp(&a.plays_count);
    let by_time = b.total_ms.cmp(&a.total_ms);
    let primary = match ranking {
        TrackRanking::Popularity => by_plays.then(by_time),
        TrackRanking::PlayTime => by_time.then(by_plays),
    };
    primary.then_with(|| track_name(a).cmp(track_name(b)))
}

/// Sorts tracks in place; ties end with track name ascending.
pub fn sort_tracks(tracks: &mut [&EnrichedTrack], ranking: TrackRanking) {
    tracks.sort_by(|a, b| compare_tracks(ranking, a, b));
}

/// Sorts albums by plays, then play time, then name.
pub fn sort_albums_by_plays(albums: &mut [&EnrichedAlbum]) {
    albums.sort_by(|a, b| {
        b.plays_count
            .cmp(&a.plays_count)
            .then(b.play_time_ms.cmp(&a.play_time_ms))
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// An artist's most played tracks across all of their albums.
pub fn popular_tracks<'a>(
    library: &'a Library,
    artist: &'a EnrichedArtist,
    limit: usize,
) -> Vec<&'a EnrichedTrack> {
    let mut tracks: Vec<&EnrichedTrack> = library
        .artist_albums(artist)
        .flat_map(|album| library.album_tracks(album))
        .collect();
    sort_tracks(&mut tracks, TrackRanking::Popularity);
    tracks.truncate(limit);
    tracks
}
