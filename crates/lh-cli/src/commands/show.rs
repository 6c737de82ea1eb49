//! Detail views for a single artist or album.

use std::io::Write;

use anyhow::{Result, anyhow};
use chrono::Weekday;
use lh_core::library::SeenRange;
use lh_core::peaks::{Window, busiest_windows};
use lh_core::rankings::{
    POPULAR_TRACKS_LIMIT, TrackRanking, popular_tracks, sort_albums_by_plays, sort_tracks,
};
use lh_core::{EnrichedTrack, EntityKind, Snapshot};

use super::util::{format_entity_duration, plays, write_columns};

fn write_seen<W: Write>(writer: &mut W, seen: &SeenRange) -> Result<()> {
    if let Some(first) = &seen.first_ts {
        writeln!(writer, "First played: {first}")?;
    }
    if let Some(last) = &seen.last_ts {
        writeln!(writer, "Last played: {last}")?;
    }
    Ok(())
}

fn write_tracks<W: Write>(writer: &mut W, tracks: &[&EnrichedTrack]) -> Result<()> {
    let lines: Vec<Vec<String>> = tracks
        .iter()
        .enumerate()
        .map(|(i, track)| {
            vec![
                format!("{:>3}.", i + 1),
                track
                    .track_name
                    .clone()
                    .unwrap_or_else(|| track.id.to_string()),
                plays(track.plays_count),
                format_entity_duration(track.total_ms),
            ]
        })
        .collect();
    write_columns(writer, "", &lines)
}

fn busiest_line(window: Option<&Window>) -> String {
    window.map_or_else(
        || "-".to_string(),
        |w| format!("{} ({})", w.label(), plays(w.plays)),
    )
}

/// Artist totals, albums by plays and the most played tracks.
pub fn artist<W: Write>(writer: &mut W, snapshot: &Snapshot, name: &str) -> Result<()> {
    let library = snapshot.library();
    let artist = library
        .artist(name)
        .ok_or_else(|| anyhow!("artist not found: {name}"))?;

    writeln!(writer, "{}", artist.name)?;
    writeln!(
        writer,
        "Plays: {} ({})",
        artist.plays_count,
        format_entity_duration(artist.play_time_ms)
    )?;
    writeln!(
        writer,
        "Albums: {}, tracks: {}",
        artist.unique_albums_count, artist.unique_tracks_count
    )?;
    write_seen(writer, &artist.seen)?;

    let mut albums: Vec<_> = library.artist_albums(artist).collect();
    sort_albums_by_plays(&mut albums);
    writeln!(writer)?;
    writeln!(writer, "Albums:")?;
    let lines: Vec<Vec<String>> = albums
        .iter()
        .map(|album| {
            vec![
                album.name.clone(),
                plays(album.plays_count),
                format_entity_duration(album.play_time_ms),
            ]
        })
        .collect();
    write_columns(writer, "  ", &lines)?;

    writeln!(writer)?;
    writeln!(writer, "Popular tracks:")?;
    write_tracks(writer, &popular_tracks(library, artist, POPULAR_TRACKS_LIMIT))
}

/// Album totals, busiest month and week, tracks by play time.
pub fn album<W: Write>(
    writer: &mut W,
    snapshot: &Snapshot,
    artist_name: &str,
    album_name: &str,
    week_start: Weekday,
) -> Result<()> {
    let library = snapshot.library();
    let album = library
        .artist(artist_name)
        .and_then(|artist| library.album_of(artist, album_name))
        .ok_or_else(|| anyhow!("album not found: {album_name} by {artist_name}"))?;

    writeln!(writer, "{} - {}", album.name, album.artist_name)?;
    writeln!(
        writer,
        "Plays: {} ({})",
        album.plays_count,
        format_entity_duration(album.play_time_ms)
    )?;
    writeln!(writer, "Tracks: {}", album.unique_tracks_count)?;
    write_seen(writer, &album.seen)?;

    let busiest = busiest_windows(
        snapshot.time_index(),
        EntityKind::Album,
        &album.id,
        week_start,
    );
    writeln!(writer, "Busiest month: {}", busiest_line(busiest.month.as_ref()))?;
    writeln!(writer, "Busiest week: {}", busiest_line(busiest.week.as_ref()))?;

    let mut tracks: Vec<_> = library.album_tracks(album).collect();
    sort_tracks(&mut tracks, TrackRanking::PlayTime);
    writeln!(writer)?;
    writeln!(writer, "Tracks:")?;
    write_tracks(writer, &tracks)
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    use crate::commands::fixtures;

    #[test]
    fn artist_details() {
        let snapshot = fixtures::snapshot();
        let output = fixtures::render(|w| artist(w, &snapshot, "Radiohead"));
        assert_snapshot!(output, @r"
Radiohead
Plays: 3 (12:20)
Albums: 1, tracks: 2
First played: 2024-01-01T10:00:00Z
Last played: 2024-01-02T11:00:00Z

Albums:
  OK Computer  3 plays  12:20

Popular tracks:
  1.  Airbag            2 plays  06:00
  2.  Paranoid Android  1 play   06:20
");
    }

    #[test]
    fn album_details() {
        let snapshot = fixtures::snapshot();
        let output =
            fixtures::render(|w| album(w, &snapshot, "Radiohead", "OK Computer", Weekday::Mon));
        assert_snapshot!(output, @r"
OK Computer - Radiohead
Plays: 3 (12:20)
Tracks: 2
First played: 2024-01-01T10:00:00Z
Last played: 2024-01-02T11:00:00Z
Busiest month: January 2024 (3 plays)
Busiest week: Jan 1 - Jan 7, 2024 (3 plays)

Tracks:
  1.  Paranoid Android  1 play   06:20
  2.  Airbag            2 plays  06:00
");
    }

    #[test]
    fn sunday_weeks_shift_the_busiest_week() {
        let snapshot = fixtures::snapshot();
        let output =
            fixtures::render(|w| album(w, &snapshot, "Portishead", "Dummy", Weekday::Sun));
        assert!(output.contains("Busiest week: Dec 31, 2023 - Jan 6, 2024 (1 play)\n"));
    }

    #[test]
    fn missing_entities_are_errors() {
        let snapshot = fixtures::snapshot();
        let err = artist(&mut Vec::new(), &snapshot, "Björk").unwrap_err();
        assert_eq!(err.to_string(), "artist not found: Björk");

        let err = album(&mut Vec::new(), &snapshot, "Radiohead", "Kid A", Weekday::Mon)
            .unwrap_err();
        assert_eq!(err.to_string(), "album not found: Kid A by Radiohead");
    }
}
