//! Summary command: library totals and top entities.

use std::io::Write;

use anyhow::Result;
use lh_core::{Library, Snapshot};

use super::util::{album_label, format_hms, track_label};

fn artist_text(id: Option<&str>) -> String {
    id.unwrap_or("-").to_string()
}

fn album_text(library: &Library, id: Option<&str>) -> String {
    id.and_then(|id| library.album(id))
        .map_or_else(|| "-".to_string(), |a| album_label(&a.name, &a.artist_name))
}

fn track_text(library: &Library, id: Option<&str>) -> String {
    id.and_then(|id| library.track(id)).map_or_else(
        || "-".to_string(),
        |t| track_label(t.track_name.as_deref(), t.artist_name.as_deref(), &t.id),
    )
}

pub fn run<W: Write>(writer: &mut W, snapshot: &Snapshot, json: bool) -> Result<()> {
    let summary = snapshot.summary();

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(summary)?)?;
        return Ok(());
    }

    if snapshot.is_empty() {
        writeln!(writer, "No history imported.")?;
        return Ok(());
    }

    let library = snapshot.library();
    let top = &summary.top;
    writeln!(writer, "Artists: {}", summary.total_artists)?;
    writeln!(writer, "Albums: {}", summary.total_albums)?;
    writeln!(writer, "Tracks: {}", summary.unique_tracks_count)?;
    writeln!(
        writer,
        "Total play time: {}",
        format_hms(summary.total_played_time_ms)
    )?;
    writeln!(writer)?;
    writeln!(
        writer,
        "Top artist by plays: {}",
        artist_text(top.artist_by_plays.as_deref())
    )?;
    writeln!(
        writer,
        "Top artist by time: {}",
        artist_text(top.artist_by_time.as_deref())
    )?;
    writeln!(
        writer,
        "Top album by plays: {}",
        album_text(library, top.album_by_plays.as_deref())
    )?;
    writeln!(
        writer,
        "Top album by time: {}",
        album_text(library, top.album_by_time.as_deref())
    )?;
    writeln!(
        writer,
        "Top track by plays: {}",
        track_text(library, top.track_by_plays.as_deref())
    )?;
    writeln!(
        writer,
        "Top track by time: {}",
        track_text(library, top.track_by_time.as_deref())
    )?;

    if snapshot.skipped() > 0 {
        writeln!(writer, "Skipped entries: {}", snapshot.skipped())?;
    }

    Ok(())
}
