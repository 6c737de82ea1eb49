//! Shared utilities for CLI commands.

use std::io::Write;

use anyhow::{Context, Result};
use lh_core::entry::UNKNOWN_ARTIST;
use lh_core::{AggregateOptions, Snapshot, recompute};
use lh_db::Store;

const SECONDS_PER_DAY: u64 = 86_400;
const SECONDS_PER_HOUR: u64 = 3_600;

/// Loads every stored entry and aggregates it into a fresh snapshot.
pub fn load_snapshot(store: &Store, options: &AggregateOptions) -> Result<Snapshot> {
    let entries = store.load_entries().context("failed to load stored history")?;
    tracing::debug!(entries = entries.len(), "loaded stored history");
    Ok(recompute(&[entries], options))
}

/// Formats an entity duration as `1d 02:03:04`, `1:02:03` or `02:03`.
///
/// Milliseconds are rounded to the nearest second.
pub fn format_entity_duration(ms: u64) -> String {
    let total = (ms + 500) / 1000;
    let days = total / SECONDS_PER_DAY;
    let hours = (total % SECONDS_PER_DAY) / SECONDS_PER_HOUR;
    let minutes = (total % SECONDS_PER_HOUR) / 60;
    let seconds = total % 60;

    if days > 0 {
        format!("{days}d {hours:02}:{minutes:02}:{seconds:02}")
    } else if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Formats a total as `Xh MMm SSs`. Partial seconds are dropped.
pub fn format_hms(ms: u64) -> String {
    let total = ms / 1000;
    let hours = total / SECONDS_PER_HOUR;
    let minutes = (total % SECONDS_PER_HOUR) / 60;
    let seconds = total % 60;
    format!("{hours}h {minutes:02}m {seconds:02}s")
}

/// `1 play`, `2 plays`.
pub fn plays(count: u64) -> String {
    if count == 1 {
        "1 play".to_string()
    } else {
        format!("{count} plays")
    }
}

/// `Track - Artist`, falling back to `id` for untitled content.
pub fn track_label(name: Option<&str>, artist: Option<&str>, id: &str) -> String {
    match name {
        Some(name) => format!("{name} - {}", artist.unwrap_or(UNKNOWN_ARTIST)),
        None => id.to_string(),
    }
}

/// `Album (Artist)`.
pub fn album_label(name: &str, artist: &str) -> String {
    format!("{name} ({artist})")
}

/// Writes rows as left-aligned columns separated by two spaces.
///
/// The last column is not padded.
pub fn write_columns<W: Write>(writer: &mut W, indent: &str, rows: &[Vec<String>]) -> Result<()> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|i| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    for row in rows {
        let mut line = String::from(indent);
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                line.push_str("  ");
            }
            line.push_str(cell);
            if i + 1 < row.len() {
                let pad = widths[i].saturating_sub(cell.chars().count());
                line.extend(std::iter::repeat_n(' ', pad));
            }
        }
        writeln!(writer, "{line}")?;
    }
    Ok(())
}
