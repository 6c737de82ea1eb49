//! Top command: ranked entities inside a time range.

use std::io::Write;

use anyhow::Result;
use lh_core::select::{
    AlbumSort, ArtistSort, RangeStats, SelectQuery, TrackSort, select_albums, select_artists,
    select_tracks,
};
use lh_core::{EntityKind, Snapshot};
use serde::Serialize;

use super::util::{album_label, format_entity_duration, plays, track_label, write_columns};
use crate::TopArgs;

fn query<K: Default + std::str::FromStr>(args: &TopArgs) -> Result<SelectQuery<K>, K::Err> {
    let sort = args.sort.as_deref().map(str::parse::<K>).transpose()?;
    Ok(SelectQuery {
        search: args.search.clone().unwrap_or_default(),
        range: args.range.clone(),
        sort: sort.unwrap_or_default(),
        order: args.order,
    })
}

fn emit<W, R, F>(writer: &mut W, args: &TopArgs, mut rows: Vec<R>, describe: F) -> Result<()>
where
    W: Write,
    R: Serialize,
    F: Fn(&R) -> (String, &RangeStats),
{
    rows.truncate(args.limit);

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&rows)?)?;
        return Ok(());
    }

    let Some(first) = rows.first() else {
        writeln!(writer, "No {}s in range.", args.kind)?;
        return Ok(());
    };

    writeln!(
        writer,
        "Top {}s ({}, {})",
        args.kind,
        args.range,
        describe(first).1.granularity
    )?;
    let lines: Vec<Vec<String>> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let (label, range) = describe(row);
            vec![
                format!("{:>3}.", i + 1),
                label,
                plays(range.plays),
                format_entity_duration(range.ms),
            ]
        })
        .collect();
    write_columns(writer, "", &lines)
}

pub fn run<W: Write>(writer: &mut W, snapshot: &Snapshot, args: &TopArgs) -> Result<()> {
    match args.kind {
        EntityKind::Artist => {
            let rows = select_artists(snapshot, &query::<ArtistSort>(args)?);
            emit(writer, args, rows, |r| (r.name.to_string(), &r.range))
        }
        EntityKind::Album => {
            let rows = select_albums(snapshot, &query::<AlbumSort>(args)?);
            emit(writer, args, rows, |r| {
                (album_label(&r.name, &r.artist_name), &r.range)
            })
        }
        EntityKind::Track => {
            let rows = select_tracks(snapshot, &query::<TrackSort>(args)?);
            emit(writer, args, rows, |r| {
                let label = track_label(r.name.as_deref(), r.artist_name.as_deref(), &r.id);
                (label, &r.range)
            })
        }
    }
}
