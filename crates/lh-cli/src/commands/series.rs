//! Series command: activity over time.

use std::io::Write;

use anyhow::Result;
use lh_core::Snapshot;
use lh_core::series::{SeriesMetric, build_series};

use super::util::write_columns;
use crate::SeriesArgs;

pub fn run<W: Write>(writer: &mut W, snapshot: &Snapshot, args: &SeriesArgs) -> Result<()> {
    let series = build_series(snapshot.time_index(), &args.range, args.kind, args.metric);

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&series)?)?;
        return Ok(());
    }

    if series.points.is_empty() {
        writeln!(writer, "No activity in range.")?;
        return Ok(());
    }

    let metric = match args.metric {
        SeriesMetric::Distinct => format!("distinct {}s", args.kind),
        metric => metric.to_string(),
    };
    writeln!(
        writer,
        "{metric} per {} ({})",
        series.granularity, args.range
    )?;

    let lines: Vec<Vec<String>> = series
        .points
        .iter()
        .map(|point| vec![point.key.clone(), point.value.to_string()])
        .collect();
    write_columns(writer, "", &lines)
}
