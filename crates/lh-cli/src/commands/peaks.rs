//! Peaks command: weekly and monthly listening outliers for one entity.

use std::io::Write;

use anyhow::Result;
use lh_core::Snapshot;
use lh_core::peaks::{PeakOptions, PeakWindow, WindowKind, analyze_peaks};

use crate::PeaksArgs;

const fn kind_name(kind: WindowKind) -> &'static str {
    match kind {
        WindowKind::Week => "week",
        WindowKind::Month => "month",
    }
}

fn describe(peak: &PeakWindow) -> String {
    let significance = if peak.significance.is_finite() {
        format!("{:.2}", peak.significance)
    } else {
        "n/a".to_string()
    };
    format!(
        "{} ({}): {} plays, {:.1} h, significance {significance}",
        peak.label,
        kind_name(peak.kind),
        peak.plays,
        peak.hours
    )
}

pub fn run<W: Write>(
    writer: &mut W,
    snapshot: &Snapshot,
    args: &PeaksArgs,
    options: &PeakOptions,
) -> Result<()> {
    let activity = analyze_peaks(snapshot.time_index(), args.kind, &args.id, options);

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&activity)?)?;
        return Ok(());
    }

    let Some(activity) = activity else {
        writeln!(writer, "No activity for {} {}.", args.kind, args.id)?;
        return Ok(());
    };

    match &activity.primary {
        Some(peak) => writeln!(writer, "Peak: {}", describe(peak))?,
        None => writeln!(writer, "No peaks above threshold.")?,
    }
    for peak in &activity.secondary {
        writeln!(writer, "Also: {}", describe(peak))?;
    }

    if !activity.timeline.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "Weekly timeline:")?;
        for point in &activity.timeline {
            writeln!(writer, "  {}  {}", point.date, point.plays)?;
        }
    }

    Ok(())
}
