//! Peak-activity detection for a single entity.
//!
//! Day buckets are re-bucketed into weeks and month buckets are read as they
//! are. Both sets of windows then go through one outlier test: a window is a
//! peak when its plays exceed `mean + threshold * stddev` across all windows.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::index::{BucketMap, CountAgg, TimeIndex};
use crate::stats;
use crate::time_key::{end_of_month, end_of_week, parse_day, parse_month, start_of_week};
use crate::types::{EntityKind, Granularity};

pub const DEFAULT_PEAK_THRESHOLD: f64 = 1.5;
pub const DEFAULT_TIMELINE_MIN_PLAYS: u64 = 10;

const MS_PER_HOUR: f64 = 3_600_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    Week,
    Month,
}

/// One week or month of activity for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub kind: WindowKind,
    pub start: NaiveDate,
    pub plays: u64,
    pub ms: u64,
}

impl Window {
    /// Last day of the window: six days after a week start, or month end.
    pub fn end(&self) -> NaiveDate {
        match self.kind {
            WindowKind::Week => end_of_week(self.start, self.start.weekday()),
            WindowKind::Month => end_of_month(self.start),
        }
    }

    /// `"Jan 1 - Jan 7, 2024"` for weeks, `"January 2024"` for months.
    pub fn label(&self) -> String {
        match self.kind {
            WindowKind::Week => {
                let end = self.end();
                let start = if self.start.year() == end.year() {
                    self.start.format("%b %-d")
                } else {
                    self.start.format("%b %-d, %Y")
                };
                format!("{start} - {}", end.format("%b %-d, %Y"))
            }
            WindowKind::Month => self.start.format("%B %Y").to_string(),
        }
    }

    /// Later start is more recent; on equal starts a week is more specific.
    fn recency(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| other.kind.cmp(&self.kind))
    }
}

/// A window flagged as an outlier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakWindow {
    pub kind: WindowKind,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub plays: u64,
    pub hours: f64,
    /// Standard deviations above the mean. Infinite for a lone window.
    pub significance: f64,
    pub label: String,
}

impl PeakWindow {
    #[allow(clippy::cast_precision_loss)]
    fn new(window: &Window, significance: f64) -> Self {
        Self {
            kind: window.kind,
            start: window.start,
            end: window.end(),
            plays: window.plays,
            hours: window.ms as f64 / MS_PER_HOUR,
            significance,
            label: window.label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub plays: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakActivity {
    pub primary: Option<PeakWindow>,
    pub secondary: Vec<PeakWindow>,
    /// Weekly windows above the timeline minimum, oldest first.
    pub timeline: Vec<TimelinePoint>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakOptions {
    pub threshold: f64,
    pub week_start: Weekday,
    pub timeline_min_plays: u64,
}

impl Default for PeakOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_PEAK_THRESHOLD,
            week_start: Weekday::Mon,
            timeline_min_plays: DEFAULT_TIMELINE_MIN_PLAYS,
        }
    }
}

fn entity_buckets<'a>(
    source: &'a BucketMap,
    id: &'a str,
) -> impl Iterator<Item = (&'a str, CountAgg)> + 'a {
    source
        .iter()
        .filter_map(move |(key, bucket)| bucket.get(id).map(|agg| (key.as_str(), *agg)))
}

/// Weekly windows for one entity, ascending by week start.
pub fn week_windows(index: &TimeIndex, kind: EntityKind, id: &str, week_start: Weekday) -> Vec<Window> {
    let mut weeks: BTreeMap<NaiveDate, CountAgg> = BTreeMap::new();
    for (day, agg) in entity_buckets(index.buckets(kind, Granularity::Day), id) {
        let Some(date) = parse_day(day) else {
            continue;
        };
        weeks
            .entry(start_of_week(date, week_start))
            .or_default()
            .absorb(agg);
    }
    weeks
        .into_iter()
        .map(|(start, agg)| Window {
            kind: WindowKind::Week,
            start,
            plays: agg.plays,
            ms: agg.ms,
        })
        .collect()
}

/// Monthly windows for one entity, ascending by month.
pub fn month_windows(index: &TimeIndex, kind: EntityKind, id: &str) -> Vec<Window> {
    let mut months: Vec<Window> = entity_buckets(index.buckets(kind, Granularity::Month), id)
        .filter_map(|(key, agg)| {
            Some(Window {
                kind: WindowKind::Month,
                start: parse_month(key)?,
                plays: agg.plays,
                ms: agg.ms,
            })
        })
        .collect();
    months.sort_by_key(|w| w.start);
    months
}

/// Flags outlier windows, most plays first.
///
/// A lone window is always a peak with infinite significance. When every
/// window has the same play count only the most recent one is reported, with
/// significance `1.0`.
#[allow(clippy::cast_precision_loss)]
pub fn detect_peaks(windows: &[Window], threshold: f64) -> Vec<PeakWindow> {
    match windows {
        [] => return Vec::new(),
        [only] => return vec![PeakWindow::new(only, f64::INFINITY)],
        _ => {}
    }

    let values: Vec<f64> = windows.iter().map(|w| w.plays as f64).collect();
    let mean = stats::mean(&values);
    let std_dev = stats::std_dev(&values, mean);

    if std_dev <= 0.0 {
        return windows
            .iter()
            .max_by(|a, b| a.recency(b))
            .map(|latest| vec![PeakWindow::new(latest, 1.0)])
            .unwrap_or_default();
    }

    let cutoff = threshold.mul_add(std_dev, mean);
    let mut peaks: Vec<&Window> = windows
        .iter()
        .filter(|w| w.plays as f64 > cutoff)
        .collect();
    peaks.sort_by(|a, b| b.plays.cmp(&a.plays).then_with(|| b.recency(a)));
    peaks
        .into_iter()
        .map(|w| PeakWindow::new(w, (w.plays as f64 - mean) / std_dev))
        .collect()
}

/// Peaks and weekly timeline for one entity.
///
/// Returns `None` when the entity has no activity at all.
pub fn analyze_peaks(
    index: &TimeIndex,
    kind: EntityKind,
    id: &str,
    options: &PeakOptions,
) -> Option<PeakActivity> {
    let weeks = week_windows(index, kind, id, options.week_start);
    let months = month_windows(index, kind, id);
    if weeks.is_empty() && months.is_empty() {
        return None;
    }

    let timeline = weeks
        .iter()
        .filter(|w| w.plays >= options.timeline_min_plays)
        .map(|w| TimelinePoint {
            date: w.start,
            plays: w.plays,
        })
        .collect();

    let all: Vec<Window> = weeks.into_iter().chain(months).collect();
    let mut peaks = detect_peaks(&all, options.threshold).into_iter();
    Some(PeakActivity {
        primary: peaks.next(),
        secondary: peaks.collect(),
        timeline,
    })
}

/// Single busiest month and week of an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BusiestWindows {
    pub month: Option<Window>,
    pub week: Option<Window>,
}

/// Highest-play window, ties going to the later one.
fn busiest(windows: Vec<Window>) -> Option<Window> {
    windows
        .into_iter()
        .max_by(|a, b| a.plays.cmp(&b.plays).then_with(|| a.start.cmp(&b.start)))
}

pub fn busiest_windows(index: &TimeIndex, kind: EntityKind, id: &str, week_start: Weekday) -> BusiestWindows {
    BusiestWindows {
        month: busiest(month_windows(index, kind, id)),
        week: busiest(week_windows(index, kind, id, week_start)),
    }
}
