//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use lh_core::series::SeriesMetric;
use lh_core::{EntityKind, SortOrder, TimeRange};

/// Listening history analysis.
///
/// Imports streaming-history exports and answers range-scoped questions
/// about artists, albums and tracks.
#[derive(Debug, Parser)]
#[command(name = "lh", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replace the stored history with one or more JSON export files.
    Import {
        /// Export files, each a JSON array of streaming records.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Show what is stored.
    Status,

    /// Delete the stored history.
    Clear,

    /// Library totals and top entities.
    Summary {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Ranked entities inside a time range.
    Top(TopArgs),

    /// Activity over time, one point per day or month.
    Series(SeriesArgs),

    /// Weekly and monthly listening peaks for one entity.
    Peaks(PeaksArgs),

    /// Details for one artist.
    Artist {
        /// Artist name, exactly as exported.
        name: String,
    },

    /// Details for one album.
    Album {
        /// Album artist name.
        artist: String,
        /// Album name.
        album: String,
    },
}

#[derive(Debug, Args)]
pub struct TopArgs {
    /// Entity kind: artists, albums or tracks.
    pub kind: EntityKind,

    /// Time range: 1M, 3M, 6M, 1Y, All or YYYY-MM-DD..YYYY-MM-DD.
    #[arg(short, long, default_value = "All")]
    pub range: TimeRange,

    /// Sort key, e.g. range-ms, range-plays, lifetime-ms, name.
    #[arg(short, long)]
    pub sort: Option<String>,

    /// Sort order.
    #[arg(short, long, default_value = "desc")]
    pub order: SortOrder,

    /// Case-insensitive substring filter.
    #[arg(long)]
    pub search: Option<String>,

    /// Maximum rows to print.
    #[arg(short = 'n', long, default_value_t = 20)]
    pub limit: usize,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SeriesArgs {
    /// Entity kind the buckets are read from.
    #[arg(default_value = "artists")]
    pub kind: EntityKind,

    /// Time range: 1M, 3M, 6M, 1Y, All or YYYY-MM-DD..YYYY-MM-DD.
    #[arg(short, long, default_value = "All")]
    pub range: TimeRange,

    /// Metric: plays, hours or distinct.
    #[arg(short, long, default_value = "plays")]
    pub metric: SeriesMetric,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct PeaksArgs {
    /// Entity kind: artist, album or track.
    pub kind: EntityKind,

    /// Entity id: artist name, `artist::album`, or the track id.
    pub id: String,

    /// Standard deviations above the mean; overrides the config value.
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}
