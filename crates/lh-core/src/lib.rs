//! Core domain logic for listening-history analysis.
//!
//! This crate contains the fundamental types and logic for:
//! - Validation: permissive boundary checks on decoded export records
//! - Aggregation: one pass building the artist/album/track library and time index
//! - Queries: range-scoped, sorted, searchable entity rows
//! - Peaks: weekly/monthly outlier detection for a single entity

mod aggregate;
pub mod entry;
pub mod index;
pub mod ingest;
pub mod library;
pub mod peaks;
pub mod range;
pub mod rankings;
pub mod select;
pub mod series;
pub mod stats;
mod summary;
pub mod time_key;
mod types;
pub mod validation;

pub use aggregate::{AggregateOptions, Snapshot, recompute};
pub use entry::StreamingEntry;
pub use index::{CountAgg, MergedAgg, TimeIndex};
pub use ingest::{IngestError, IngestReport, load_history_files, validate_files};
pub use library::{EnrichedAlbum, EnrichedArtist, EnrichedTrack, Library};
pub use range::{FixedRange, TimeRange};
pub use summary::{EntitiesSummary, TopEntities};
pub use types::{EntityKind, Granularity, ParseError, SortOrder};
