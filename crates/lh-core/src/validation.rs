//! Boundary checks applied to decoded records before aggregation.
//!
//! Validation is permissive: a record needs a timestamp and a
//! non-negative `ms_played`, nothing else. Fields with unexpected JSON types
//! are read as absent instead of rejecting the whole record.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::entry::StreamingEntry;

/// Outcome of validating one batch of records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: Vec<StreamingEntry>,
    pub invalid_count: usize,
}

/// Normalizes an RFC 3339 timestamp to fixed-width UTC seconds.
///
/// Returns `None` for empty or unparseable input.
pub fn normalize_timestamp(ts: &str) -> Option<String> {
    if ts.is_empty() {
        return None;
    }
    let parsed = DateTime::parse_from_rfc3339(ts).ok()?;
    Some(
        parsed
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is checked to be finite and non-negative"
)]
fn ms_played(value: &Value) -> Option<u64> {
    if let Some(ms) = value.as_u64() {
        return Some(ms);
    }
    let ms = value.as_f64()?;
    (ms.is_finite() && ms >= 0.0).then(|| ms.trunc() as u64)
}

fn text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(String::from)
}

fn flag(obj: &Map<String, Value>, key: &str) -> bool {
    obj.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Checks one decoded record and converts it into an entry.
pub fn validate_entry(record: &Value) -> Option<StreamingEntry> {
    let obj = record.as_object()?;
    let ts = normalize_timestamp(obj.get("ts")?.as_str()?)?;
    let ms_played = ms_played(obj.get("ms_played")?)?;

    Some(StreamingEntry {
        ts,
        platform: text(obj, "platform"),
        ms_played,
        conn_country: text(obj, "conn_country"),
        ip_addr: text(obj, "ip_addr"),
        master_metadata_track_name: text(obj, "master_metadata_track_name"),
        master_metadata_album_artist_name: text(obj, "master_metadata_album_artist_name"),
        master_metadata_album_album_name: text(obj, "master_metadata_album_album_name"),
        spotify_track_uri: text(obj, "spotify_track_uri"),
        episode_name: text(obj, "episode_name"),
        episode_show_name: text(obj, "episode_show_name"),
        spotify_episode_uri: text(obj, "spotify_episode_uri"),
        audiobook_title: text(obj, "audiobook_title"),
        audiobook_uri: text(obj, "audiobook_uri"),
        audiobook_chapter_uri: text(obj, "audiobook_chapter_uri"),
        audiobook_chapter_title: text(obj, "audiobook_chapter_title"),
        reason_start: text(obj, "reason_start"),
        reason_end: text(obj, "reason_end"),
        shuffle: flag(obj, "shuffle"),
        skipped: flag(obj, "skipped"),
        offline: flag(obj, "offline"),
        offline_timestamp: obj.get("offline_timestamp").and_then(Value::as_u64),
        incognito_mode: flag(obj, "incognito_mode"),
    })
}

/// Partitions a batch into valid entries and a count of dropped records.
pub fn validate_batch<'a, I>(records: I) -> ValidationResult
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut result = ValidationResult::default();
    for record in records {
        match validate_entry(record) {
            Some(entry) => result.valid.push(entry),
            None => result.invalid_count += 1,
        }
    }
    result
}
