//! Play events as they appear in a streaming-history export.

use serde::{Deserialize, Serialize};

use crate::time_key::month_of;

/// Artist name used when an entry carries none.
pub const UNKNOWN_ARTIST: &str = "(Unknown Artist)";

/// Album name used when an entry carries none.
pub const UNKNOWN_ALBUM: &str = "(Unknown Album)";

/// A single play event.
///
/// `ts` is always normalized to fixed-width UTC (`YYYY-MM-DDTHH:MM:SSZ`) by the
/// validator, so timestamps compare lexically in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingEntry {
    /// When playback stopped.
    pub ts: String,
    /// Device or client platform.
    pub platform: Option<String>,
    /// Milliseconds of playback.
    pub ms_played: u64,
    /// Country code of the connection.
    pub conn_country: Option<String>,
    pub ip_addr: Option<String>,

    pub master_metadata_track_name: Option<String>,
    pub master_metadata_album_artist_name: Option<String>,
    pub master_metadata_album_album_name: Option<String>,
    pub spotify_track_uri: Option<String>,

    pub episode_name: Option<String>,
    pub episode_show_name: Option<String>,
    pub spotify_episode_uri: Option<String>,

    pub audiobook_title: Option<String>,
    pub audiobook_uri: Option<String>,
    pub audiobook_chapter_uri: Option<String>,
    pub audiobook_chapter_title: Option<String>,

    /// Why playback started (e.g. `trackdone`).
    pub reason_start: Option<String>,
    /// Why playback ended (e.g. `endplay`).
    pub reason_end: Option<String>,

    pub shuffle: bool,
    pub skipped: bool,
    pub offline: bool,
    pub offline_timestamp: Option<u64>,
    pub incognito_mode: bool,
}

/// Which content families an entry looks like.
///
/// The flags are not exclusive: an export row can carry both a track name and
/// an episode name, in which case the content id prefers the track URI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryKind {
    pub is_track: bool,
    pub is_podcast: bool,
    pub is_audiobook: bool,
}

impl EntryKind {
    /// True when the entry matches none of the known families.
    pub const fn is_unknown(self) -> bool {
        !self.is_track && !self.is_podcast && !self.is_audiobook
    }
}

fn present(value: Option<&String>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

impl StreamingEntry {
    /// Classifies the entry from the presence of URI and name fields.
    pub fn kind(&self) -> EntryKind {
        EntryKind {
            is_track: present(self.spotify_track_uri.as_ref())
                || present(self.master_metadata_track_name.as_ref()),
            is_podcast: present(self.spotify_episode_uri.as_ref())
                || present(self.episode_name.as_ref()),
            is_audiobook: present(self.audiobook_uri.as_ref())
                || present(self.audiobook_title.as_ref()),
        }
    }

    /// Artist name, falling back to [`UNKNOWN_ARTIST`].
    pub fn artist_name(&self) -> &str {
        self.master_metadata_album_artist_name
            .as_deref()
            .unwrap_or(UNKNOWN_ARTIST)
    }

    /// Album name, falling back to [`UNKNOWN_ALBUM`].
    pub fn album_name(&self) -> &str {
        self.master_metadata_album_album_name
            .as_deref()
            .unwrap_or(UNKNOWN_ALBUM)
    }

    /// Content id for the track map.
    ///
    /// Prefers the canonical track URI. Without one, a type-tagged composite of
    /// the available names is used. Two distinct untitled plays from the same
    /// album collapse onto the same composite id; this is a known limitation.
    pub fn content_id(&self, kind: EntryKind) -> String {
        if let Some(uri) = self.spotify_track_uri.as_ref().filter(|u| !u.is_empty()) {
            return uri.clone();
        }
        let field = |v: &Option<String>| v.as_deref().unwrap_or("").to_string();
        if kind.is_podcast {
            format!(
                "episode:{}:{}",
                field(&self.episode_show_name),
                field(&self.episode_name)
            )
        } else if kind.is_audiobook {
            format!(
                "audiobook:{}:{}",
                field(&self.audiobook_title),
                field(&self.audiobook_chapter_title)
            )
        } else {
            format!(
                "track:{}:{}:{}",
                field(&self.master_metadata_track_name),
                self.artist_name(),
                self.album_name()
            )
        }
    }

    /// Day key (`YYYY-MM-DD`).
    pub fn day_key(&self) -> &str {
        self.ts.get(..10).unwrap_or(&self.ts)
    }

    /// Month key (`YYYY-MM`).
    pub fn month_key(&self) -> &str {
        month_of(self.day_key())
    }
}

/// Builds the album id (`artist::album`).
pub fn album_key(artist_name: &str, album_name: &str) -> String {
    format!("{artist_name}::{album_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(uri: Option<&str>, name: Option<&str>) -> StreamingEntry {
        StreamingEntry {
            ts: "2024-01-01T10:00:00Z".into(),
            ms_played: 1000,
            spotify_track_uri: uri.map(String::from),
            master_metadata_track_name: name.map(String::from),
            master_metadata_album_artist_name: Some("A".into()),
            master_metadata_album_album_name: Some("X".into()),
            ..StreamingEntry::default()
        }
    }

    #[test]
    fn content_id_prefers_track_uri() {
        let entry = track(Some("spotify:track:1"), Some("T1"));
        assert_eq!(entry.content_id(entry.kind()), "spotify:track:1");
    }

    #[test]
    fn content_id_falls_back_to_composite() {
        let entry = track(None, Some("T1"));
        assert_eq!(entry.content_id(entry.kind()), "track:T1:A:X");
    }

    #[test]
    fn podcast_composite_uses_show_and_episode() {
        let entry = StreamingEntry {
            ts: "2024-01-01T10:00:00Z".into(),
            episode_name: Some("Ep 1".into()),
            episode_show_name: Some("Show".into()),
            ..StreamingEntry::default()
        };
        let kind = entry.kind();
        assert!(kind.is_podcast);
        assert!(!kind.is_track);
        assert_eq!(entry.content_id(kind), "episode:Show:Ep 1");
    }

    #[test]
    fn empty_names_do_not_classify() {
        let entry = StreamingEntry {
            ts: "2024-01-01T10:00:00Z".into(),
            master_metadata_track_name: Some(String::new()),
            ..StreamingEntry::default()
        };
        assert!(entry.kind().is_unknown());
    }

    #[test]
    fn missing_names_use_placeholders() {
        let entry = StreamingEntry::default();
        assert_eq!(entry.artist_name(), UNKNOWN_ARTIST);
        assert_eq!(entry.album_name(), UNKNOWN_ALBUM);
        assert_eq!(album_key("A", "X"), "A::X");
    }

    #[test]
    fn time_keys_slice_timestamp() {
        let entry = track(None, Some("T1"));
        assert_eq!(entry.day_key(), "2024-01-01");
        assert_eq!(entry.month_key(), "2024-01");
    }

    #[test]
    fn entry_serde_roundtrip() {
        let entry = track(Some("spotify:track:1"), Some("T1"));
        let json = serde_json::to_string(&entry).unwrap();
        let parsed: StreamingEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry);
    }
}
