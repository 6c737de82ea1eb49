//! End-to-end tests for the complete listening-history flow.
//!
//! Tests the full pipeline: import → store → aggregate → query

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const HISTORY_A: &str = r#"[
  {"ts": "2024-01-01T10:00:00Z", "ms_played": 180000, "platform": "android",
   "master_metadata_track_name": "Airbag",
   "master_metadata_album_artist_name": "Radiohead",
   "master_metadata_album_album_name": "OK Computer",
   "spotify_track_uri": "spotify:track:airbag"},
  {"ts": "2024-01-02T01:00:00+02:00", "ms_played": 180000,
   "master_metadata_track_name": "Airbag",
   "master_metadata_album_artist_name": "Radiohead",
   "master_metadata_album_album_name": "OK Computer",
   "spotify_track_uri": "spotify:track:airbag"},
  {"ts": "not a timestamp", "ms_played": 1000}
]"#;

const HISTORY_B: &str = r#"[
  {"ts": "2024-01-02T11:00:00Z", "ms_played": 380000,
   "master_metadata_track_name": "Paranoid Android",
   "master_metadata_album_artist_name": "Radiohead",
   "master_metadata_album_album_name": "OK Computer",
   "spotify_track_uri": "spotify:track:paranoid-android"},
  {"ts": "2024-01-03T09:00:00Z", "ms_played": 300000,
   "master_metadata_track_name": "Roads",
   "master_metadata_album_artist_name": "Portishead",
   "master_metadata_album_album_name": "Dummy",
   "spotify_track_uri": "spotify:track:roads"},
  {"ts": "2024-01-03T10:00:00Z", "ms_played": 1800000,
   "episode_name": "Episode 1", "episode_show_name": "A Show",
   "spotify_episode_uri": "spotify:episode:1"}
]"#;

fn lh_binary() -> &'static str {
    env!("CARGO_BIN_EXE_lh")
}

struct Env {
    temp: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            temp: TempDir::new().unwrap(),
        }
    }

    fn db_path(&self) -> PathBuf {
        self.temp.path().join("data/history.db")
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(lh_binary())
            .env("HOME", self.temp.path())
            .env("XDG_CONFIG_HOME", self.temp.path().join("config"))
            .env("XDG_DATA_HOME", self.temp.path().join("share"))
            .env("LH_DATABASE_PATH", self.db_path())
            .env_remove("RUST_LOG")
            .args(args)
            .output()
            .expect("failed to run lh")
    }

    fn stdout(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "lh {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap()
    }

    fn import(&self) -> String {
        let a = self.write("a.json", HISTORY_A);
        let b = self.write("b.json", HISTORY_B);
        self.stdout(&["import", path_str(&a), path_str(&b)])
    }
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_status_before_import() {
    let env = Env::new();
    let output = env.stdout(&["status"]);
    assert!(output.contains("No history imported."));
    assert!(env.db_path().exists(), "database should be created on first use");
}

#[test]
fn test_import_then_summary() {
    let env = Env::new();
    let imported = env.import();
    assert!(imported.contains("a.json: 2 valid, 1 invalid"));
    assert!(imported.contains("b.json: 3 valid, 0 invalid"));
    assert!(imported.ends_with("Imported 5 entries (1 invalid)\n"));

    let status = env.stdout(&["status"]);
    assert!(status.contains("Entries: 5"));
    assert!(status.contains("Uploaded: "));

    // Podcasts are excluded by default.
    let summary = env.stdout(&["summary"]);
    assert!(summary.contains("Artists: 2\n"));
    assert!(summary.contains("Tracks: 3\n"));
    assert!(summary.contains("Total play time: 0h 17m 20s\n"));
    assert!(summary.contains("Top track by time: Paranoid Android - Radiohead\n"));
}

#[test]
fn test_podcasts_included_from_env() {
    let env = Env::new();
    env.import();

    let output = Command::new(lh_binary())
        .env("HOME", env.temp.path())
        .env("XDG_CONFIG_HOME", env.temp.path().join("config"))
        .env("LH_DATABASE_PATH", env.db_path())
        .env("LH_INCLUDE_PODCASTS", "true")
        .args(["summary", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["unique_tracks_count"], 4);
    assert_eq!(value["total_played_time_ms"], 2_840_000);
}

#[test]
fn test_offset_timestamps_are_normalized() {
    let env = Env::new();
    env.import();

    // 01:00+02:00 on Jan 2 is 23:00Z on Jan 1.
    let output = env.stdout(&["series", "artists", "--metric", "plays"]);
    assert!(output.contains("2024-01-01  2\n"), "got: {output}");
    assert!(output.contains("2024-01-02  1\n"), "got: {output}");
}

#[test]
fn test_top_and_details() {
    let env = Env::new();
    env.import();

    let top = env.stdout(&["top", "tracks", "--sort", "range-plays", "--limit", "1"]);
    assert!(top.starts_with("Top tracks (All, day)\n"));
    assert!(top.contains("Airbag - Radiohead"));
    assert_eq!(top.lines().count(), 2);

    let json = env.stdout(&["top", "artists", "--json", "--range", "2024-01-03..2024-01-03"]);
    let rows: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["name"], "Portishead");

    let artist = env.stdout(&["artist", "Radiohead"]);
    assert!(artist.contains("Plays: 3 (12:20)"));

    let album = env.stdout(&["album", "Radiohead", "OK Computer"]);
    assert!(album.contains("Busiest week: Jan 1 - Jan 7, 2024 (3 plays)"));
}

#[test]
fn test_peaks_for_artist() {
    let env = Env::new();
    env.import();

    let output = env.stdout(&["peaks", "artist", "Radiohead"]);
    assert_eq!(
        output,
        "Peak: Jan 1 - Jan 7, 2024 (week): 3 plays, 0.2 h, significance 1.00\n"
    );
}

#[test]
fn test_clear_removes_history() {
    let env = Env::new();
    env.import();

    assert_eq!(env.stdout(&["clear"]), "Cleared listening history.\n");
    assert!(env.stdout(&["status"]).contains("No history imported."));
    assert_eq!(env.stdout(&["summary"]), "No history imported.\n");
}

#[test]
fn test_invalid_input_fails() {
    let env = Env::new();
    let bad = env.write("bad.json", r#"{"ts": "2024-01-01T00:00:00Z"}"#);

    let output = env.run(&["import", path_str(&bad)]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("bad.json does not contain an array"));

    let output = env.run(&["top", "tracks", "--sort", "loudness"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown sort key for track: loudness"));

    let output = env.run(&["top", "tracks", "--range", "2W"]);
    assert!(!output.status.success());
}
