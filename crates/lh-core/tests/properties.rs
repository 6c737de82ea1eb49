//! Whole-pipeline properties: validate, aggregate, then query.

use lh_core::peaks::{PeakOptions, WindowKind, analyze_peaks};
use lh_core::select::{SelectQuery, TrackSort, select_albums, select_artists, select_tracks};
use lh_core::series::{SeriesMetric, build_series};
use lh_core::time_key::{choose_granularity, parse_day};
use lh_core::validation::validate_batch;
use lh_core::{
    AggregateOptions, EntityKind, Granularity, Snapshot, SortOrder, StreamingEntry, TimeRange,
    recompute,
};
use serde_json::json;

fn history() -> Vec<StreamingEntry> {
    let records = vec![
        json!({"ts": "2023-11-03T08:15:00Z", "ms_played": 180_000, "master_metadata_track_name": "Airbag", "master_metadata_album_artist_name": "Radiohead", "master_metadata_album_album_name": "OK Computer", "spotify_track_uri": "spotify:track:airbag"}),
        json!({"ts": "2023-11-03T08:20:00+01:00", "ms_played": 200_000, "master_metadata_track_name": "Paranoid Android", "master_metadata_album_artist_name": "Radiohead", "master_metadata_album_album_name": "OK Computer", "spotify_track_uri": "spotify:track:android"}),
        json!({"ts": "2024-01-15T21:00:00Z", "ms_played": 90_000, "master_metadata_track_name": "Roads", "master_metadata_album_artist_name": "Portishead", "master_metadata_album_album_name": "Dummy"}),
        json!({"ts": "2024-02-29T12:00:00Z", "ms_played": 180_000, "master_metadata_track_name": "Airbag", "master_metadata_album_artist_name": "Radiohead", "master_metadata_album_album_name": "OK Computer", "spotify_track_uri": "spotify:track:airbag", "shuffle": true}),
        json!({"ts": "2024-03-01T00:30:00Z", "ms_played": 45_000, "episode_name": "Ep 1", "episode_show_name": "Show"}),
        json!({"ts": "not a date", "ms_played": 10}),
        json!({"ts": "2024-03-02T09:00:00Z", "ms_played": 120_000, "master_metadata_track_name": "Glory Box", "master_metadata_album_artist_name": "Portishead", "master_metadata_album_album_name": "Dummy"}),
    ];
    let result = validate_batch(&records);
    assert_eq!(result.invalid_count, 1);
    result.valid
}

fn snapshot() -> Snapshot {
    recompute(&[history()], &AggregateOptions::default())
}

#[test]
fn aggregation_is_idempotent() {
    let entries = history();
    let (head, tail) = entries.split_at(3);
    let first = recompute(&[head.to_vec(), tail.to_vec()], &AggregateOptions::default());
    let second = recompute(&[entries], &AggregateOptions::default());
    assert_eq!(first, second);
    assert_eq!(first, snapshot());
}

#[test]
fn day_buckets_conserve_lifetime_totals() {
    let snapshot = snapshot();
    let library = snapshot.library();
    let index = snapshot.time_index();

    for artist in library.artists() {
        let agg = index.lifetime_of(EntityKind::Artist, &artist.name);
        assert_eq!(agg.plays, artist.plays_count, "{}", artist.name);
        assert_eq!(agg.ms, artist.play_time_ms, "{}", artist.name);
    }
    for album in library.albums() {
        let agg = index.lifetime_of(EntityKind::Album, &album.id);
        assert_eq!((agg.plays, agg.ms), (album.plays_count, album.play_time_ms));
    }
    for track in library.tracks() {
        let agg = index.lifetime_of(EntityKind::Track, &track.id);
        assert_eq!((agg.plays, agg.ms), (track.plays_count, track.total_ms));
    }
}

#[test]
fn offsets_are_normalized_before_bucketing() {
    let snapshot = snapshot();
    let track = snapshot.library().track("spotify:track:android").unwrap();
    assert_eq!(track.seen.first_ts.as_deref(), Some("2023-11-03T07:20:00Z"));
    assert_eq!(snapshot.time_index().min_day.as_deref(), Some("2023-11-03"));
}

#[test]
fn all_range_reproduces_lifetime_stats() {
    let snapshot = snapshot();

    for row in select_artists(&snapshot, &SelectQuery::default()) {
        assert_eq!(row.range.plays, row.lifetime.plays);
        assert_eq!(row.range.ms, row.lifetime.ms);
    }
    for row in select_albums(&snapshot, &SelectQuery::default()) {
        assert_eq!((row.range.plays, row.range.ms), (row.lifetime.plays, row.lifetime.ms));
    }
    let tracks = select_tracks(&snapshot, &SelectQuery::default());
    assert_eq!(tracks.len(), snapshot.library().track_count());
    for row in &tracks {
        assert_eq!((row.range.plays, row.range.ms), (row.lifetime.plays, row.lifetime.ms));
        assert_eq!(row.range.granularity, Granularity::Month);
    }
}

#[test]
fn swapping_order_reverses_rows() {
    let snapshot = snapshot();
    let mut query = SelectQuery {
        sort: TrackSort::LifetimePlays,
        ..SelectQuery::default()
    };
    let desc: Vec<_> = select_tracks(&snapshot, &query).into_iter().map(|r| r.id).collect();
    query.order = SortOrder::Asc;
    let mut asc: Vec<_> = select_tracks(&snapshot, &query).into_iter().map(|r| r.id).collect();
    asc.reverse();
    assert_eq!(desc, asc);
    assert_eq!(desc[0].as_ref(), "spotify:track:airbag");
}

#[test]
fn ninety_two_days_is_the_day_granularity_limit() {
    let from = parse_day("2024-01-01").unwrap();
    assert_eq!(
        choose_granularity(from, parse_day("2024-04-02").unwrap()),
        Granularity::Day
    );
    assert_eq!(
        choose_granularity(from, parse_day("2024-04-03").unwrap()),
        Granularity::Month
    );
}

#[test]
fn spike_week_is_a_peak() {
    let mut entries = Vec::new();
    for (day, count) in [
        ("2024-01-01", 5),
        ("2024-01-08", 5),
        ("2024-01-15", 5),
        ("2024-01-22", 5),
        ("2024-01-29", 5),
        ("2024-02-05", 5),
        ("2024-02-12", 50),
    ] {
        for _ in 0..count {
            entries.push(StreamingEntry {
                ts: format!("{day}T18:00:00Z"),
                ms_played: 200_000,
                master_metadata_track_name: Some("Song".into()),
                master_metadata_album_artist_name: Some("Band".into()),
                master_metadata_album_album_name: Some("Record".into()),
                ..StreamingEntry::default()
            });
        }
    }
    let snapshot = recompute(&[entries], &AggregateOptions::default());
    let activity = analyze_peaks(
        snapshot.time_index(),
        EntityKind::Album,
        "Band::Record",
        &PeakOptions::default(),
    )
    .unwrap();

    let weeks: Vec<_> = activity
        .primary
        .iter()
        .chain(&activity.secondary)
        .filter(|p| p.kind == WindowKind::Week)
        .collect();
    assert_eq!(weeks.len(), 1);
    assert_eq!(weeks[0].label, "Feb 12 - Feb 18, 2024");
    assert!(weeks[0].significance > 1.5);
}

#[test]
fn huge_play_times_saturate_instead_of_overflowing() {
    let records = [
        json!({"ts": "2024-01-01T10:00:00Z", "ms_played": 1e300, "master_metadata_track_name": "T"}),
        json!({"ts": "2024-01-01T11:00:00Z", "ms_played": 1000, "master_metadata_track_name": "T"}),
    ];
    let result = validate_batch(&records);
    assert_eq!(result.valid.len(), 2);
    assert_eq!(result.valid[0].ms_played, u64::MAX);

    let snapshot = recompute(&[result.valid], &AggregateOptions::default());
    let track = snapshot.library().tracks().next().unwrap();
    assert_eq!(track.plays_count, 2);
    assert_eq!(track.total_ms, u64::MAX);
    assert_eq!(snapshot.library().artists().next().unwrap().play_time_ms, u64::MAX);
    assert_eq!(snapshot.summary().total_played_time_ms, u64::MAX);

    let lifetime = snapshot.time_index().lifetime_of(EntityKind::Track, &track.id);
    assert_eq!(lifetime.ms, u64::MAX);
    assert_eq!(lifetime.plays, 2);

    let rows = select_artists(&snapshot, &SelectQuery::default());
    assert_eq!(rows[0].range.ms, u64::MAX);
    assert_eq!(rows[0].range.plays, 2);

    let hours = build_series(
        snapshot.time_index(),
        &TimeRange::default(),
        EntityKind::Artist,
        SeriesMetric::Hours,
    );
    assert_eq!(hours.points[0].value, u64::MAX / 3_600_000);
}

#[test]
fn one_week_of_daily_plays_falls_back_to_the_latest_window() {
    // Seven days inside one Monday-start week and one month: two equal windows.
    let entries: Vec<_> = [5, 5, 5, 5, 5, 5, 50]
        .into_iter()
        .enumerate()
        .flat_map(|(offset, count)| {
            (0..count).map(move |_| StreamingEntry {
                ts: format!("2024-01-0{}T18:00:00Z", offset + 1),
                ms_played: 200_000,
                master_metadata_track_name: Some("Song".into()),
                master_metadata_album_artist_name: Some("Band".into()),
                master_metadata_album_album_name: Some("Record".into()),
                ..StreamingEntry::default()
            })
        })
        .collect();
    let snapshot = recompute(&[entries], &AggregateOptions::default());
    let activity = analyze_peaks(
        snapshot.time_index(),
        EntityKind::Album,
        "Band::Record",
        &PeakOptions::default(),
    )
    .unwrap();

    let primary = activity.primary.unwrap();
    assert_eq!(primary.kind, WindowKind::Week);
    assert_eq!(primary.label, "Jan 1 - Jan 7, 2024");
    assert_eq!(primary.plays, 80);
    assert!((primary.significance - 1.0).abs() < f64::EPSILON);
    assert!(activity.secondary.is_empty());
}
