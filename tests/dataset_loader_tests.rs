use serde_json::json;
use spectro_replay::config::ReplayConfig;
use spectro_replay::core::ChannelSink;
use spectro_replay::dataset::Dataset;
use spectro_replay::engine::ReplayScheduler;
use std::io::Write;
use tokio::time::{Duration, Instant};

fn write_dataset(value: serde_json::Value) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(value.to_string().as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_load_two_channel_dataset() {
    let file = write_dataset(json!({
        "ch1": [[0, 10, 20], [30, 40, 50]],
        "ch2": [[1, 2, 3], [4, 5, 6], [7, 8, 9]]
    }));

    let dataset = Dataset::load(file.path()).await.unwrap();

    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.channel_keys().collect::<Vec<_>>(), vec!["ch1", "ch2"]);
    let ch2 = dataset.channel("ch2").unwrap();
    assert_eq!(ch2.frame_count(), 3);
    assert_eq!(ch2.bins(), 3);
    assert_eq!(ch2.frames()[2].samples(), &[7.0, 8.0, 9.0]);
}

#[tokio::test]
async fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Dataset::load(dir.path().join("audio2ch.json")).await.unwrap_err();
    assert!(err.to_string().contains("failed to read dataset"));
}

#[tokio::test]
async fn test_invalid_json_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{\"ch1\": [[1, 2], ").unwrap();

    assert!(Dataset::load(file.path()).await.is_err());
}

#[test]
fn test_scheduler_from_default_config() {
    let dataset = Dataset::from_json(json!({
        "ch1": [[0, 255], [128, 64]],
        "ch2": [[1, 1], [2, 2], [3, 3]]
    }))
    .unwrap();

    let mut scheduler = ReplayScheduler::from_config(&ReplayConfig::default(), &dataset).unwrap();
    assert_eq!(scheduler.channels().len(), 2);
    assert_eq!(scheduler.channel("Channel 2").unwrap().frame_count(), 3);

    let t0 = Instant::now();
    scheduler.start(t0).unwrap();
    let report = scheduler.tick(t0 + Duration::from_millis(1000)).unwrap();
    assert_eq!(report.total_emitted, 35);
    assert_eq!(scheduler.channel("Channel 1").unwrap().sink().kind(), "fanout");
}

#[test]
fn test_config_referencing_unknown_channel() {
    let dataset = Dataset::from_json(json!({"left": [[1.0]]})).unwrap();

    let err = ReplayScheduler::from_config(&ReplayConfig::default(), &dataset)
        .err()
        .unwrap();
    assert!(err.to_string().contains("dataset has no channel 'ch1'"));
}

#[test]
fn test_config_file_round_trip() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let config = json!({
        "sample_rate_hz": 20.0,
        "max_per_tick": 5,
        "channels": [
            {"name": "Mono", "source": "ch1", "sinks": [{"type": "log", "config": {"level": "info"}}]}
        ]
    });
    file.write_all(config.to_string().as_bytes()).unwrap();

    let config = ReplayConfig::load(file.path()).unwrap();
    assert_eq!(config.sample_rate_hz, 20.0);
    assert_eq!(config.max_per_tick, 5);
    assert_eq!(config.refresh_hz, 60.0);
    assert_eq!(config.channels[0].sinks[0].kind, "log");
}

#[tokio::test]
async fn test_load_bundled_sample_dataset() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/sample_2ch.json");
    let dataset = Dataset::load(&path).await.unwrap();

    assert_eq!(dataset.channel_keys().collect::<Vec<_>>(), vec!["ch1", "ch2"]);
    for key in ["ch1", "ch2"] {
        let channel = dataset.channel(key).unwrap();
        assert_eq!(channel.frame_count(), 120);
        assert_eq!(channel.bins(), 32);
    }

    // Default config maps both demo channels onto this file
    let scheduler = ReplayScheduler::from_config(&ReplayConfig::default(), &dataset).unwrap();
    assert_eq!(scheduler.channels().len(), 2);
}
