use serde_json::json;
use serial_test::serial;
use std::env;
use std::fs;
use stream_player::config::AppConfig;
use stream_player::stream::StreamType;

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        env::remove_var("STREAM_PLAYER_CONFIG");
        env::remove_var("STREAM_PLAYER__PLAYER__LOG_LIMIT");
        env::remove_var("STREAM_PLAYER__PLAYER__TYPE");
        env::remove_var("STREAM_PLAYER__TELEMETRY__JSON");
    }
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = AppConfig::load_from_args(["stream-player"]).expect("Failed to load config");
    assert_eq!(config.player.kind, StreamType::Sse);
    assert_eq!(config.player.log_limit, 500);
    assert!(!config.player.auto_open);
    assert!(config.player.controls);
    assert!(config.player.plays_inline);
    assert!(config.player.config.is_empty());
    assert!(!config.telemetry.json);
    assert!(!config.output.emit_events);
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    unsafe {
        env::set_var("STREAM_PLAYER__PLAYER__LOG_LIMIT", "25");
        env::set_var("STREAM_PLAYER__PLAYER__TYPE", "websocket");
        env::set_var("STREAM_PLAYER__TELEMETRY__JSON", "true");
    }

    let config = AppConfig::load_from_args(["stream-player"]).expect("Failed to load config");
    assert_eq!(config.player.log_limit, 25);
    assert_eq!(config.player.kind, StreamType::WebSocket);
    assert!(config.telemetry.json);

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let config_content = r#"
player:
  type: hls
  auto_open: true
  muted: true
  config:
    url: https://cdn.example/live.m3u8
    latency: low
  video_attrs:
    poster: /poster.png
    crossorigin: anonymous
telemetry:
  filter: warn
"#;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = dir.path().join("player.yaml");
    fs::write(&file_path, config_content).expect("Failed to write temp config");

    let config = AppConfig::load_from_args([
        "stream-player",
        "--config",
        file_path.to_str().unwrap(),
    ])
    .expect("Failed to load config from file");

    assert_eq!(config.player.kind, StreamType::Hls);
    assert!(config.player.auto_open);
    assert!(config.player.muted);
    assert_eq!(
        config.player.config.get("url"),
        Some(&json!("https://cdn.example/live.m3u8"))
    );
    assert_eq!(config.player.config.get("latency"), Some(&json!("low")));
    assert_eq!(config.player.video_attrs.poster.as_deref(), Some("/poster.png"));
    assert_eq!(
        config.player.video_attrs.extra.get("crossorigin").map(String::as_str),
        Some("anonymous")
    );
    assert_eq!(config.telemetry.filter, "warn");
}

#[test]
#[serial]
fn test_config_file_from_env() {
    clear_env_vars();

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = dir.path().join("player.yaml");
    fs::write(&file_path, "player:\n  log_limit: 7\n").expect("Failed to write temp config");

    unsafe {
        env::set_var("STREAM_PLAYER_CONFIG", &file_path);
    }

    let config = AppConfig::load_from_args(["stream-player"]).expect("Failed to load config");
    assert_eq!(config.player.log_limit, 7);

    clear_env_vars();
}

#[test]
#[serial]
fn test_cli_overrides_env_and_file() {
    clear_env_vars();

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = dir.path().join("player.yaml");
    fs::write(&file_path, "player:\n  type: sse\n  log_limit: 7\n")
        .expect("Failed to write temp config");

    unsafe {
        env::set_var("STREAM_PLAYER__PLAYER__LOG_LIMIT", "25");
    }

    let config = AppConfig::load_from_args([
        "stream-player",
        "--config",
        file_path.to_str().unwrap(),
        "--type",
        "long-polling",
        "--url",
        "https://api.example/poll",
        "--log-limit",
        "3",
        "--auto-open",
        "true",
        "--emit-events",
    ])
    .expect("Failed to load config");

    assert_eq!(config.player.kind, StreamType::LongPolling);
    assert_eq!(config.player.log_limit, 3);
    assert!(config.player.auto_open);
    assert!(config.output.emit_events);
    assert_eq!(
        config.player.config.get("url"),
        Some(&json!("https://api.example/poll"))
    );

    clear_env_vars();
}

#[test]
#[serial]
fn test_cli_stream_type_is_case_insensitive() {
    clear_env_vars();

    let config = AppConfig::load_from_args(["stream-player", "--type", "SSE"])
        .expect("Failed to load config");
    assert_eq!(config.player.kind, StreamType::Sse);

    let config = AppConfig::load_from_args(["stream-player", "-t", " WebRTC "])
        .expect("Failed to load config");
    assert_eq!(config.player.kind, StreamType::WebRtc);
}

#[test]
#[serial]
fn test_unknown_stream_type_is_rejected() {
    clear_env_vars();

    let result = AppConfig::load_from_args(["stream-player", "--type", "carrier-pigeon"]);
    assert!(result.is_err());
}
