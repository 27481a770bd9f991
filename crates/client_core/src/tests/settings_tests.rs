use super::*;

use std::collections::HashMap;

fn no_env(_: &str) -> Option<String> {
    None
}

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let settings =
        load_settings_from(&dir.path().join("dashboard.toml"), no_env).expect("settings");
    assert_eq!(settings, ClientSettings::default());
    assert_eq!(
        settings.upload_url().expect("upload url").as_str(),
        "http://127.0.0.1:5000/api/upload"
    );
}

#[test]
fn file_overrides_defaults_and_env_overrides_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("dashboard.toml");
    fs::write(
        &path,
        "server_url = \"http://vision.local:8000\"\nfeed_reconnect_delay_ms = 250\n",
    )
    .expect("write settings");

    let from_file = load_settings_from(&path, no_env).expect("settings");
    assert_eq!(from_file.server_url, "http://vision.local:8000");
    assert_eq!(from_file.feed_reconnect_delay(), Duration::from_millis(250));
    assert_eq!(from_file.feed_path, "/ws");

    let env = env_from(&[
        ("SERVER_URL", "http://ignored:1"),
        ("APP__SERVER_URL", "https://vision.example.com"),
        ("APP__FEED_RECONNECT_DELAY_MS", "not-a-number"),
    ]);
    let from_env = load_settings_from(&path, env).expect("settings");
    assert_eq!(from_env.server_url, "https://vision.example.com");
    assert_eq!(from_env.feed_reconnect_delay_ms, 250);
}

#[test]
fn malformed_file_is_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("dashboard.toml");
    fs::write(&path, "server_url = [").expect("write settings");

    let err = load_settings_from(&path, no_env).expect_err("should fail");
    assert!(matches!(err, SettingsError::File { .. }));
}

#[test]
fn rejects_non_http_server_url() {
    let dir = tempfile::tempdir().expect("temp dir");
    let env = env_from(&[("APP__SERVER_URL", "ftp://files.local")]);
    let err = load_settings_from(&dir.path().join("none.toml"), env).expect_err("should fail");
    assert!(matches!(err, SettingsError::UnsupportedScheme(_)));
}

#[test]
fn feed_url_switches_to_websocket_scheme() {
    let plain = ClientSettings::default();
    assert_eq!(plain.feed_url().expect("feed url"), "ws://127.0.0.1:5000/ws");

    let tls = ClientSettings {
        server_url: "https://vision.example.com".into(),
        ..ClientSettings::default()
    };
    assert_eq!(tls.feed_url().expect("feed url"), "wss://vision.example.com/ws");
}

#[test]
fn websocket_url_requires_http_scheme() {
    assert!(websocket_url("localhost:5000").is_err());
}

#[test]
fn absolute_paths_replace_a_server_path_prefix() {
    let prefixed = ClientSettings {
        server_url: "http://vision.local/vision/".into(),
        ..ClientSettings::default()
    };
    assert_eq!(
        prefixed.upload_url().expect("upload url").as_str(),
        "http://vision.local/api/upload"
    );
    assert_eq!(prefixed.feed_url().expect("feed url"), "ws://vision.local/ws");

    let relative = ClientSettings {
        upload_path: "api/upload".into(),
        feed_path: "ws".into(),
        ..prefixed
    };
    assert_eq!(
        relative.upload_url().expect("upload url").as_str(),
        "http://vision.local/vision/api/upload"
    );
    assert_eq!(
        relative.feed_url().expect("feed url"),
        "ws://vision.local/vision/ws"
    );
}
