use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use shared::protocol::UPLOAD_PATH;
use tracing::{debug, warn};
use url::Url;

use crate::error::SettingsError;

pub const SETTINGS_FILE: &str = "dashboard.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub server_url: String,
    /// Joined to `server_url` as a URL reference: a leading `/` replaces any
    /// path on `server_url`, a relative path (`api/upload`) is appended to a
    /// `server_url` ending in `/`.
    pub upload_path: String,
    /// Joined like `upload_path`.
    pub feed_path: String,
    pub feed_reconnect_delay_ms: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            upload_path: UPLOAD_PATH.into(),
            feed_path: "/ws".into(),
            feed_reconnect_delay_ms: 2000,
        }
    }
}

impl ClientSettings {
    pub fn base_url(&self) -> Result<Url, SettingsError> {
        let url = Url::parse(self.server_url.trim()).map_err(|source| SettingsError::InvalidUrl {
            value: self.server_url.clone(),
            source,
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(SettingsError::UnsupportedScheme(self.server_url.clone())),
        }
    }

    pub fn upload_url(&self) -> Result<Url, SettingsError> {
        self.join(&self.upload_path)
    }

    /// Websocket endpoint of the live feed (`http` -> `ws`, `https` -> `wss`).
    pub fn feed_url(&self) -> Result<String, SettingsError> {
        let joined = self.join(&self.feed_path)?.to_string();
        websocket_url(&joined)
    }

    pub fn feed_reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.feed_reconnect_delay_ms)
    }

    fn join(&self, path: &str) -> Result<Url, SettingsError> {
        self.base_url()?
            .join(path)
            .map_err(|source| SettingsError::InvalidUrl {
                value: path.to_string(),
                source,
            })
    }
}

pub fn websocket_url(server_url: &str) -> Result<String, SettingsError> {
    if server_url.starts_with("https://") {
        Ok(server_url.replacen("https://", "wss://", 1))
    } else if server_url.starts_with("http://") {
        Ok(server_url.replacen("http://", "ws://", 1))
    } else {
        Err(SettingsError::UnsupportedScheme(server_url.to_string()))
    }
}

/// Defaults, then `dashboard.toml` in the working directory, then the environment.
pub fn load_settings() -> Result<ClientSettings, SettingsError> {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings, SettingsError> {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<ClientSettings>(&raw).map_err(|source| SettingsError::File {
            path: path.display().to_string(),
            source,
        })?,
        Err(err) => {
            debug!(path = %path.display(), %err, "settings file not read; using defaults");
            ClientSettings::default()
        }
    };

    if let Some(v) = env("SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__UPLOAD_PATH") {
        settings.upload_path = v;
    }
    if let Some(v) = env("APP__FEED_PATH") {
        settings.feed_path = v;
    }
    if let Some(v) = env("APP__FEED_RECONNECT_DELAY_MS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.feed_reconnect_delay_ms = parsed,
            Err(err) => warn!(value = %v, %err, "ignoring invalid APP__FEED_RECONNECT_DELAY_MS"),
        }
    }

    settings.base_url()?;
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
