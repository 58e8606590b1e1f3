use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use shared::domain::UserId;
use tracing::warn;

pub const SETTINGS_FILE: &str = "dashboard.toml";
pub const DEFAULT_API_BASE_URL: &str = "https://1431ffb63976.ngrok-free.app";
pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub page_size: u32,
    pub request_timeout_secs: u64,
    /// Send `ngrok-skip-browser-warning` so the tunnel does not answer with
    /// its HTML interstitial.
    pub tunnel_bypass_header: bool,
    pub actor_user_id: UserId,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: 30,
            tunnel_bypass_header: true,
            actor_user_id: UserId::new("1"),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    page_size: Option<u32>,
    request_timeout_secs: Option<u64>,
    tunnel_bypass_header: Option<bool>,
    actor_user_id: Option<String>,
}

pub fn load_settings() -> Settings {
    load_settings_with(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the TOML file at `path` if it exists, then environment
/// variables looked up through `env`.
pub fn load_settings_with(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file(&mut settings, file_cfg),
            Err(err) => warn!(path = %path.display(), error = %err, "ignoring unreadable settings file"),
        }
    }

    if let Some(v) = env("DASHBOARD_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("APP__PAGE_SIZE") {
        match v.parse::<u32>() {
            Ok(parsed) if parsed > 0 => settings.page_size = parsed,
            _ => warn!(value = %v, "ignoring invalid APP__PAGE_SIZE"),
        }
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) if parsed > 0 => settings.request_timeout_secs = parsed,
            _ => warn!(value = %v, "ignoring invalid APP__REQUEST_TIMEOUT_SECS"),
        }
    }

    if let Some(v) = env("APP__TUNNEL_BYPASS") {
        if let Some(parsed) = parse_flag(&v) {
            settings.tunnel_bypass_header = parsed;
        }
    }

    if let Some(v) = env("APP__ACTOR_USER_ID") {
        settings.actor_user_id = UserId::new(v);
    }

    settings.api_base_url = normalize_base_url(&settings.api_base_url);
    settings
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.page_size.filter(|size| *size > 0) {
        settings.page_size = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs.filter(|secs| *secs > 0) {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = file_cfg.tunnel_bypass_header {
        settings.tunnel_bypass_header = v;
    }
    if let Some(v) = file_cfg.actor_user_id {
        settings.actor_user_id = UserId::new(v);
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub(crate) fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Settings::default().api_base_url;
    }
    trimmed.to_string()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
