use super::{load_settings_with, normalize_base_url, Settings};

use std::{
    collections::HashMap,
    env, fs,
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn missing_file_and_env_yield_defaults() {
    let settings = load_settings_with(Path::new("/nonexistent/dashboard.toml"), no_env);
    assert_eq!(settings, Settings::default());
}

#[test]
fn file_values_override_defaults_and_env_overrides_file() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("dashboard_config_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("dashboard.toml");
    fs::write(
        &path,
        "api_base_url = \"http://file.example/\"\npage_size = 50\ntunnel_bypass_header = false\n",
    )
    .expect("write settings");

    let from_file = load_settings_with(&path, no_env);
    assert_eq!(from_file.api_base_url, "http://file.example");
    assert_eq!(from_file.page_size, 50);
    assert!(!from_file.tunnel_bypass_header);

    let env_vars: HashMap<&str, &str> = HashMap::from([
        ("APP__API_BASE_URL", "http://env.example"),
        ("APP__ACTOR_USER_ID", "3"),
        ("APP__TUNNEL_BYPASS", "yes"),
    ]);
    let layered = load_settings_with(&path, |key| env_vars.get(key).map(|v| v.to_string()));
    assert_eq!(layered.api_base_url, "http://env.example");
    assert_eq!(layered.page_size, 50);
    assert_eq!(layered.actor_user_id.as_str(), "3");
    assert!(layered.tunnel_bypass_header);

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn invalid_page_size_from_env_is_ignored() {
    let settings = load_settings_with(Path::new("/nonexistent/dashboard.toml"), |key| {
        (key == "APP__PAGE_SIZE").then(|| "0".to_string())
    });
    assert_eq!(settings.page_size, Settings::default().page_size);
}

#[test]
fn zero_request_timeout_is_ignored() {
    let from_env = load_settings_with(Path::new("/nonexistent/dashboard.toml"), |key| {
        (key == "APP__REQUEST_TIMEOUT_SECS").then(|| "0".to_string())
    });
    assert_eq!(from_env.request_timeout_secs, 30);
    assert!(!from_env.request_timeout().is_zero());

    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("dashboard_timeout_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("dashboard.toml");
    fs::write(&path, "request_timeout_secs = 0\n").expect("write settings");

    let from_file = load_settings_with(&path, no_env);
    assert_eq!(from_file.request_timeout_secs, 30);

    let env_wins = load_settings_with(&path, |key| {
        (key == "APP__REQUEST_TIMEOUT_SECS").then(|| "5".to_string())
    });
    assert_eq!(env_wins.request_timeout_secs, 5);

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn blank_base_url_falls_back_to_default() {
    assert_eq!(normalize_base_url("   "), Settings::default().api_base_url);
    assert_eq!(normalize_base_url("http://x.test//"), "http://x.test");
}
