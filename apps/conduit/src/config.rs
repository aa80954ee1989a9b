use std::{collections::HashMap, fs, path::PathBuf};

use conduit_core::LoadPolicy;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "conduit.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub start_location: String,
    pub fixtures_path: Option<PathBuf>,
    pub session_path: Option<PathBuf>,
    pub load_policy: LoadPolicy,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_location: "/".into(),
            fixtures_path: None,
            session_path: None,
            load_policy: LoadPolicy::default(),
            log_filter: "info".into(),
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();
    if let Ok(raw) = fs::read_to_string(CONFIG_FILE) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |name| std::env::var(name).ok());
    settings
}

/// Flat `key = "value"` table; unknown keys and unparsable files are ignored.
pub fn apply_file(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) else {
        return;
    };
    if let Some(v) = file_cfg.get("start_location") {
        settings.start_location = v.clone();
    }
    if let Some(v) = file_cfg.get("fixtures_path") {
        settings.fixtures_path = Some(PathBuf::from(v));
    }
    if let Some(v) = file_cfg.get("session_path") {
        settings.session_path = Some(PathBuf::from(v));
    }
    if let Some(policy) = file_cfg.get("load_policy").and_then(|v| v.parse().ok()) {
        settings.load_policy = policy;
    }
    if let Some(v) = file_cfg.get("log_filter") {
        settings.log_filter = v.clone();
    }
}

/// `CONDUIT_*` names first, then `APP__*` names, so the latter win.
pub fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    let lookup = |short: &str, long: &str| var(long).or_else(|| var(short));

    if let Some(v) = lookup("CONDUIT_LOCATION", "APP__START_LOCATION") {
        settings.start_location = v;
    }
    if let Some(v) = lookup("CONDUIT_FIXTURES", "APP__FIXTURES_PATH") {
        settings.fixtures_path = Some(PathBuf::from(v));
    }
    if let Some(v) = lookup("CONDUIT_SESSION", "APP__SESSION_PATH") {
        settings.session_path = Some(PathBuf::from(v));
    }
    if let Some(policy) =
        lookup("CONDUIT_LOAD_POLICY", "APP__LOAD_POLICY").and_then(|v| v.parse().ok())
    {
        settings.load_policy = policy;
    }
    if let Some(v) = lookup("RUST_LOG", "APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
