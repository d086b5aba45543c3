use std::{collections::HashMap, fs, path::PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub database_url: String,
    pub session_secret: String,
    pub session_ttl_seconds: i64,
    pub media_root: PathBuf,
    pub debug: bool,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8000".into(),
            database_url: "sqlite://./data/site.db".into(),
            session_secret: "devsecret".into(),
            session_ttl_seconds: 86_400,
            media_root: PathBuf::from("./media"),
            debug: false,
            log_level: "info".into(),
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("server.toml") {
        apply_file(&mut settings, &raw);
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

/// Applies `server.toml` values. Unknown keys and unparsable values are
/// ignored.
fn apply_file(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(raw) else {
        return;
    };
    let text = |key: &str| file_cfg.get(key).and_then(|v| v.as_str()).map(str::to_owned);

    if let Some(v) = text("bind_addr") {
        settings.server_bind = v;
    }
    if let Some(v) = text("database_url") {
        settings.database_url = v;
    }
    if let Some(v) = text("session_secret") {
        settings.session_secret = v;
    }
    if let Some(v) = file_cfg.get("session_ttl_seconds").and_then(|v| v.as_integer()) {
        settings.session_ttl_seconds = v;
    }
    if let Some(v) = text("media_root") {
        settings.media_root = PathBuf::from(v);
    }
    if let Some(v) = file_cfg.get("debug").and_then(|v| v.as_bool()) {
        settings.debug = v;
    }
    if let Some(v) = text("log_level") {
        settings.log_level = v;
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = var("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = var("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = var("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = var("APP__SESSION_SECRET") {
        settings.session_secret = v;
    }
    if let Some(parsed) = var("APP__SESSION_TTL_SECONDS").and_then(|v| v.parse::<i64>().ok()) {
        settings.session_ttl_seconds = parsed;
    }

    if let Some(v) = var("APP__MEDIA_ROOT") {
        settings.media_root = PathBuf::from(v);
    }
    if let Some(v) = var("APP__DEBUG") {
        settings.debug = matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
    }
    if let Some(v) = var("APP__LOG_LEVEL") {
        settings.log_level = v;
    }
}

pub fn prepare_database_url(raw_database_url: &str) -> anyhow::Result<String> {
    storage::prepare_database_url(&database_url_or_default(raw_database_url))
}

fn database_url_or_default(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();
    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }
    raw_database_url.to_string()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
