use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_root(label: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    env::temp_dir().join(format!("kindergarten_{label}_{suffix}"))
}

#[test]
fn blank_database_url_falls_back_to_default() {
    assert_eq!(
        database_url_or_default("  "),
        Settings::default().database_url
    );
    assert_eq!(
        database_url_or_default(" sqlite://./data/test.db "),
        "sqlite://./data/test.db"
    );
}

#[test]
fn creates_parent_dir_for_sqlite_url() {
    let root = temp_root("config");
    let db_path = root.join("data").join("test.db");

    prepare_database_url(db_path.to_string_lossy().as_ref()).expect("prepare db url");
    assert!(root.join("data").exists());

    fs::remove_dir_all(root).expect("cleanup");
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
bind_addr = "0.0.0.0:9000"
session_ttl_seconds = 120
debug = true
media_root = "/srv/media"
unknown = 1
"#,
    );
    assert_eq!(settings.server_bind, "0.0.0.0:9000");
    assert_eq!(settings.session_ttl_seconds, 120);
    assert!(settings.debug);
    assert_eq!(settings.media_root, PathBuf::from("/srv/media"));
    assert_eq!(settings.log_level, "info");
}

#[test]
fn prefixed_env_vars_win_over_plain_ones() {
    let mut settings = Settings::default();
    let vars: HashMap<&str, &str> = HashMap::from([
        ("SERVER_BIND", "127.0.0.1:1"),
        ("APP__BIND_ADDR", "127.0.0.1:2"),
        ("DATABASE_URL", "sqlite://plain.db"),
        ("APP__SESSION_TTL_SECONDS", "not-a-number"),
        ("APP__DEBUG", "TRUE"),
        ("APP__LOG_LEVEL", "debug"),
    ]);
    apply_env(&mut settings, |key| vars.get(key).map(|v| v.to_string()));

    assert_eq!(settings.server_bind, "127.0.0.1:2");
    assert_eq!(settings.database_url, "sqlite://plain.db");
    assert_eq!(settings.session_ttl_seconds, 86_400);
    assert!(settings.debug);
    assert_eq!(settings.log_level, "debug");
}

#[tokio::test]
async fn prepared_database_url_creates_openable_sqlite_file() {
    let root = temp_root("open");
    let db_path = root.join("nested").join("site.db");

    let prepared = prepare_database_url(db_path.to_string_lossy().as_ref()).expect("prepare");
    let storage = storage::Storage::new(&prepared).await.expect("open sqlite");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should be created: {}",
        db_path.display()
    );

    fs::remove_dir_all(root).expect("cleanup");
}
