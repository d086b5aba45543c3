use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;

use shared::domain::{Actor, UserId};

mod content;
mod leads;

pub use content::SeedReport;
pub use leads::MarkOutcome;

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

/// A table that the site reads as "the one record" does not hold exactly
/// one row.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SingletonError {
    #[error("singleton table `{table}` is empty; seed exactly one row")]
    Missing { table: &'static str },
    #[error("singleton table `{table}` holds {count} rows; expected exactly one")]
    Duplicated { table: &'static str, count: i64 },
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn create_user(&self, username: &str) -> Result<UserId> {
        let rec = sqlx::query(
            "INSERT INTO users (username) VALUES (?)
             ON CONFLICT(username) DO UPDATE SET username=excluded.username
             RETURNING id",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(UserId(rec.get::<i64, _>(0)))
    }

    pub async fn user_id_for_username(&self, username: &str) -> Result<Option<UserId>> {
        let row = sqlx::query("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| UserId(r.get::<i64, _>(0))))
    }

    pub async fn add_user_to_group(&self, user_id: UserId, group_name: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO user_groups (user_id, group_name) VALUES (?, ?)
             ON CONFLICT(user_id, group_name) DO NOTHING",
        )
        .bind(user_id.0)
        .bind(group_name)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to add user {} to group '{group_name}'", user_id.0))?;
        Ok(())
    }

    pub async fn remove_user_from_group(&self, user_id: UserId, group_name: &str) -> Result<()> {
        sqlx::query("DELETE FROM user_groups WHERE user_id = ? AND group_name = ?")
            .bind(user_id.0)
            .bind(group_name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Loads a user together with the groups they belong to.
    pub async fn load_actor(&self, user_id: UserId) -> Result<Option<Actor>> {
        let Some(user) = sqlx::query("SELECT username FROM users WHERE id = ?")
            .bind(user_id.0)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let groups = sqlx::query(
            "SELECT group_name FROM user_groups WHERE user_id = ? ORDER BY group_name ASC",
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|r| r.get::<String, _>(0))
        .collect();

        Ok(Some(Actor {
            user_id,
            username: user.get::<String, _>(0),
            groups,
        }))
    }

    /// Fetches the single row of `table`, failing with [`SingletonError`]
    /// when the table is empty or holds more than one row.
    async fn singleton_row(&self, table: &'static str, columns: &str) -> Result<SqliteRow> {
        let mut rows = sqlx::query(&format!("SELECT {columns} FROM {table} LIMIT 2"))
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("failed to read singleton table `{table}`"))?;

        match rows.len() {
            0 => Err(SingletonError::Missing { table }.into()),
            1 => Ok(rows.remove(0)),
            _ => {
                let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
                    .fetch_one(&self.pool)
                    .await?;
                Err(SingletonError::Duplicated { table, count }.into())
            }
        }
    }
}

/// Turns a bare file path or `sqlite:path` into a `sqlite://` URL and makes
/// sure the database file's directory exists.
pub fn prepare_database_url(raw_database_url: &str) -> Result<String> {
    let database_url = normalize_database_url(raw_database_url);
    ensure_sqlite_parent_dir_exists(&database_url)?;
    Ok(database_url)
}

fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();
    if raw_database_url.starts_with("sqlite::memory:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    let path = raw_database_url
        .strip_prefix("sqlite:")
        .unwrap_or(raw_database_url);
    format!("sqlite://{}", path.replace('\\', "/"))
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
