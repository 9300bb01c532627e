// SQLite key-value storage backend

use crate::ids::now;
use crate::storage::{Storage, validate_key};
use eyre::{Context, Result, eyre};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Entries kept in a single `entries` table of a SQLite database
pub struct SqliteStorage {
    db: Mutex<Connection>,
}

impl SqliteStorage {
    /// Open or create the database file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }
        let db = Connection::open(path.as_ref()).context("Failed to open SQLite database")?;
        Self::with_connection(db)
    }

    /// Database that lives only as long as this value
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        Self::with_connection(db)
    }

    fn with_connection(db: Connection) -> Result<Self> {
        let storage = Self { db: Mutex::new(db) };
        storage.create_schema()?;
        Ok(storage)
    }

    fn create_schema(&self) -> Result<()> {
        debug!("Creating database schema");

        self.db()?.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        Ok(())
    }

    fn db(&self) -> Result<MutexGuard<'_, Connection>> {
        self.db.lock().map_err(|_| eyre!("SQLite connection lock poisoned"))
    }
}

impl Storage for SqliteStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;

        let value: Option<String> = self
            .db()?
            .query_row("SELECT value FROM entries WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;

        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;

        self.db()?.execute(
            "INSERT OR REPLACE INTO entries (key, value, updated_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![key, value, now().timestamp_millis()],
        )?;

        debug!(key, bytes = value.len(), "set_item: entry written");
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.db()?.execute("DELETE FROM entries WHERE key = ?1", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_in_memory_get_set_remove() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        assert_eq!(storage.get_item("taskflow_users").unwrap(), None);

        storage.set_item("taskflow_users", "[]").unwrap();
        storage.set_item("taskflow_users", "[1]").unwrap();
        assert_eq!(storage.get_item("taskflow_users").unwrap().as_deref(), Some("[1]"));

        storage.remove_item("taskflow_users").unwrap();
        assert_eq!(storage.get_item("taskflow_users").unwrap(), None);
    }

    #[test]
    fn test_entries_survive_reopen() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("data").join("taskflow.db");

        SqliteStorage::open(&db_path)
            .unwrap()
            .set_item("taskflow_tasks", "[]")
            .unwrap();
        assert!(db_path.exists());

        let reopened = SqliteStorage::open(&db_path).unwrap();
        assert_eq!(reopened.get_item("taskflow_tasks").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_rejects_invalid_key() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        assert!(storage.set_item("", "x").is_err());
    }
}
