use super::migrations::init_with_migrations;
use crate::libs::data_storage::DataStorage;
use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub const DB_FILE_NAME: &str = "actman.db";

/// Tables the model layer needs.
pub const MODEL_TABLES: [&str; 4] = ["collaborator", "duration", "task", "contribution"];

pub struct Db {
    pub conn: Connection,
}

impl Db {
    /// Opens the database stored in the per-user data directory.
    pub fn new() -> Result<Db> {
        let db_file_path = DataStorage::new().get_path(DB_FILE_NAME)?;
        Self::open(db_file_path)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Db> {
        debug!(path = %path.as_ref().display(), "opening database");
        let conn = Connection::open(path)?;
        Self::bootstrap(conn)
    }

    pub fn open_in_memory() -> Result<Db> {
        debug!("opening in-memory database");
        let conn = Connection::open_in_memory()?;
        Self::bootstrap(conn)
    }

    fn bootstrap(mut conn: Connection) -> Result<Db> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        init_with_migrations(&mut conn)?;
        Ok(Db { conn })
    }

    pub fn table_exists(&self, name: &str) -> rusqlite::Result<bool> {
        table_exists(&self.conn, name)
    }

    /// Tells whether every model table is present.
    pub fn tables_exist(&self) -> rusqlite::Result<bool> {
        for table in MODEL_TABLES {
            if !self.table_exists(table)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Creates the model tables if they are missing.
    pub fn create_tables(&mut self) -> Result<()> {
        init_with_migrations(&mut self.conn)
    }
}

pub fn table_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        [name],
        |row| row.get(0),
    )
}
