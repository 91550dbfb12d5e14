//! Database schema migration management and versioning.
//!
//! Every schema change is a numbered migration recorded in the `migrations`
//! table. Pending migrations run in version order inside one transaction when
//! a [`Db`](super::db::Db) is opened, so the model layer never sees a partially
//! created schema.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use actman::db::migrations::{get_db_version, init_with_migrations};
//! use rusqlite::Connection;
//!
//! let mut conn = Connection::open("actman.db")?;
//! init_with_migrations(&mut conn)?;
//! let version = get_db_version(&conn)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::Result;
use rusqlite::{params, Connection, Transaction};
use tracing::{debug, error, info};

/// Tracking table holding one row per applied migration.
const MIGRATIONS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS migrations (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL UNIQUE,
    name TEXT NOT NULL,
    applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

#[derive(Debug, Clone)]
struct Migration {
    version: u32,
    name: &'static str,
    up: fn(&Transaction) -> Result<()>,
}

/// Ordered registry of every known migration.
pub struct MigrationManager {
    migrations: Vec<Migration>,
}

impl MigrationManager {
    pub fn new() -> Self {
        let mut manager = Self { migrations: Vec::new() };
        manager.register_migrations();
        manager
    }

    fn register_migrations(&mut self) {
        // Version 1: the four model tables.
        // Sibling uniqueness of codes and numbers is also enforced by the schema.
        self.add_migration(1, "create_model_tables", |tx| {
            tx.execute(
                "CREATE TABLE IF NOT EXISTS collaborator (
                    clb_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    clb_login TEXT NOT NULL UNIQUE,
                    clb_first_name TEXT NOT NULL DEFAULT '',
                    clb_last_name TEXT NOT NULL DEFAULT '',
                    clb_is_active BOOLEAN NOT NULL DEFAULT TRUE
                )",
                [],
            )?;

            tx.execute(
                "CREATE TABLE IF NOT EXISTS duration (
                    dur_id INTEGER PRIMARY KEY CHECK (dur_id > 0),
                    dur_is_active BOOLEAN NOT NULL DEFAULT TRUE
                )",
                [],
            )?;

            tx.execute(
                "CREATE TABLE IF NOT EXISTS task (
                    tsk_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    tsk_path TEXT NOT NULL,
                    tsk_number INTEGER NOT NULL,
                    tsk_code TEXT NOT NULL,
                    tsk_name TEXT NOT NULL,
                    tsk_budget INTEGER NOT NULL DEFAULT 0,
                    tsk_initial_cons INTEGER NOT NULL DEFAULT 0,
                    tsk_todo INTEGER NOT NULL DEFAULT 0,
                    tsk_comment TEXT,
                    UNIQUE (tsk_path, tsk_number),
                    UNIQUE (tsk_path, tsk_code)
                )",
                [],
            )?;

            tx.execute(
                "CREATE TABLE IF NOT EXISTS contribution (
                    ctb_year INTEGER NOT NULL,
                    ctb_month INTEGER NOT NULL,
                    ctb_day INTEGER NOT NULL,
                    ctb_contributor INTEGER NOT NULL REFERENCES collaborator (clb_id),
                    ctb_task INTEGER NOT NULL REFERENCES task (tsk_id),
                    ctb_duration INTEGER NOT NULL REFERENCES duration (dur_id),
                    PRIMARY KEY (ctb_year, ctb_month, ctb_day, ctb_contributor, ctb_task)
                )",
                [],
            )?;
            Ok(())
        });

        // Version 2: lookup indexes for sub tree scans and contribution filters
        self.add_migration(2, "add_model_indices", |tx| {
            tx.execute("CREATE INDEX IF NOT EXISTS idx_task_path ON task(tsk_path)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_contribution_task ON contribution(ctb_task)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_contribution_contributor ON contribution(ctb_contributor)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_contribution_duration ON contribution(ctb_duration)", [])?;
            tx.execute(
                "CREATE INDEX IF NOT EXISTS idx_contribution_date ON contribution(ctb_year, ctb_month, ctb_day)",
                [],
            )?;
            Ok(())
        });
    }

    fn add_migration(&mut self, version: u32, name: &'static str, up: fn(&Transaction) -> Result<()>) {
        self.migrations.push(Migration { version, name, up });
    }

    /// Applies every pending migration in one transaction.
    pub fn run_migrations(&self, conn: &mut Connection) -> Result<()> {
        conn.execute(MIGRATIONS_TABLE, [])?;

        let current_version = self.get_current_version(conn)?;
        let pending: Vec<&Migration> = self.migrations.iter().filter(|m| m.version > current_version).collect();

        if pending.is_empty() {
            debug!("database is up to date");
            return Ok(());
        }

        info!(count = pending.len(), "applying pending migrations");
        let tx = conn.transaction()?;

        for migration in pending {
            match (migration.up)(&tx) {
                Ok(()) => {
                    tx.execute(
                        "INSERT INTO migrations (version, name) VALUES (?1, ?2)",
                        params![migration.version, migration.name],
                    )?;
                    info!(version = migration.version, name = migration.name, "migration applied");
                }
                Err(e) => {
                    error!(version = migration.version, name = migration.name, error = %e, "migration failed");
                    return Err(e);
                }
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn get_current_version(&self, conn: &Connection) -> Result<u32> {
        // A missing tracking table means nothing was applied yet
        let version: Option<u32> = conn.query_row("SELECT MAX(version) FROM migrations", [], |row| row.get(0)).unwrap_or(None);
        Ok(version.unwrap_or(0))
    }

    pub fn is_migration_applied(&self, conn: &Connection, version: u32) -> Result<bool> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM migrations WHERE version = ?1", params![version], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Applied migrations as `(version, name, applied_at)`, oldest first.
    pub fn get_migration_history(&self, conn: &Connection) -> Result<Vec<(u32, String, String)>> {
        let mut stmt = conn.prepare("SELECT version, name, applied_at FROM migrations ORDER BY version")?;
        let history = stmt
            .query_map([], |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(history)
    }

    pub fn latest_version(&self) -> u32 {
        self.migrations.last().map(|m| m.version).unwrap_or(0)
    }
}

impl Default for MigrationManager {
    fn default() -> Self {
        Self::new()
    }
}

pub fn init_with_migrations(conn: &mut Connection) -> Result<()> {
    MigrationManager::new().run_migrations(conn)
}

pub fn get_db_version(conn: &Connection) -> Result<u32> {
    MigrationManager::new().get_current_version(conn)
}

pub fn needs_migration(conn: &Connection) -> Result<bool> {
    let manager = MigrationManager::new();
    let current = manager.get_current_version(conn)?;
    Ok(current < manager.latest_version())
}
