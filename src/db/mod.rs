//! Database layer for actman.
//!
//! SQLite persistence for the four model entities. [`db::Db`] owns the
//! connection and applies migrations; each repository borrows a connection
//! (usually a transaction through `Deref`) and runs plain statements without
//! checking any business rule.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use actman::db::{collaborators::Collaborators, db::Db};
//! use actman::libs::collaborator::Collaborator;
//!
//! let mut db = Db::open_in_memory()?;
//! let tx = db.conn.transaction()?;
//! let john = Collaborators::new(&tx).insert(&Collaborator::new("jdoe", "John", "Doe"))?;
//! tx.commit()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

/// Connection management and schema bootstrap.
pub mod db;

/// Versioned schema migrations.
pub mod migrations;

pub mod collaborators;
pub mod contributions;
pub mod durations;
pub mod tasks;
