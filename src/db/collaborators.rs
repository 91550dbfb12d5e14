//! Collaborator persistence.
//!
//! Logins are unique; the repository reports duplicates as plain lookups so
//! the model manager can reject them before touching the table.

use crate::libs::collaborator::{Collaborator, CollaboratorQuery};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use tracing::debug;

const INSERT_COLLABORATOR: &str = "INSERT INTO collaborator (clb_login, clb_first_name, clb_last_name, clb_is_active) VALUES (?1, ?2, ?3, ?4)";
const UPDATE_COLLABORATOR: &str = "UPDATE collaborator SET clb_login = ?2, clb_first_name = ?3, clb_last_name = ?4, clb_is_active = ?5 WHERE clb_id = ?1";
const DELETE_COLLABORATOR: &str = "DELETE FROM collaborator WHERE clb_id = ?1";
const SELECT_COLLABORATORS: &str = "SELECT clb_id, clb_login, clb_first_name, clb_last_name, clb_is_active FROM collaborator";
const WHERE_ID: &str = "WHERE clb_id = ?1";
const WHERE_LOGIN: &str = "WHERE clb_login = ?1";
const WHERE_ACTIVE: &str = "WHERE clb_is_active = 1";
const COUNT_COLLABORATORS: &str = "SELECT COUNT(*) FROM collaborator";

pub struct Collaborators<'a> {
    conn: &'a Connection,
}

impl<'a> Collaborators<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Collaborators { conn }
    }

    /// Inserts the collaborator and returns it with its generated id.
    pub fn insert(&self, collaborator: &Collaborator) -> Result<Collaborator> {
        debug!(login = %collaborator.login, "inserting collaborator");
        self.conn.execute(
            INSERT_COLLABORATOR,
            params![collaborator.login, collaborator.first_name, collaborator.last_name, collaborator.is_active],
        )?;
        Ok(Collaborator {
            id: self.conn.last_insert_rowid(),
            ..collaborator.clone()
        })
    }

    pub fn update(&self, collaborator: &Collaborator) -> Result<usize> {
        debug!(id = collaborator.id, login = %collaborator.login, "updating collaborator");
        self.conn.execute(
            UPDATE_COLLABORATOR,
            params![
                collaborator.id,
                collaborator.login,
                collaborator.first_name,
                collaborator.last_name,
                collaborator.is_active
            ],
        )
    }

    pub fn delete(&self, id: i64) -> Result<usize> {
        debug!(id, "deleting collaborator");
        self.conn.execute(DELETE_COLLABORATOR, params![id])
    }

    pub fn get(&self, id: i64) -> Result<Option<Collaborator>> {
        self.conn
            .query_row(&format!("{} {}", SELECT_COLLABORATORS, WHERE_ID), params![id], map_collaborator)
            .optional()
    }

    pub fn get_by_login(&self, login: &str) -> Result<Option<Collaborator>> {
        self.conn
            .query_row(&format!("{} {}", SELECT_COLLABORATORS, WHERE_LOGIN), params![login], map_collaborator)
            .optional()
    }

    /// Sorted, optionally paged, selection.
    pub fn fetch(&self, query: &CollaboratorQuery) -> Result<Vec<Collaborator>> {
        let mut sql = SELECT_COLLABORATORS.to_string();
        if query.only_active {
            sql.push(' ');
            sql.push_str(WHERE_ACTIVE);
        }
        sql.push_str(&format!(
            " ORDER BY {} {}",
            query.order_by.column(),
            if query.ascending { "ASC" } else { "DESC" }
        ));
        // Secondary key keeps pages stable when the primary one has duplicates
        if query.order_by.column() != "clb_id" {
            sql.push_str(", clb_id ASC");
        }
        match (query.limit, query.offset) {
            (Some(limit), offset) => sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset.unwrap_or(0))),
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {}", offset)),
            (None, None) => {}
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let collaborator_iter = stmt.query_map([], map_collaborator)?;
        let mut collaborators = Vec::new();
        for collaborator in collaborator_iter {
            collaborators.push(collaborator?);
        }
        Ok(collaborators)
    }

    pub fn count(&self, only_active: bool) -> Result<i64> {
        let sql = if only_active {
            format!("{} {}", COUNT_COLLABORATORS, WHERE_ACTIVE)
        } else {
            COUNT_COLLABORATORS.to_string()
        };
        self.conn.query_row(&sql, [], |row| row.get(0))
    }
}

pub(crate) fn map_collaborator(row: &Row<'_>) -> Result<Collaborator> {
    Ok(Collaborator {
        id: row.get(0)?,
        login: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        is_active: row.get(4)?,
    })
}
