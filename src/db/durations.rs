use crate::libs::duration::Duration;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use tracing::debug;

const INSERT_DURATION: &str = "INSERT INTO duration (dur_id, dur_is_active) VALUES (?1, ?2)";
const UPDATE_DURATION: &str = "UPDATE duration SET dur_is_active = ?2 WHERE dur_id = ?1";
const DELETE_DURATION: &str = "DELETE FROM duration WHERE dur_id = ?1";
const SELECT_DURATIONS: &str = "SELECT dur_id, dur_is_active FROM duration";
const WHERE_ID: &str = "WHERE dur_id = ?1";
const WHERE_ACTIVE: &str = "WHERE dur_is_active = 1";
const ORDER_BY_ID: &str = "ORDER BY dur_id ASC";

pub struct Durations<'a> {
    conn: &'a Connection,
}

impl<'a> Durations<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Durations { conn }
    }

    pub fn insert(&self, duration: &Duration) -> Result<Duration> {
        debug!(id = duration.id, "inserting duration");
        self.conn.execute(INSERT_DURATION, params![duration.id, duration.is_active])?;
        Ok(*duration)
    }

    pub fn update(&self, duration: &Duration) -> Result<usize> {
        debug!(id = duration.id, active = duration.is_active, "updating duration");
        self.conn.execute(UPDATE_DURATION, params![duration.id, duration.is_active])
    }

    pub fn delete(&self, id: i64) -> Result<usize> {
        debug!(id, "deleting duration");
        self.conn.execute(DELETE_DURATION, params![id])
    }

    pub fn get(&self, id: i64) -> Result<Option<Duration>> {
        self.conn
            .query_row(&format!("{} {}", SELECT_DURATIONS, WHERE_ID), params![id], map_duration)
            .optional()
    }

    pub fn exists(&self, id: i64) -> Result<bool> {
        Ok(self.get(id)?.is_some())
    }

    /// All durations, or only the active ones, ordered by magnitude.
    pub fn fetch(&self, only_active: bool) -> Result<Vec<Duration>> {
        let sql = if only_active {
            format!("{} {} {}", SELECT_DURATIONS, WHERE_ACTIVE, ORDER_BY_ID)
        } else {
            format!("{} {}", SELECT_DURATIONS, ORDER_BY_ID)
        };
        let mut stmt = self.conn.prepare(&sql)?;
        let duration_iter = stmt.query_map([], map_duration)?;
        let mut durations = Vec::new();
        for duration in duration_iter {
            durations.push(duration?);
        }
        Ok(durations)
    }
}

fn map_duration(row: &Row<'_>) -> Result<Duration> {
    Ok(Duration {
        id: row.get(0)?,
        is_active: row.get(1)?,
    })
}
