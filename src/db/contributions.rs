//! Contribution persistence and raw aggregation queries.
//!
//! Dates are stored as separate year/month/day columns; range filters
//! compare the `year * 10000 + month * 100 + day` key so that open ended
//! ranges (only a lower or only an upper bound) stay a single predicate.

use super::collaborators::map_collaborator;
use crate::libs::collaborator::Collaborator;
use crate::libs::contribution::Contribution;
use crate::libs::task_path::TaskPath;
use chrono::{Datelike, NaiveDate};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result, Row};
use tracing::debug;

const INSERT_CONTRIBUTION: &str = "INSERT INTO contribution (ctb_year, ctb_month, ctb_day, ctb_contributor, ctb_task, ctb_duration) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const UPDATE_DURATION: &str = "UPDATE contribution SET ctb_duration = ?6 WHERE ctb_year = ?1 AND ctb_month = ?2 AND ctb_day = ?3 AND ctb_contributor = ?4 AND ctb_task = ?5";
const DELETE_CONTRIBUTION: &str = "DELETE FROM contribution WHERE ctb_year = ?1 AND ctb_month = ?2 AND ctb_day = ?3 AND ctb_contributor = ?4 AND ctb_task = ?5";
const SELECT_CONTRIBUTION: &str = "SELECT ctb_contributor, ctb_task, ctb_year, ctb_month, ctb_day, ctb_duration FROM contribution WHERE ctb_year = ?1 AND ctb_month = ?2 AND ctb_day = ?3 AND ctb_contributor = ?4 AND ctb_task = ?5";
const SELECT_CONTRIBUTIONS: &str = "SELECT ctb_contributor, ctb_task, ctb_year, ctb_month, ctb_day, ctb_duration FROM contribution JOIN task ON tsk_id = ctb_task";
// Tasks compare by full path string, the same order as the tree
const ORDER_CONTRIBUTIONS: &str =
    "ORDER BY ctb_year, ctb_month, ctb_day, tsk_path || printf('%02X', tsk_number), ctb_contributor, ctb_duration";
const SUM_CONTRIBUTIONS: &str = "SELECT COALESCE(SUM(ctb_duration), 0) FROM contribution";
const COUNT_CONTRIBUTIONS: &str = "SELECT COUNT(*) FROM contribution";
const SELECT_CONTRIBUTORS: &str = "SELECT clb_id, clb_login, clb_first_name, clb_last_name, clb_is_active FROM collaborator WHERE clb_id IN (SELECT ctb_contributor FROM contribution";
const SELECT_YEARS: &str = "SELECT DISTINCT ctb_year FROM contribution ORDER BY ctb_year ASC";
const COUNT_BY_DURATION: &str = "SELECT COUNT(*) FROM contribution WHERE ctb_duration = ?1";
const DATE_KEY: &str = "(ctb_year * 10000 + ctb_month * 100 + ctb_day)";

/// Which tasks a contribution query covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskScope {
    /// Exactly one (leaf) task.
    Task(i64),
    /// Every task under a full path.
    SubTree(TaskPath),
}

/// Resolved restrictions of a contribution query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContributionSelection {
    pub contributor_id: Option<i64>,
    pub scope: Option<TaskScope>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ContributionSelection {
    pub fn contributor(contributor_id: i64) -> Self {
        ContributionSelection {
            contributor_id: Some(contributor_id),
            ..Default::default()
        }
    }

    pub fn scope(scope: TaskScope) -> Self {
        ContributionSelection {
            scope: Some(scope),
            ..Default::default()
        }
    }

    /// Renders the `WHERE` clause (possibly empty) and its parameters.
    fn where_clause(&self) -> (String, Vec<Value>) {
        let mut conditions = Vec::new();
        let mut values = Vec::new();
        if let Some(contributor_id) = self.contributor_id {
            values.push(Value::Integer(contributor_id));
            conditions.push(format!("ctb_contributor = ?{}", values.len()));
        }
        match &self.scope {
            Some(TaskScope::Task(task_id)) => {
                values.push(Value::Integer(*task_id));
                conditions.push(format!("ctb_task = ?{}", values.len()));
            }
            Some(TaskScope::SubTree(full_path)) => {
                values.push(Value::Text(full_path.like_pattern()));
                conditions.push(format!("ctb_task IN (SELECT tsk_id FROM task WHERE tsk_path LIKE ?{})", values.len()));
            }
            None => {}
        }
        if let Some(from) = self.from {
            values.push(Value::Integer(date_key(from)));
            conditions.push(format!("{} >= ?{}", DATE_KEY, values.len()));
        }
        if let Some(to) = self.to {
            values.push(Value::Integer(date_key(to)));
            conditions.push(format!("{} <= ?{}", DATE_KEY, values.len()));
        }
        if conditions.is_empty() {
            (String::new(), values)
        } else {
            (format!("WHERE {}", conditions.join(" AND ")), values)
        }
    }
}

pub struct Contributions<'a> {
    conn: &'a Connection,
}

impl<'a> Contributions<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Contributions { conn }
    }

    pub fn insert(&self, contribution: &Contribution) -> Result<()> {
        debug!(
            contributor = contribution.contributor_id,
            task = contribution.task_id,
            date = %contribution.date,
            duration = contribution.duration_id,
            "inserting contribution"
        );
        self.conn.execute(INSERT_CONTRIBUTION, key_params(contribution, contribution.duration_id))?;
        Ok(())
    }

    pub fn update_duration(&self, contribution: &Contribution) -> Result<usize> {
        debug!(
            contributor = contribution.contributor_id,
            task = contribution.task_id,
            date = %contribution.date,
            duration = contribution.duration_id,
            "updating contribution"
        );
        self.conn.execute(UPDATE_DURATION, key_params(contribution, contribution.duration_id))
    }

    pub fn delete(&self, contribution: &Contribution) -> Result<usize> {
        debug!(
            contributor = contribution.contributor_id,
            task = contribution.task_id,
            date = %contribution.date,
            "deleting contribution"
        );
        self.conn.execute(
            DELETE_CONTRIBUTION,
            params![
                contribution.year(),
                contribution.month(),
                contribution.day(),
                contribution.contributor_id,
                contribution.task_id
            ],
        )
    }

    /// Looks a contribution up by its composite identity.
    pub fn get(&self, contributor_id: i64, task_id: i64, date: NaiveDate) -> Result<Option<Contribution>> {
        self.conn
            .query_row(
                SELECT_CONTRIBUTION,
                params![date.year(), date.month(), date.day(), contributor_id, task_id],
                map_contribution,
            )
            .optional()
    }

    /// Matching contributions ordered by date, task position, contributor and duration.
    pub fn fetch(&self, selection: &ContributionSelection) -> Result<Vec<Contribution>> {
        let (where_clause, values) = selection.where_clause();
        let sql = format!("{} {} {}", SELECT_CONTRIBUTIONS, where_clause, ORDER_CONTRIBUTIONS);
        let mut stmt = self.conn.prepare(&sql)?;
        let contribution_iter = stmt.query_map(params_from_iter(values.iter()), map_contribution)?;
        let mut contributions = Vec::new();
        for contribution in contribution_iter {
            contributions.push(contribution?);
        }
        Ok(contributions)
    }

    pub fn sum(&self, selection: &ContributionSelection) -> Result<i64> {
        let (where_clause, values) = selection.where_clause();
        self.conn.query_row(
            &format!("{} {}", SUM_CONTRIBUTIONS, where_clause),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )
    }

    pub fn count(&self, selection: &ContributionSelection) -> Result<i64> {
        let (where_clause, values) = selection.where_clause();
        self.conn.query_row(
            &format!("{} {}", COUNT_CONTRIBUTIONS, where_clause),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )
    }

    pub fn count_by_duration(&self, duration_id: i64) -> Result<i64> {
        self.conn.query_row(COUNT_BY_DURATION, params![duration_id], |row| row.get(0))
    }

    /// Distinct collaborators owning at least one matching contribution, by login.
    pub fn contributors(&self, selection: &ContributionSelection) -> Result<Vec<Collaborator>> {
        let (where_clause, values) = selection.where_clause();
        let sql = format!("{} {}) ORDER BY clb_login ASC", SELECT_CONTRIBUTORS, where_clause);
        let mut stmt = self.conn.prepare(&sql)?;
        let collaborator_iter = stmt.query_map(params_from_iter(values.iter()), map_collaborator)?;
        let mut collaborators = Vec::new();
        for collaborator in collaborator_iter {
            collaborators.push(collaborator?);
        }
        Ok(collaborators)
    }

    pub fn years(&self) -> Result<Vec<i32>> {
        let mut stmt = self.conn.prepare(SELECT_YEARS)?;
        let year_iter = stmt.query_map([], |row| row.get(0))?;
        let mut years = Vec::new();
        for year in year_iter {
            years.push(year?);
        }
        Ok(years)
    }
}

fn date_key(date: NaiveDate) -> i64 {
    date.year() as i64 * 10000 + date.month() as i64 * 100 + date.day() as i64
}

fn key_params(contribution: &Contribution, duration_id: i64) -> [Value; 6] {
    [
        Value::Integer(contribution.year() as i64),
        Value::Integer(contribution.month() as i64),
        Value::Integer(contribution.day() as i64),
        Value::Integer(contribution.contributor_id),
        Value::Integer(contribution.task_id),
        Value::Integer(duration_id),
    ]
}

fn map_contribution(row: &Row<'_>) -> Result<Contribution> {
    let year: i32 = row.get(2)?;
    let month: u32 = row.get(3)?;
    let day: u32 = row.get(4)?;
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or(rusqlite::Error::IntegralValueOutOfRange(4, day as i64))?;
    Ok(Contribution {
        contributor_id: row.get(0)?,
        task_id: row.get(1)?,
        date,
        duration_id: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_has_no_where_clause() {
        let (clause, values) = ContributionSelection::default().where_clause();
        assert!(clause.is_empty());
        assert!(values.is_empty());
    }

    #[test]
    fn selection_numbers_parameters_in_order() {
        let selection = ContributionSelection {
            contributor_id: Some(3),
            scope: Some(TaskScope::SubTree(TaskPath::parse("0102").unwrap())),
            from: NaiveDate::from_ymd_opt(2024, 1, 1),
            to: None,
        };
        let (clause, values) = selection.where_clause();
        assert_eq!(
            clause,
            "WHERE ctb_contributor = ?1 AND ctb_task IN (SELECT tsk_id FROM task WHERE tsk_path LIKE ?2) AND (ctb_year * 10000 + ctb_month * 100 + ctb_day) >= ?3"
        );
        assert_eq!(values[1], Value::Text("0102%".to_string()));
        assert_eq!(values[2], Value::Integer(20240101));
    }
}
