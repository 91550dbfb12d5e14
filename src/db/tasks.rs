//! Task persistence.
//!
//! Rows are located by `(tsk_path, tsk_number)`; the sub tree of a task is
//! every row whose path starts with the task's full path. This repository
//! only runs statements, the tree invariants live in
//! [`TaskTree`](crate::libs::tree::TaskTree).

use crate::libs::task::{Task, TaskSearchFilter};
use crate::libs::task_path::TaskPath;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use tracing::debug;

const INSERT_TASK: &str = "INSERT INTO task (tsk_path, tsk_number, tsk_code, tsk_name, tsk_budget, tsk_initial_cons, tsk_todo, tsk_comment) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";
const UPDATE_TASK: &str = "UPDATE task SET tsk_code = ?2, tsk_name = ?3, tsk_budget = ?4, tsk_initial_cons = ?5, tsk_todo = ?6, tsk_comment = ?7 WHERE tsk_id = ?1";
const UPDATE_POSITION: &str = "UPDATE task SET tsk_path = ?2, tsk_number = ?3 WHERE tsk_id = ?1";
const UPDATE_TODO: &str = "UPDATE task SET tsk_todo = ?2 WHERE tsk_id = ?1";
const DELETE_TASK: &str = "DELETE FROM task WHERE tsk_id = ?1";
const DELETE_SUB_TREE: &str = "DELETE FROM task WHERE tsk_path LIKE ?1";
const SELECT_TASKS: &str = "SELECT tsk_id, tsk_path, tsk_number, tsk_code, tsk_name, tsk_budget, tsk_initial_cons, tsk_todo, tsk_comment FROM task";
const WHERE_ID: &str = "WHERE tsk_id = ?1";
const WHERE_POSITION: &str = "WHERE tsk_path = ?1 AND tsk_number = ?2";
const WHERE_CODE: &str = "WHERE tsk_path = ?1 AND tsk_code = ?2";
const WHERE_PATH: &str = "WHERE tsk_path = ?1 ORDER BY tsk_number ASC";
const COUNT_SUB_TASKS: &str = "SELECT COUNT(*) FROM task WHERE tsk_path = ?1";
const MAX_NUMBER: &str = "SELECT MAX(tsk_number) FROM task WHERE tsk_path = ?1";
const SUM_SUB_TREE: &str = "SELECT COALESCE(SUM(tsk_budget), 0), COALESCE(SUM(tsk_initial_cons), 0), COALESCE(SUM(tsk_todo), 0) FROM task WHERE tsk_path LIKE ?1";

pub struct Tasks<'a> {
    conn: &'a Connection,
}

impl<'a> Tasks<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Tasks { conn }
    }

    /// Inserts the task at its already assigned position and returns it with its id.
    pub fn insert(&self, task: &Task) -> Result<Task> {
        debug!(path = %task.path, number = task.number, code = %task.code, "inserting task");
        self.conn.execute(
            INSERT_TASK,
            params![
                task.path,
                task.number,
                task.code,
                task.name,
                task.budget,
                task.initially_consumed,
                task.todo,
                task.comment
            ],
        )?;
        Ok(Task {
            id: self.conn.last_insert_rowid(),
            ..task.clone()
        })
    }

    /// Persists every attribute except the position.
    pub fn update(&self, task: &Task) -> Result<usize> {
        debug!(id = task.id, code = %task.code, "updating task");
        self.conn.execute(
            UPDATE_TASK,
            params![
                task.id,
                task.code,
                task.name,
                task.budget,
                task.initially_consumed,
                task.todo,
                task.comment
            ],
        )
    }

    pub fn update_position(&self, id: i64, path: &TaskPath, number: u8) -> Result<usize> {
        debug!(id, path = %path, number, "moving task");
        self.conn.execute(UPDATE_POSITION, params![id, path, number])
    }

    pub fn update_todo(&self, id: i64, todo: i64) -> Result<usize> {
        debug!(id, todo, "updating estimated time to complete");
        self.conn.execute(UPDATE_TODO, params![id, todo])
    }

    pub fn delete(&self, id: i64) -> Result<usize> {
        debug!(id, "deleting task");
        self.conn.execute(DELETE_TASK, params![id])
    }

    /// Deletes every descendant of the task whose full path is `full_path`.
    pub fn delete_sub_tree(&self, full_path: &TaskPath) -> Result<usize> {
        debug!(full_path = %full_path, "deleting sub tree");
        self.conn.execute(DELETE_SUB_TREE, params![full_path.like_pattern()])
    }

    pub fn get(&self, id: i64) -> Result<Option<Task>> {
        self.conn
            .query_row(&format!("{} {}", SELECT_TASKS, WHERE_ID), params![id], map_task)
            .optional()
    }

    pub fn get_by_position(&self, path: &TaskPath, number: u8) -> Result<Option<Task>> {
        self.conn
            .query_row(&format!("{} {}", SELECT_TASKS, WHERE_POSITION), params![path, number], map_task)
            .optional()
    }

    pub fn get_by_code(&self, path: &TaskPath, code: &str) -> Result<Option<Task>> {
        self.conn
            .query_row(&format!("{} {}", SELECT_TASKS, WHERE_CODE), params![path, code], map_task)
            .optional()
    }

    /// Direct children of the tasks stored under `path`, by ascending number.
    pub fn sub_tasks(&self, path: &TaskPath) -> Result<Vec<Task>> {
        self.query(&format!("{} {}", SELECT_TASKS, WHERE_PATH), params![path])
    }

    pub fn sub_tasks_count(&self, path: &TaskPath) -> Result<i64> {
        self.conn.query_row(COUNT_SUB_TASKS, params![path], |row| row.get(0))
    }

    /// Highest sibling number used under `path`, if any.
    pub fn max_number(&self, path: &TaskPath) -> Result<Option<u8>> {
        self.conn.query_row(MAX_NUMBER, params![path], |row| row.get(0))
    }

    /// `(budget, initially consumed, todo)` summed over the descendants of `full_path`.
    pub fn sub_tree_amounts(&self, full_path: &TaskPath) -> Result<(i64, i64, i64)> {
        self.conn
            .query_row(SUM_SUB_TREE, params![full_path.like_pattern()], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
    }

    /// Every task, in tree print order.
    pub fn fetch_all(&self) -> Result<Vec<Task>> {
        let mut tasks = self.query(SELECT_TASKS, [])?;
        sort_by_full_path(&mut tasks);
        Ok(tasks)
    }

    /// Tasks matching the filter, in tree print order.
    pub fn search(&self, filter: &TaskSearchFilter) -> Result<Vec<Task>> {
        let sql = format!("{} WHERE {} LIKE ?1 ESCAPE '\\'", SELECT_TASKS, filter.column());
        let mut tasks = self.query(&sql, params![filter.like_pattern()])?;
        sort_by_full_path(&mut tasks);
        Ok(tasks)
    }

    fn query<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(sql)?;
        let task_iter = stmt.query_map(params, map_task)?;
        let mut tasks = Vec::new();
        for task in task_iter {
            tasks.push(task?);
        }
        Ok(tasks)
    }
}

/// Orders tasks by the string comparison of their full paths.
pub fn sort_by_full_path(tasks: &mut [Task]) {
    tasks.sort_by_key(|task| task.full_path());
}

pub(crate) fn map_task(row: &Row<'_>) -> Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        path: row.get(1)?,
        number: row.get(2)?,
        code: row.get(3)?,
        name: row.get(4)?,
        budget: row.get(5)?,
        initially_consumed: row.get(6)?,
        todo: row.get(7)?,
        comment: row.get(8)?,
    })
}
