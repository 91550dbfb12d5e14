//! Task tree engine.
//!
//! Implements the structural operations of the task forest on top of the
//! [`Tasks`] repository: creation with number assignment, path cascades,
//! sibling renumbering, swaps, moves and sub tree removal.
//!
//! ## Invariants kept by every operation
//!
//! - Sibling numbers are exactly `1..=N`.
//! - A child's path equals its parent's full path.
//! - A task with children has no contribution and no amount.
//! - A task is never moved below itself.
//!
//! The engine works on whatever connection it is given and never commits;
//! the caller owns the transaction and rolls it back when any step fails.

use super::error::{ModelError, ModelMgrResult};
use super::formatter::{code_path, split_code_path};
use super::task::Task;
use super::task_path::{TaskPath, PLACEHOLDER_NUMBER};
use crate::db::contributions::{ContributionSelection, Contributions, TaskScope};
use crate::db::tasks::Tasks;
use rusqlite::Connection;
use tracing::debug;

/// Display name of the virtual root in error messages.
const ROOT_CODE: &str = "/";

pub struct TaskTree<'a> {
    conn: &'a Connection,
}

impl<'a> TaskTree<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        TaskTree { conn }
    }

    fn tasks(&self) -> Tasks<'a> {
        Tasks::new(self.conn)
    }

    fn contributions(&self) -> Contributions<'a> {
        Contributions::new(self.conn)
    }

    /// Direct children of `parent` (root-level tasks for `None`), by number.
    pub fn get_sub_tasks(&self, parent: Option<&Task>) -> ModelMgrResult<Vec<Task>> {
        Ok(self.tasks().sub_tasks(&children_path(parent))?)
    }

    pub fn get_sub_tasks_count(&self, parent: Option<&Task>) -> ModelMgrResult<i64> {
        Ok(self.tasks().sub_tasks_count(&children_path(parent))?)
    }

    pub fn get_parent_task(&self, task: &Task) -> ModelMgrResult<Option<Task>> {
        let (Some(parent_path), Some(parent_number)) = (task.path.parent(), task.path.last_number()) else {
            return Ok(None);
        };
        Ok(self.tasks().get_by_position(&parent_path, parent_number)?)
    }

    /// Tells whether the task currently has no child.
    pub fn is_leaf(&self, task: &Task) -> ModelMgrResult<bool> {
        Ok(self.tasks().sub_tasks_count(&task.full_path())? == 0)
    }

    /// Re-reads the task and fails if its position moved since it was fetched.
    pub fn check_unchanged(&self, task: &Task) -> ModelMgrResult<Task> {
        let stored = self.tasks().get(task.id)?.ok_or(ModelError::TaskNotFound(task.id))?;
        if stored.path != task.path || stored.number != task.number {
            return Err(ModelError::StaleTask { code: task.code.clone() }.into());
        }
        Ok(stored)
    }

    /// Fails unless the task may receive a (first or additional) child.
    ///
    /// Returns the stored version of the task.
    pub fn check_accepts_subtasks(&self, task: &Task) -> ModelMgrResult<Task> {
        let stored = self.tasks().get(task.id)?.ok_or(ModelError::TaskNotFound(task.id))?;
        if !self.is_leaf(&stored)? {
            return Ok(stored);
        }
        let count = self.contributions().count(&ContributionSelection::scope(TaskScope::Task(stored.id)))?;
        if count > 0 {
            return Err(ModelError::TaskInUse { code: stored.code, count }.into());
        }
        if stored.budget != 0 {
            return Err(ModelError::NonNullBudget { code: stored.code }.into());
        }
        if stored.initially_consumed != 0 {
            return Err(ModelError::NonNullInitiallyConsumed { code: stored.code }.into());
        }
        if stored.todo != 0 {
            return Err(ModelError::NonNullTodo { code: stored.code }.into());
        }
        Ok(stored)
    }

    /// Creates `task` as the last child of `parent` and returns it with its id and position.
    pub fn create_task(&self, parent: Option<&Task>, task: &Task) -> ModelMgrResult<Task> {
        check_code(&task.code)?;
        let (path, parent_code) = match parent {
            Some(parent) => {
                let parent = self.check_accepts_subtasks(parent)?;
                (parent.full_path(), parent.code)
            }
            None => (TaskPath::root(), ROOT_CODE.to_string()),
        };
        if self.tasks().get_by_code(&path, &task.code)?.is_some() {
            return Err(ModelError::CodeAlreadyInUse { code: task.code.clone() }.into());
        }
        let number = self.next_number(&path, &parent_code)?;
        let created = self.tasks().insert(&Task {
            path,
            number,
            ..task.clone()
        })?;
        debug!(id = created.id, full_path = %created.full_path(), "task created");
        Ok(created)
    }

    /// Replaces the first `old_len` characters of the path of every task in
    /// `tasks`, and of all their descendants, with `new_path`.
    pub fn change_tasks_paths(&self, tasks: &[Task], old_len: usize, new_path: &TaskPath) -> ModelMgrResult<()> {
        for task in tasks {
            // Children are still stored under the old full path at this point
            let children = self.tasks().sub_tasks(&task.full_path())?;
            let path = task.path.replace_prefix(old_len, new_path);
            self.tasks().update_position(task.id, &path, task.number)?;
            self.change_tasks_paths(&children, old_len, new_path)?;
        }
        Ok(())
    }

    /// Gives `task` a new sibling number and rewrites its whole sub tree.
    fn renumber(&self, task: &Task, number: u8) -> ModelMgrResult<Task> {
        let old_full_path = task.full_path();
        let children = self.tasks().sub_tasks(&old_full_path)?;
        self.tasks().update_position(task.id, &task.path, number)?;
        let renumbered = Task { number, ..task.clone() };
        self.change_tasks_paths(&children, old_full_path.len(), &renumbered.full_path())?;
        Ok(renumbered)
    }

    /// Closes the gaps in the numbering of the children stored under `path`.
    pub fn rebuild_subtasks_numbers(&self, path: &TaskPath) -> ModelMgrResult<()> {
        let children = self.tasks().sub_tasks(path)?;
        for (index, child) in children.iter().enumerate() {
            let expected = u8::try_from(index + 1).map_err(|_| ModelError::TooManySubtasks {
                code: child.code.clone(),
                max: u8::MAX,
            })?;
            if child.number != expected {
                self.renumber(child, expected)?;
            }
        }
        Ok(())
    }

    /// Swaps the numbers of two siblings, going through the placeholder number.
    pub fn toggle_tasks(&self, task1: &Task, task2: &Task) -> ModelMgrResult<(Task, Task)> {
        let (number1, number2) = (task1.number, task2.number);
        debug!(first = %task1.code, second = %task2.code, "swapping sibling tasks");
        let parked = self.renumber(task1, PLACEHOLDER_NUMBER)?;
        let task2 = self.renumber(task2, number1)?;
        let task1 = self.renumber(&parked, number2)?;
        Ok((task1, task2))
    }

    pub fn move_up_task(&self, task: &Task) -> ModelMgrResult<Task> {
        let stored = self.check_unchanged(task)?;
        let previous = match stored.number.checked_sub(1) {
            Some(number) if number > 0 => self.tasks().get_by_position(&stored.path, number)?,
            _ => None,
        };
        let previous = previous.ok_or_else(|| ModelError::CannotMoveUp { code: stored.code.clone() })?;
        let (moved, _) = self.toggle_tasks(&stored, &previous)?;
        Ok(moved)
    }

    pub fn move_down_task(&self, task: &Task) -> ModelMgrResult<Task> {
        let stored = self.check_unchanged(task)?;
        let next = match stored.number.checked_add(1) {
            Some(number) => self.tasks().get_by_position(&stored.path, number)?,
            None => None,
        };
        let next = next.ok_or_else(|| ModelError::CannotMoveDown { code: stored.code.clone() })?;
        let (moved, _) = self.toggle_tasks(&stored, &next)?;
        Ok(moved)
    }

    /// Moves the task among its siblings, one swap at a time, to `new_number`.
    pub fn move_task_up_or_down(&self, task: &Task, new_number: i64) -> ModelMgrResult<Task> {
        let stored = self.check_unchanged(task)?;
        let max = self.tasks().sub_tasks_count(&stored.path)?;
        if new_number < 1 || new_number > max {
            return Err(ModelError::InvalidTaskNumber {
                code: stored.code,
                number: new_number,
                max,
            }
            .into());
        }
        let mut current = stored;
        while i64::from(current.number) != new_number {
            let neighbour = if i64::from(current.number) < new_number {
                current.number + 1
            } else {
                current.number - 1
            };
            let other = self
                .tasks()
                .get_by_position(&current.path, neighbour)?
                .ok_or(ModelError::StaleTask { code: current.code.clone() })?;
            current = self.toggle_tasks(&current, &other)?.0;
        }
        Ok(current)
    }

    /// Moves the task (and its sub tree) to the end of `destination`'s children.
    pub fn move_task(&self, task: &Task, destination: Option<&Task>) -> ModelMgrResult<Task> {
        let stored = self.check_unchanged(task)?;
        let destination = destination.map(|dest| self.check_unchanged(dest)).transpose()?;

        let old_full_path = stored.full_path();
        if let Some(dest) = &destination {
            if old_full_path.is_prefix_of(&dest.full_path()) {
                return Err(ModelError::CannotMoveUnderItself { code: stored.code }.into());
            }
        }
        let dest_path = destination.as_ref().map(Task::full_path).unwrap_or_default();
        if dest_path == stored.path {
            return Ok(stored);
        }
        let dest_code = match &destination {
            Some(dest) => self.check_accepts_subtasks(dest)?.code,
            None => ROOT_CODE.to_string(),
        };
        if self.tasks().get_by_code(&dest_path, &stored.code)?.is_some() {
            return Err(ModelError::CodeExistsAtDestination { code: stored.code }.into());
        }

        let number = self.next_number(&dest_path, &dest_code)?;
        let children = self.tasks().sub_tasks(&old_full_path)?;
        self.tasks().update_position(stored.id, &dest_path, number)?;
        let moved = Task {
            path: dest_path,
            number,
            ..stored.clone()
        };
        self.change_tasks_paths(&children, old_full_path.len(), &moved.full_path())?;
        // The destination may sit below a sibling renumbered here
        self.rebuild_subtasks_numbers(&stored.path)?;
        let moved = self.tasks().get(moved.id)?.ok_or(ModelError::TaskNotFound(moved.id))?;
        debug!(id = moved.id, from = %old_full_path, to = %moved.full_path(), "task moved");
        Ok(moved)
    }

    /// Deletes the task with its sub tree, then closes the numbering gap.
    pub fn remove_task(&self, task: &Task) -> ModelMgrResult<()> {
        let stored = self.check_unchanged(task)?;
        let full_path = stored.full_path();
        let count = self.contributions().count(&ContributionSelection::scope(TaskScope::Task(stored.id)))?
            + self.contributions().count(&ContributionSelection::scope(TaskScope::SubTree(full_path.clone())))?;
        if count > 0 {
            return Err(ModelError::TaskHasContributions { code: stored.code, count }.into());
        }
        self.tasks().delete_sub_tree(&full_path)?;
        self.tasks().delete(stored.id)?;
        self.rebuild_subtasks_numbers(&stored.path)?;
        Ok(())
    }

    /// `/`-joined codes from the root down to the task.
    pub fn get_task_code_path(&self, task: &Task) -> ModelMgrResult<String> {
        let mut codes = Vec::new();
        for ancestor in task.full_path().ancestors() {
            let (Some(path), Some(number)) = (ancestor.parent(), ancestor.last_number()) else {
                continue;
            };
            let parent = self
                .tasks()
                .get_by_position(&path, number)?
                .ok_or_else(|| ModelError::StaleTask { code: task.code.clone() })?;
            codes.push(parent.code);
        }
        Ok(code_path(codes.iter().map(String::as_str).chain(std::iter::once(task.code.as_str()))))
    }

    /// Resolves a `/A/B/C` code path, `None` when a segment is unknown.
    pub fn find_task_by_code_path(&self, code_path: &str) -> ModelMgrResult<Option<Task>> {
        let codes = split_code_path(code_path);
        if codes.is_empty() {
            return Ok(None);
        }
        let mut path = TaskPath::root();
        let mut found = None;
        for code in codes {
            match self.tasks().get_by_code(&path, code)? {
                Some(task) => {
                    path = task.full_path();
                    found = Some(task);
                }
                None => return Ok(None),
            }
        }
        Ok(found)
    }

    pub fn get_task_by_code_path(&self, code_path: &str) -> ModelMgrResult<Task> {
        self.find_task_by_code_path(code_path)?
            .ok_or_else(|| ModelError::UnknownTaskCodePath(code_path.to_string()).into())
    }

    fn next_number(&self, path: &TaskPath, parent_code: &str) -> ModelMgrResult<u8> {
        let max = self.tasks().max_number(path)?.unwrap_or(0);
        max.checked_add(1).ok_or_else(|| {
            ModelError::TooManySubtasks {
                code: parent_code.to_string(),
                max: u8::MAX,
            }
            .into()
        })
    }
}

/// Path the children of `parent` are stored under.
fn children_path(parent: Option<&Task>) -> TaskPath {
    parent.map(Task::full_path).unwrap_or_default()
}

/// Codes must be non-empty and free of the code path separator.
pub fn check_code(code: &str) -> Result<(), ModelError> {
    if code.trim().is_empty() || code.contains('/') {
        return Err(ModelError::InvalidTaskCode(code.to_string()));
    }
    Ok(())
}
