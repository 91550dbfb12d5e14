//! Transactional entry point of the model.
//!
//! [`ModelMgr`] is the only component allowed to mutate the model. Every
//! public operation takes the manager's lock, opens one transaction, checks
//! the business rules, performs its statements and commits. Any failure rolls
//! the whole transaction back, so an operation is either fully applied or not
//! at all.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use actman::db::db::Db;
//! use actman::libs::config::ModelConfig;
//! use actman::libs::model_mgr::ModelMgr;
//! use actman::libs::task::Task;
//!
//! let mgr = ModelMgr::new(Db::open_in_memory()?, ModelConfig::default());
//! let project = mgr.create_task(None, &Task::new("PRJ", "Project"))?;
//! let dev = mgr.create_task(Some(&project), &Task::new("DEV", "Development"))?;
//! assert_eq!(mgr.get_task_code_path(&dev)?, "/PRJ/DEV");
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::aggregation::Aggregator;
use super::collaborator::{Collaborator, CollaboratorQuery};
use super::config::ModelConfig;
use super::contribution::{Contribution, ContributionFilter, IntervalContributions};
use super::duration::Duration;
use super::error::{ModelError, ModelMgrResult};
use super::task::{Task, TaskSearchFilter, TaskSums};
use super::tree::{check_code, TaskTree};
use crate::db::collaborators::Collaborators;
use crate::db::contributions::{ContributionSelection, Contributions};
use crate::db::db::Db;
use crate::db::durations::Durations;
use crate::db::tasks::Tasks;
use chrono::NaiveDate;
use parking_lot::Mutex;
use rusqlite::Transaction;
use tracing::{info, warn};

pub struct ModelMgr {
    db: Mutex<Db>,
    config: ModelConfig,
}

impl ModelMgr {
    pub fn new(db: Db, config: ModelConfig) -> Self {
        ModelMgr {
            db: Mutex::new(db),
            config,
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Runs `operation` in its own transaction while holding the manager lock.
    ///
    /// Commits on success. On failure the transaction is rolled back and the
    /// original error is returned.
    fn in_transaction<T>(&self, name: &str, operation: impl FnOnce(&Transaction) -> ModelMgrResult<T>) -> ModelMgrResult<T> {
        let mut db = self.db.lock();
        let tx = db.conn.transaction()?;
        match operation(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                if err.is_model_violation() {
                    warn!(operation = name, error = %err, "operation rejected, rolling back");
                } else {
                    warn!(operation = name, error = ?err, "operation failed, rolling back");
                }
                if let Err(rollback_err) = tx.rollback() {
                    warn!(operation = name, error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }

    // === COLLABORATORS ===

    pub fn create_collaborator(&self, collaborator: &Collaborator) -> ModelMgrResult<Collaborator> {
        let created = self.in_transaction("create_collaborator", |tx| {
            let collaborators = Collaborators::new(tx);
            if collaborators.get_by_login(&collaborator.login)?.is_some() {
                return Err(ModelError::LoginAlreadyInUse(collaborator.login.clone()).into());
            }
            Ok(collaborators.insert(collaborator)?)
        })?;
        info!(id = created.id, login = %created.login, "collaborator created");
        Ok(created)
    }

    /// Creates a collaborator with the first free `<prefix>`, `<prefix>1`, ... login.
    pub fn create_new_collaborator(&self) -> ModelMgrResult<Collaborator> {
        let created = self.in_transaction("create_new_collaborator", |tx| {
            let collaborators = Collaborators::new(tx);
            let login = first_free_name(&self.config.collaborator_login_prefix, |login| {
                Ok(collaborators.get_by_login(login)?.is_some())
            })?;
            Ok(collaborators.insert(&Collaborator::new(&login, "", ""))?)
        })?;
        info!(id = created.id, login = %created.login, "collaborator created");
        Ok(created)
    }

    pub fn update_collaborator(&self, collaborator: &Collaborator) -> ModelMgrResult<Collaborator> {
        self.in_transaction("update_collaborator", |tx| {
            let collaborators = Collaborators::new(tx);
            if collaborators.get(collaborator.id)?.is_none() {
                return Err(ModelError::CollaboratorNotFound(collaborator.id).into());
            }
            if let Some(other) = collaborators.get_by_login(&collaborator.login)? {
                if other.id != collaborator.id {
                    return Err(ModelError::LoginAlreadyInUse(collaborator.login.clone()).into());
                }
            }
            collaborators.update(collaborator)?;
            Ok(())
        })?;
        info!(id = collaborator.id, login = %collaborator.login, "collaborator updated");
        Ok(collaborator.clone())
    }

    pub fn remove_collaborator(&self, collaborator: &Collaborator) -> ModelMgrResult<()> {
        self.in_transaction("remove_collaborator", |tx| {
            let collaborators = Collaborators::new(tx);
            let stored = collaborators
                .get(collaborator.id)?
                .ok_or(ModelError::CollaboratorNotFound(collaborator.id))?;
            let count = Contributions::new(tx).count(&ContributionSelection::contributor(stored.id))?;
            if count > 0 {
                return Err(ModelError::CollaboratorHasContributions { login: stored.login, count }.into());
            }
            collaborators.delete(stored.id)?;
            Ok(())
        })?;
        info!(id = collaborator.id, login = %collaborator.login, "collaborator removed");
        Ok(())
    }

    pub fn get_collaborator(&self, id: i64) -> ModelMgrResult<Option<Collaborator>> {
        self.in_transaction("get_collaborator", |tx| Ok(Collaborators::new(tx).get(id)?))
    }

    pub fn get_collaborator_by_login(&self, login: &str) -> ModelMgrResult<Option<Collaborator>> {
        self.in_transaction("get_collaborator_by_login", |tx| Ok(Collaborators::new(tx).get_by_login(login)?))
    }

    pub fn get_collaborators(&self, query: &CollaboratorQuery) -> ModelMgrResult<Vec<Collaborator>> {
        self.in_transaction("get_collaborators", |tx| Ok(Collaborators::new(tx).fetch(query)?))
    }

    pub fn get_active_collaborators(&self) -> ModelMgrResult<Vec<Collaborator>> {
        self.get_collaborators(&CollaboratorQuery {
            only_active: true,
            ..Default::default()
        })
    }

    pub fn get_collaborators_count(&self, only_active: bool) -> ModelMgrResult<i64> {
        self.in_transaction("get_collaborators_count", |tx| Ok(Collaborators::new(tx).count(only_active)?))
    }

    /// Collaborators with at least one contribution matching the filter, by login.
    pub fn get_contributors(&self, task: Option<&Task>, from: Option<NaiveDate>, to: Option<NaiveDate>) -> ModelMgrResult<Vec<Collaborator>> {
        self.in_transaction("get_contributors", |tx| {
            let filter = ContributionFilter {
                contributor_id: None,
                task: task.cloned(),
                from,
                to,
            };
            Aggregator::new(tx).get_contributors(&filter)
        })
    }

    // === DURATIONS ===

    pub fn create_duration(&self, duration: &Duration) -> ModelMgrResult<Duration> {
        let created = self.in_transaction("create_duration", |tx| insert_duration(tx, duration))?;
        info!(id = created.id, "duration created");
        Ok(created)
    }

    /// Returns the stored duration, creating it first when missing.
    pub fn create_duration_if_not_exists(&self, id: i64) -> ModelMgrResult<Duration> {
        self.in_transaction("create_duration_if_not_exists", |tx| match Durations::new(tx).get(id)? {
            Some(duration) => Ok(duration),
            None => {
                let created = insert_duration(tx, &Duration::new(id))?;
                info!(id, "duration created");
                Ok(created)
            }
        })
    }

    /// Replaces `old` by `new`; the id being the value, a different id means
    /// removing the old duration and creating the new one.
    pub fn update_duration(&self, old: &Duration, new: &Duration) -> ModelMgrResult<Duration> {
        let updated = self.in_transaction("update_duration", |tx| {
            let durations = Durations::new(tx);
            if old.id == new.id {
                if !durations.exists(old.id)? {
                    return Err(ModelError::DurationNotFound(old.id).into());
                }
                durations.update(new)?;
                return Ok(*new);
            }
            delete_duration(tx, old.id)?;
            insert_duration(tx, new)
        })?;
        info!(old = old.id, new = updated.id, active = updated.is_active, "duration updated");
        Ok(updated)
    }

    pub fn remove_duration(&self, duration: &Duration) -> ModelMgrResult<()> {
        self.in_transaction("remove_duration", |tx| delete_duration(tx, duration.id))?;
        info!(id = duration.id, "duration removed");
        Ok(())
    }

    pub fn get_duration(&self, id: i64) -> ModelMgrResult<Option<Duration>> {
        self.in_transaction("get_duration", |tx| Ok(Durations::new(tx).get(id)?))
    }

    pub fn get_durations(&self) -> ModelMgrResult<Vec<Duration>> {
        self.in_transaction("get_durations", |tx| Ok(Durations::new(tx).fetch(false)?))
    }

    pub fn get_active_durations(&self) -> ModelMgrResult<Vec<Duration>> {
        self.in_transaction("get_active_durations", |tx| Ok(Durations::new(tx).fetch(true)?))
    }

    pub fn is_duration_used(&self, id: i64) -> ModelMgrResult<bool> {
        self.in_transaction("is_duration_used", |tx| Ok(Contributions::new(tx).count_by_duration(id)? > 0))
    }

    // === TASKS ===

    /// Creates `task` as the last child of `parent` (root level for `None`).
    pub fn create_task(&self, parent: Option<&Task>, task: &Task) -> ModelMgrResult<Task> {
        let created = self.in_transaction("create_task", |tx| TaskTree::new(tx).create_task(parent, task))?;
        info!(id = created.id, code = %created.code, full_path = %created.full_path(), "task created");
        Ok(created)
    }

    /// Creates a task with the first free `<prefix>`, `<prefix>1`, ... sibling code.
    pub fn create_new_task(&self, parent: Option<&Task>) -> ModelMgrResult<Task> {
        let created = self.in_transaction("create_new_task", |tx| {
            let tasks = Tasks::new(tx);
            let parent = match parent {
                Some(parent) => Some(tasks.get(parent.id)?.ok_or(ModelError::TaskNotFound(parent.id))?),
                None => None,
            };
            let path = parent.as_ref().map(Task::full_path).unwrap_or_default();
            let code = first_free_name(&self.config.task_code_prefix, |code| Ok(tasks.get_by_code(&path, code)?.is_some()))?;
            TaskTree::new(tx).create_task(parent.as_ref(), &Task::new(&code, &self.config.new_task_name))
        })?;
        info!(id = created.id, code = %created.code, full_path = %created.full_path(), "task created");
        Ok(created)
    }

    /// Persists every attribute of the task except its position.
    pub fn update_task(&self, task: &Task) -> ModelMgrResult<Task> {
        self.in_transaction("update_task", |tx| {
            check_code(&task.code)?;
            let tree = TaskTree::new(tx);
            let stored = tree.check_unchanged(task)?;
            let tasks = Tasks::new(tx);
            if stored.code != task.code {
                if let Some(other) = tasks.get_by_code(&task.path, &task.code)? {
                    if other.id != task.id {
                        return Err(ModelError::CodeAlreadyInUse { code: task.code.clone() }.into());
                    }
                }
            }
            if task.has_amounts() && !tree.is_leaf(&stored)? {
                let code = task.code.clone();
                return Err(match (task.budget, task.initially_consumed) {
                    (budget, _) if budget != 0 => ModelError::NonNullBudget { code },
                    (_, consumed) if consumed != 0 => ModelError::NonNullInitiallyConsumed { code },
                    _ => ModelError::NonNullTodo { code },
                }
                .into());
            }
            tasks.update(task)?;
            Ok(())
        })?;
        info!(id = task.id, code = %task.code, "task updated");
        Ok(task.clone())
    }

    /// Removes the task and its whole sub tree; fails if any of them has contributions.
    pub fn remove_task(&self, task: &Task) -> ModelMgrResult<()> {
        self.in_transaction("remove_task", |tx| TaskTree::new(tx).remove_task(task))?;
        info!(id = task.id, code = %task.code, "task removed");
        Ok(())
    }

    /// Moves the task under `destination` (root level for `None`), as its last child.
    pub fn move_task(&self, task: &Task, destination: Option<&Task>) -> ModelMgrResult<Task> {
        let moved = self.in_transaction("move_task", |tx| TaskTree::new(tx).move_task(task, destination))?;
        info!(id = moved.id, code = %moved.code, full_path = %moved.full_path(), "task moved");
        Ok(moved)
    }

    pub fn move_up_task(&self, task: &Task) -> ModelMgrResult<Task> {
        let moved = self.in_transaction("move_up_task", |tx| TaskTree::new(tx).move_up_task(task))?;
        info!(id = moved.id, number = moved.number, "task moved up");
        Ok(moved)
    }

    pub fn move_down_task(&self, task: &Task) -> ModelMgrResult<Task> {
        let moved = self.in_transaction("move_down_task", |tx| TaskTree::new(tx).move_down_task(task))?;
        info!(id = moved.id, number = moved.number, "task moved down");
        Ok(moved)
    }

    /// Gives the task the sibling number `number`, shifting the siblings in between.
    pub fn move_task_to_number(&self, task: &Task, number: i64) -> ModelMgrResult<Task> {
        let moved = self.in_transaction("move_task_to_number", |tx| TaskTree::new(tx).move_task_up_or_down(task, number))?;
        info!(id = moved.id, number = moved.number, "task renumbered");
        Ok(moved)
    }

    pub fn get_task(&self, id: i64) -> ModelMgrResult<Option<Task>> {
        self.in_transaction("get_task", |tx| Ok(Tasks::new(tx).get(id)?))
    }

    pub fn get_task_by_code_path(&self, code_path: &str) -> ModelMgrResult<Task> {
        self.in_transaction("get_task_by_code_path", |tx| TaskTree::new(tx).get_task_by_code_path(code_path))
    }

    /// Resolves every code path, failing on the first unknown one.
    pub fn get_tasks_by_code_path(&self, code_paths: &[&str]) -> ModelMgrResult<Vec<Task>> {
        self.in_transaction("get_tasks_by_code_path", |tx| {
            let tree = TaskTree::new(tx);
            code_paths.iter().map(|code_path| tree.get_task_by_code_path(code_path)).collect()
        })
    }

    pub fn get_task_code_path(&self, task: &Task) -> ModelMgrResult<String> {
        self.in_transaction("get_task_code_path", |tx| TaskTree::new(tx).get_task_code_path(task))
    }

    pub fn get_parent_task(&self, task: &Task) -> ModelMgrResult<Option<Task>> {
        self.in_transaction("get_parent_task", |tx| TaskTree::new(tx).get_parent_task(task))
    }

    pub fn get_sub_tasks(&self, parent: Option<&Task>) -> ModelMgrResult<Vec<Task>> {
        self.in_transaction("get_sub_tasks", |tx| TaskTree::new(tx).get_sub_tasks(parent))
    }

    pub fn get_sub_tasks_count(&self, parent: Option<&Task>) -> ModelMgrResult<i64> {
        self.in_transaction("get_sub_tasks_count", |tx| TaskTree::new(tx).get_sub_tasks_count(parent))
    }

    pub fn get_root_tasks_count(&self) -> ModelMgrResult<i64> {
        self.get_sub_tasks_count(None)
    }

    /// Every task, in tree print order.
    pub fn get_all_tasks(&self) -> ModelMgrResult<Vec<Task>> {
        self.in_transaction("get_all_tasks", |tx| Ok(Tasks::new(tx).fetch_all()?))
    }

    /// Tasks matching the filter, in tree print order.
    pub fn get_tasks(&self, filter: &TaskSearchFilter) -> ModelMgrResult<Vec<Task>> {
        self.in_transaction("get_tasks", |tx| Ok(Tasks::new(tx).search(filter)?))
    }

    pub fn is_leaf(&self, task: &Task) -> ModelMgrResult<bool> {
        self.in_transaction("is_leaf", |tx| TaskTree::new(tx).is_leaf(task))
    }

    pub fn get_task_sums(&self, task: &Task, from: Option<NaiveDate>, to: Option<NaiveDate>) -> ModelMgrResult<TaskSums> {
        self.in_transaction("get_task_sums", |tx| Aggregator::new(tx).get_task_sums(task, from, to))
    }

    // === CONTRIBUTIONS ===

    /// Records a contribution on a leaf task.
    ///
    /// With `update_todo`, the task's todo is decreased by the duration,
    /// without going below zero.
    pub fn create_contribution(&self, contribution: &Contribution, update_todo: bool) -> ModelMgrResult<Contribution> {
        self.in_transaction("create_contribution", |tx| {
            if Collaborators::new(tx).get(contribution.contributor_id)?.is_none() {
                return Err(ModelError::CollaboratorNotFound(contribution.contributor_id).into());
            }
            let task = leaf_task(tx, contribution.task_id)?;
            if !Durations::new(tx).exists(contribution.duration_id)? {
                return Err(ModelError::DurationNotFound(contribution.duration_id).into());
            }
            let contributions = Contributions::new(tx);
            if contributions
                .get(contribution.contributor_id, contribution.task_id, contribution.date)?
                .is_some()
            {
                return Err(ModelError::ContributionAlreadyExists {
                    contributor_id: contribution.contributor_id,
                    task_id: contribution.task_id,
                    date: contribution.date,
                }
                .into());
            }
            contributions.insert(contribution)?;
            if update_todo {
                adjust_todo(tx, &task, -contribution.duration_id)?;
            }
            Ok(())
        })?;
        info!(
            contributor = contribution.contributor_id,
            task = contribution.task_id,
            date = %contribution.date,
            duration = contribution.duration_id,
            "contribution created"
        );
        Ok(*contribution)
    }

    /// Changes the duration of `contribution`, which must still hold the stored duration.
    ///
    /// With `update_todo`, the task's todo receives `old - new`, without going below zero.
    pub fn update_contribution(&self, contribution: &Contribution, new_duration_id: i64, update_todo: bool) -> ModelMgrResult<Contribution> {
        let updated = self.in_transaction("update_contribution", |tx| {
            if !Durations::new(tx).exists(new_duration_id)? {
                return Err(ModelError::DurationNotFound(new_duration_id).into());
            }
            let stored = stored_contribution(tx, contribution)?;
            if stored.duration_id != contribution.duration_id {
                return Err(stale_contribution(contribution).into());
            }
            let updated = Contribution {
                duration_id: new_duration_id,
                ..stored
            };
            Contributions::new(tx).update_duration(&updated)?;
            if update_todo {
                let task = Tasks::new(tx)
                    .get(stored.task_id)?
                    .ok_or(ModelError::TaskNotFound(stored.task_id))?;
                adjust_todo(tx, &task, stored.duration_id - new_duration_id)?;
            }
            Ok(updated)
        })?;
        info!(
            contributor = updated.contributor_id,
            task = updated.task_id,
            date = %updated.date,
            old = contribution.duration_id,
            new = updated.duration_id,
            "contribution updated"
        );
        Ok(updated)
    }

    /// Deletes a contribution. With `update_todo`, the stored contribution must
    /// match `contribution` and its duration is given back to the task's todo.
    pub fn remove_contribution(&self, contribution: &Contribution, update_todo: bool) -> ModelMgrResult<()> {
        self.in_transaction("remove_contribution", |tx| {
            let stored = stored_contribution(tx, contribution)?;
            if update_todo && stored.duration_id != contribution.duration_id {
                return Err(stale_contribution(contribution).into());
            }
            Contributions::new(tx).delete(&stored)?;
            if update_todo {
                let task = Tasks::new(tx)
                    .get(stored.task_id)?
                    .ok_or(ModelError::TaskNotFound(stored.task_id))?;
                adjust_todo(tx, &task, stored.duration_id)?;
            }
            Ok(())
        })?;
        info!(
            contributor = contribution.contributor_id,
            task = contribution.task_id,
            date = %contribution.date,
            "contribution removed"
        );
        Ok(())
    }

    /// Moves the contributions to another leaf task.
    pub fn change_contribution_task(&self, contributions: &[Contribution], new_task: &Task) -> ModelMgrResult<Vec<Contribution>> {
        let moved = self.in_transaction("change_contribution_task", |tx| {
            let task = leaf_task(tx, new_task.id)?;
            let repository = Contributions::new(tx);
            let mut moved = Vec::with_capacity(contributions.len());
            for contribution in contributions {
                let stored = stored_contribution(tx, contribution)?;
                if stored.duration_id != contribution.duration_id {
                    return Err(stale_contribution(contribution).into());
                }
                repository.delete(&stored)?;
                let target = Contribution {
                    task_id: task.id,
                    ..stored
                };
                if repository.get(target.contributor_id, target.task_id, target.date)?.is_some() {
                    return Err(ModelError::ContributionAlreadyExists {
                        contributor_id: target.contributor_id,
                        task_id: target.task_id,
                        date: target.date,
                    }
                    .into());
                }
                repository.insert(&target)?;
                moved.push(target);
            }
            Ok(moved)
        })?;
        info!(count = moved.len(), task = new_task.id, "contributions moved");
        Ok(moved)
    }

    pub fn get_contributions(&self, filter: &ContributionFilter) -> ModelMgrResult<Vec<Contribution>> {
        self.in_transaction("get_contributions", |tx| Aggregator::new(tx).get_contributions(filter))
    }

    pub fn get_contributions_sum(&self, filter: &ContributionFilter) -> ModelMgrResult<i64> {
        self.in_transaction("get_contributions_sum", |tx| Aggregator::new(tx).get_contributions_sum(filter))
    }

    pub fn get_contributions_count(&self, filter: &ContributionFilter) -> ModelMgrResult<i64> {
        self.in_transaction("get_contributions_count", |tx| Aggregator::new(tx).get_contributions_count(filter))
    }

    /// Day by day grid of one collaborator's contributions; the contributor is mandatory.
    pub fn get_interval_contributions(
        &self,
        contributor: Option<&Collaborator>,
        task: Option<&Task>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ModelMgrResult<IntervalContributions> {
        self.in_transaction("get_interval_contributions", |tx| {
            Aggregator::new(tx).get_interval_contributions(contributor.map(|c| c.id), task, from, to)
        })
    }

    /// Years holding at least one contribution, ascending.
    pub fn get_contribution_years(&self) -> ModelMgrResult<Vec<i32>> {
        self.in_transaction("get_contribution_years", |tx| Ok(Contributions::new(tx).years()?))
    }
}

/// First of `<prefix>`, `<prefix>1`, `<prefix>2`, ... that is not taken.
fn first_free_name(prefix: &str, mut taken: impl FnMut(&str) -> ModelMgrResult<bool>) -> ModelMgrResult<String> {
    let mut index: u64 = 0;
    loop {
        let candidate = if index == 0 {
            prefix.to_string()
        } else {
            format!("{prefix}{index}")
        };
        if !taken(&candidate)? {
            return Ok(candidate);
        }
        index += 1;
    }
}

fn insert_duration(tx: &Transaction, duration: &Duration) -> ModelMgrResult<Duration> {
    if duration.id <= 0 {
        return Err(ModelError::InvalidDuration(duration.id).into());
    }
    let durations = Durations::new(tx);
    if durations.exists(duration.id)? {
        return Err(ModelError::DurationAlreadyExists(duration.id).into());
    }
    Ok(durations.insert(duration)?)
}

fn delete_duration(tx: &Transaction, id: i64) -> ModelMgrResult<()> {
    let durations = Durations::new(tx);
    if !durations.exists(id)? {
        return Err(ModelError::DurationNotFound(id).into());
    }
    let count = Contributions::new(tx).count_by_duration(id)?;
    if count > 0 {
        return Err(ModelError::DurationInUse { id, count }.into());
    }
    durations.delete(id)?;
    Ok(())
}

/// Fetches the task and checks it may hold contributions.
fn leaf_task(tx: &Transaction, task_id: i64) -> ModelMgrResult<Task> {
    let tree = TaskTree::new(tx);
    let task = Tasks::new(tx).get(task_id)?.ok_or(ModelError::TaskNotFound(task_id))?;
    if !tree.is_leaf(&task)? {
        return Err(ModelError::TaskWithSubtaskCannotAcceptContributions { code: task.code }.into());
    }
    Ok(task)
}

fn stored_contribution(tx: &Transaction, contribution: &Contribution) -> ModelMgrResult<Contribution> {
    Contributions::new(tx)
        .get(contribution.contributor_id, contribution.task_id, contribution.date)?
        .ok_or_else(|| {
            ModelError::ContributionNotFound {
                contributor_id: contribution.contributor_id,
                task_id: contribution.task_id,
                date: contribution.date,
            }
            .into()
        })
}

fn stale_contribution(contribution: &Contribution) -> ModelError {
    ModelError::StaleContribution {
        contributor_id: contribution.contributor_id,
        task_id: contribution.task_id,
        date: contribution.date,
    }
}

/// Adds `delta` to the task's todo, flooring the result at zero.
fn adjust_todo(tx: &Transaction, task: &Task, delta: i64) -> ModelMgrResult<()> {
    let todo = (task.todo + delta).max(0);
    Tasks::new(tx).update_todo(task.id, todo)?;
    Ok(())
}
