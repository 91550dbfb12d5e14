//! Contribution queries and task figures.
//!
//! A leaf task is matched by id while a container is matched through its
//! whole sub tree, so every aggregate stays consistent with the tree shape.
//! Leaf status is always read from storage at call time.

use super::collaborator::Collaborator;
use super::contribution::{Contribution, ContributionFilter, IntervalContributions, TaskContributions};
use super::error::{ModelError, ModelMgrResult};
use super::task::{Task, TaskSums};
use super::tree::TaskTree;
use crate::db::contributions::{ContributionSelection, Contributions, TaskScope};
use crate::db::tasks::Tasks;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::collections::HashMap;

/// Number of days separating two dates, whatever their order.
///
/// `count_days_between(d, d)` is `0`; an inclusive interval therefore holds
/// `count_days_between(from, to) + 1` days, and a date is stored at index
/// `count_days_between(from, date)`.
pub fn count_days_between(date1: NaiveDate, date2: NaiveDate) -> i64 {
    (date2 - date1).num_days().abs()
}

pub struct Aggregator<'a> {
    conn: &'a Connection,
}

impl<'a> Aggregator<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Aggregator { conn }
    }

    /// How contributions of `task` are matched.
    pub fn task_scope(&self, task: &Task) -> ModelMgrResult<TaskScope> {
        if TaskTree::new(self.conn).is_leaf(task)? {
            Ok(TaskScope::Task(task.id))
        } else {
            Ok(TaskScope::SubTree(task.full_path()))
        }
    }

    fn selection(&self, filter: &ContributionFilter) -> ModelMgrResult<ContributionSelection> {
        let scope = filter.task.as_ref().map(|task| self.task_scope(task)).transpose()?;
        Ok(ContributionSelection {
            contributor_id: filter.contributor_id,
            scope,
            from: filter.from,
            to: filter.to,
        })
    }

    pub fn get_contributions(&self, filter: &ContributionFilter) -> ModelMgrResult<Vec<Contribution>> {
        Ok(Contributions::new(self.conn).fetch(&self.selection(filter)?)?)
    }

    pub fn get_contributions_sum(&self, filter: &ContributionFilter) -> ModelMgrResult<i64> {
        Ok(Contributions::new(self.conn).sum(&self.selection(filter)?)?)
    }

    pub fn get_contributions_count(&self, filter: &ContributionFilter) -> ModelMgrResult<i64> {
        Ok(Contributions::new(self.conn).count(&self.selection(filter)?)?)
    }

    pub fn get_contributors(&self, filter: &ContributionFilter) -> ModelMgrResult<Vec<Collaborator>> {
        Ok(Contributions::new(self.conn).contributors(&self.selection(filter)?)?)
    }

    /// Budget, initially consumed, todo, consumed and contribution count of a task.
    ///
    /// When `to` is given, the todo sum is reported as it stood on that day:
    /// durations logged after `to` are added back to it.
    pub fn get_task_sums(&self, task: &Task, from: Option<NaiveDate>, to: Option<NaiveDate>) -> ModelMgrResult<TaskSums> {
        let tasks = Tasks::new(self.conn);
        let task = tasks.get(task.id)?.ok_or(ModelError::TaskNotFound(task.id))?;
        let scope = self.task_scope(&task)?;
        let (budget_sum, initially_consumed_sum, mut todo_sum) = match &scope {
            TaskScope::Task(_) => (task.budget, task.initially_consumed, task.todo),
            TaskScope::SubTree(full_path) => tasks.sub_tree_amounts(full_path)?,
        };

        let contributions = Contributions::new(self.conn);
        let selection = ContributionSelection {
            scope: Some(scope.clone()),
            from,
            to,
            ..Default::default()
        };
        let consumed_sum = contributions.sum(&selection)?;
        let contributions_nb = contributions.count(&selection)?;

        if let Some(after) = to.and_then(|to| to.succ_opt()) {
            todo_sum += contributions.sum(&ContributionSelection {
                scope: Some(scope),
                from: Some(after),
                ..Default::default()
            })?;
        }

        Ok(TaskSums {
            budget_sum,
            initially_consumed_sum,
            todo_sum,
            consumed_sum,
            contributions_nb,
        })
    }

    /// Day by day grid of one collaborator's contributions between `from` and `to`.
    pub fn get_interval_contributions(
        &self,
        contributor_id: Option<i64>,
        task: Option<&Task>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ModelMgrResult<IntervalContributions> {
        let contributor_id = contributor_id.ok_or(ModelError::ContributorRequired)?;
        if from > to {
            return Err(ModelError::InvalidDateRange { from, to }.into());
        }
        let mut filter = ContributionFilter::new().contributor(contributor_id).from(from).to(to);
        if let Some(task) = task {
            filter = filter.task(task);
        }
        let contributions = self.get_contributions(&filter)?;

        let days_count = (count_days_between(from, to) + 1) as usize;
        let mut slots: HashMap<i64, Vec<Option<Contribution>>> = HashMap::new();
        for contribution in contributions {
            let index = count_days_between(from, contribution.date) as usize;
            slots.entry(contribution.task_id).or_insert_with(|| vec![None; days_count])[index] = Some(contribution);
        }

        let tasks = Tasks::new(self.conn);
        let tree = TaskTree::new(self.conn);
        let mut task_contributions = Vec::with_capacity(slots.len());
        for (task_id, contributions) in slots {
            let task = tasks.get(task_id)?.ok_or(ModelError::TaskNotFound(task_id))?;
            let code_path = tree.get_task_code_path(&task)?;
            task_contributions.push(TaskContributions {
                task,
                code_path,
                contributions,
            });
        }
        task_contributions.sort_by_key(|tc| tc.task.full_path());

        Ok(IntervalContributions {
            from,
            to,
            task_contributions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn same_day_is_zero() {
        assert_eq!(count_days_between(date(2024, 3, 1), date(2024, 3, 1)), 0);
    }

    #[test]
    fn order_does_not_matter() {
        assert_eq!(count_days_between(date(2024, 1, 10), date(2024, 1, 1)), 9);
        assert_eq!(count_days_between(date(2024, 1, 1), date(2024, 1, 10)), 9);
    }

    #[test]
    fn spans_leap_years() {
        assert_eq!(count_days_between(date(2024, 2, 28), date(2024, 3, 1)), 2);
        assert_eq!(count_days_between(date(2023, 2, 28), date(2023, 3, 1)), 1);
        assert_eq!(count_days_between(date(2023, 12, 31), date(2025, 1, 1)), 367);
    }
}
