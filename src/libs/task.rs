use super::task_path::TaskPath;
use serde::{Deserialize, Serialize};

/// A node of the task tree.
///
/// `path` and `number` locate the task; they are owned by the tree engine and
/// any update that is not a move must leave them as they were fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Generated on insert; `0` until then.
    pub id: i64,
    pub path: TaskPath,
    pub number: u8,
    pub code: String,
    pub name: String,
    /// Amounts in hundredths of a unit.
    pub budget: i64,
    pub initially_consumed: i64,
    pub todo: i64,
    pub comment: Option<String>,
}

impl Task {
    pub fn new(code: &str, name: &str) -> Self {
        Task {
            id: 0,
            path: TaskPath::root(),
            number: 0,
            code: code.to_string(),
            name: name.to_string(),
            budget: 0,
            initially_consumed: 0,
            todo: 0,
            comment: None,
        }
    }

    pub fn with_amounts(mut self, budget: i64, initially_consumed: i64, todo: i64) -> Self {
        self.budget = budget;
        self.initially_consumed = initially_consumed;
        self.todo = todo;
        self
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }

    /// The path children of this task are stored under.
    pub fn full_path(&self) -> TaskPath {
        self.path.child(self.number)
    }

    pub(crate) fn has_amounts(&self) -> bool {
        self.budget != 0 || self.initially_consumed != 0 || self.todo != 0
    }
}

/// Figures aggregated over a task, or over its whole sub tree for a container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSums {
    pub budget_sum: i64,
    pub initially_consumed_sum: i64,
    pub todo_sum: i64,
    pub consumed_sum: i64,
    pub contributions_nb: i64,
}

impl TaskSums {
    /// Budget minus everything consumed and still to do.
    pub fn delta(&self) -> i64 {
        self.budget_sum - self.initially_consumed_sum - self.consumed_sum - self.todo_sum
    }
}

/// Task field a search applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TaskSearchField {
    Code,
    Name,
}

/// Matching rule of a task search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TaskSearchCriterion {
    Is,
    StartsWith,
    EndsWith,
    Contains,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSearchFilter {
    pub field: TaskSearchField,
    pub criterion: TaskSearchCriterion,
    pub value: String,
}

impl TaskSearchFilter {
    pub fn new(field: TaskSearchField, criterion: TaskSearchCriterion, value: &str) -> Self {
        TaskSearchFilter {
            field,
            criterion,
            value: value.to_string(),
        }
    }

    pub(crate) fn column(&self) -> &'static str {
        match self.field {
            TaskSearchField::Code => "tsk_code",
            TaskSearchField::Name => "tsk_name",
        }
    }

    /// `LIKE` pattern for the criterion, with `%`, `_` and `\` escaped in the value.
    pub(crate) fn like_pattern(&self) -> String {
        let escaped = self.value.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
        match self.criterion {
            TaskSearchCriterion::Is => escaped,
            TaskSearchCriterion::StartsWith => format!("{escaped}%"),
            TaskSearchCriterion::EndsWith => format!("%{escaped}"),
            TaskSearchCriterion::Contains => format!("%{escaped}%"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_path_appends_number() {
        let mut task = Task::new("DEV", "Development");
        task.path = TaskPath::parse("01").unwrap();
        task.number = 3;
        assert_eq!(task.full_path().as_str(), "0103");
    }

    #[test]
    fn search_pattern_escapes_wildcards() {
        let filter = TaskSearchFilter::new(TaskSearchField::Name, TaskSearchCriterion::Contains, "50%_off");
        assert_eq!(filter.like_pattern(), "%50\\%\\_off%");
        let filter = TaskSearchFilter::new(TaskSearchField::Code, TaskSearchCriterion::StartsWith, "AB");
        assert_eq!(filter.like_pattern(), "AB%");
    }
}
