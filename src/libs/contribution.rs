use super::task::Task;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Time spent by a collaborator on a leaf task on a given day.
///
/// Identity is `(contributor_id, task_id, date)`; the amount is the id of a
/// [`Duration`](super::duration::Duration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub contributor_id: i64,
    pub task_id: i64,
    pub date: NaiveDate,
    pub duration_id: i64,
}

impl Contribution {
    pub fn new(contributor_id: i64, task_id: i64, date: NaiveDate, duration_id: i64) -> Self {
        Contribution {
            contributor_id,
            task_id,
            date,
            duration_id,
        }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }
}

/// Optional restrictions applied to contribution queries.
///
/// An omitted dimension means "no restriction". `from` and `to` are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContributionFilter {
    pub contributor_id: Option<i64>,
    pub task: Option<Task>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ContributionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contributor(mut self, contributor_id: i64) -> Self {
        self.contributor_id = Some(contributor_id);
        self
    }

    pub fn task(mut self, task: &Task) -> Self {
        self.task = Some(task.clone());
        self
    }

    pub fn from(mut self, from: NaiveDate) -> Self {
        self.from = Some(from);
        self
    }

    pub fn to(mut self, to: NaiveDate) -> Self {
        self.to = Some(to);
        self
    }
}

/// One task's contributions over a date interval, one slot per day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskContributions {
    pub task: Task,
    /// `/`-joined code path of the task, handy for display.
    pub code_path: String,
    pub contributions: Vec<Option<Contribution>>,
}

impl TaskContributions {
    pub fn total(&self) -> i64 {
        self.contributions.iter().flatten().map(|c| c.duration_id).sum()
    }
}

/// Per-task, per-day grid of one collaborator's contributions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalContributions {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub task_contributions: Vec<TaskContributions>,
}

impl IntervalContributions {
    pub fn days_count(&self) -> usize {
        self.task_contributions
            .first()
            .map(|tc| tc.contributions.len())
            .unwrap_or_else(|| super::aggregation::count_days_between(self.from, self.to) as usize + 1)
    }

    /// Sum of the durations of one day column.
    pub fn day_total(&self, index: usize) -> i64 {
        self.task_contributions
            .iter()
            .filter_map(|tc| tc.contributions.get(index).copied().flatten())
            .map(|c| c.duration_id)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_serialize_as_iso_text() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let contribution = Contribution::new(1, 2, date, 50);

        let json = serde_json::to_value(contribution).unwrap();
        assert_eq!(json["date"], "2024-03-05");
        let parsed: Contribution = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.date, date);
    }
}
