use super::collaborator::Collaborator;
use super::contribution::{Contribution, IntervalContributions};
use super::duration::Duration;
use super::formatter::hundredth_to_entry;
use super::task::{Task, TaskSums};
use anyhow::Result;
use chrono::Datelike;
use prettytable::{row, Cell, Row, Table};

pub struct View {}

impl View {
    pub fn collaborators(collaborators: &[Collaborator]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "LOGIN", "FIRST NAME", "LAST NAME", "ACTIVE"]);
        for collaborator in collaborators {
            table.add_row(row![
                collaborator.id,
                collaborator.login,
                collaborator.first_name,
                collaborator.last_name,
                yes_no(collaborator.is_active)
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn durations(durations: &[(Duration, bool)]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["DURATION", "ACTIVE", "USED"]);
        for (duration, used) in durations {
            table.add_row(row![r->hundredth_to_entry(duration.id), yes_no(duration.is_active), yes_no(*used)]);
        }
        table.printstd();

        Ok(())
    }

    /// Tasks with their code path, indented by depth.
    pub fn tasks(tasks: &[(Task, String)]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["#", "CODE PATH", "NAME", "BUDGET", "INIT. CONSUMED", "TODO", "COMMENT"]);
        for (task, code_path) in tasks {
            table.add_row(row![
                task.number,
                code_path,
                format!("{}{}", "  ".repeat(task.path.depth()), task.name),
                r->hundredth_to_entry(task.budget),
                r->hundredth_to_entry(task.initially_consumed),
                r->hundredth_to_entry(task.todo),
                task.comment.as_deref().unwrap_or("")
            ]);
        }
        table.printstd();

        Ok(())
    }

    /// Contributions with the contributor login and the task code path.
    pub fn contributions(contributions: &[(Contribution, String, String)]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["DATE", "LOGIN", "TASK", "DURATION"]);
        let mut total = 0;
        for (contribution, login, code_path) in contributions {
            total += contribution.duration_id;
            table.add_row(row![
                contribution.date.format("%Y-%m-%d"),
                login,
                code_path,
                r->hundredth_to_entry(contribution.duration_id)
            ]);
        }
        table.add_row(row!["", "", "TOTAL", r->hundredth_to_entry(total)]);
        table.printstd();

        Ok(())
    }

    pub fn task_sums(sums: &[(String, TaskSums)]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["TASK", "BUDGET", "INIT. CONSUMED", "CONSUMED", "TODO", "DELTA", "CONTRIBUTIONS"]);
        for (code_path, sums) in sums {
            table.add_row(row![
                code_path,
                r->hundredth_to_entry(sums.budget_sum),
                r->hundredth_to_entry(sums.initially_consumed_sum),
                r->hundredth_to_entry(sums.consumed_sum),
                r->hundredth_to_entry(sums.todo_sum),
                r->hundredth_to_entry(sums.delta()),
                r->sums.contributions_nb
            ]);
        }
        table.printstd();

        Ok(())
    }

    /// Day by day grid: one row per task, one column per day, totals last.
    pub fn interval_contributions(interval: &IntervalContributions) -> Result<()> {
        let mut table = Table::new();
        let days = interval.days_count();

        let mut header = vec![Cell::new("TASK")];
        header.extend(interval_days(interval).map(|day| Cell::new(&day)));
        header.push(Cell::new("TOTAL"));
        table.add_row(Row::new(header));

        for task_contributions in &interval.task_contributions {
            let mut cells = vec![Cell::new(&task_contributions.code_path)];
            cells.extend(task_contributions.contributions.iter().map(|slot| {
                let text = slot.map(|c| hundredth_to_entry(c.duration_id)).unwrap_or_default();
                Cell::new(&text).style_spec("r")
            }));
            cells.push(Cell::new(&hundredth_to_entry(task_contributions.total())).style_spec("r"));
            table.add_row(Row::new(cells));
        }

        let mut totals = vec![Cell::new("TOTAL")];
        let mut grand_total = 0;
        for index in 0..days {
            let total = interval.day_total(index);
            grand_total += total;
            totals.push(Cell::new(&hundredth_to_entry(total)).style_spec("r"));
        }
        totals.push(Cell::new(&hundredth_to_entry(grand_total)).style_spec("r"));
        table.add_row(Row::new(totals));
        table.printstd();

        Ok(())
    }
}

/// Column labels of an interval grid (`dd/mm`).
pub fn interval_days(interval: &IntervalContributions) -> impl Iterator<Item = String> + '_ {
    interval
        .from
        .iter_days()
        .take_while(move |day| *day <= interval.to)
        .map(|day| format!("{:02}/{:02}", day.day(), day.month()))
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
