use super::open_model;
use crate::{
    libs::{messages::Message, view::View},
    msg_info, msg_print,
};
use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

#[derive(Debug, Args)]
pub struct SumsArgs {
    /// Code paths of the tasks; every root task when omitted
    tasks: Vec<String>,
    /// Only count contributions from this day on
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Only count contributions up to this day; todo is reported as of that day
    #[arg(long)]
    to: Option<NaiveDate>,
}

pub fn cmd(args: SumsArgs) -> Result<()> {
    let mgr = open_model()?;

    let tasks = if args.tasks.is_empty() {
        mgr.get_sub_tasks(None)?
    } else {
        let code_paths: Vec<&str> = args.tasks.iter().map(String::as_str).collect();
        mgr.get_tasks_by_code_path(&code_paths)?
    };

    if tasks.is_empty() {
        msg_info!(Message::NoTasksFound);
        return Ok(());
    }

    let mut rows = Vec::with_capacity(tasks.len());
    for task in &tasks {
        let sums = mgr.get_task_sums(task, args.from, args.to)?;
        rows.push((mgr.get_task_code_path(task)?, sums));
    }

    msg_print!(Message::SumsHeader, true);
    View::task_sums(&rows)?;
    Ok(())
}
