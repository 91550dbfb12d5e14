use super::{collaborator_by_login, open_model};
use crate::{
    libs::{
        contribution::IntervalContributions,
        formatter::hundredth_to_entry,
        messages::Message,
        view::{interval_days, View},
    },
    msg_info, msg_print, msg_success,
};
use anyhow::Result;
use chrono::{Datelike, Days, Local, NaiveDate};
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Contributor login
    login: String,
    /// Restrict to a task code path and its sub tree
    #[arg(short, long)]
    task: Option<String>,
    /// First day, Monday of the current week when omitted
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last day, six days after the first one when omitted
    #[arg(long)]
    to: Option<NaiveDate>,
    /// Write the grid to a CSV file instead of printing it
    #[arg(long)]
    csv: Option<PathBuf>,
}

pub fn cmd(args: ReportArgs) -> Result<()> {
    let mgr = open_model()?;
    let contributor = collaborator_by_login(&mgr, &args.login)?;
    let task = args.task.as_deref().map(|task| mgr.get_task_by_code_path(task)).transpose()?;

    let from = args.from.unwrap_or_else(|| {
        let today = Local::now().date_naive();
        today - Days::new(u64::from(today.weekday().num_days_from_monday()))
    });
    let to = args.to.unwrap_or_else(|| from.checked_add_days(Days::new(6)).unwrap_or(from));

    let interval = mgr.get_interval_contributions(Some(&contributor), task.as_ref(), from, to)?;

    if let Some(path) = args.csv {
        write_csv(&interval, &path)?;
        msg_success!(Message::ReportSaved(path.display().to_string()));
        return Ok(());
    }

    if interval.task_contributions.is_empty() {
        msg_info!(Message::NoContributionsFound);
        return Ok(());
    }

    msg_print!(Message::ReportHeader(contributor.login, from, to), true);
    View::interval_contributions(&interval)?;
    Ok(())
}

fn write_csv(interval: &IntervalContributions, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["Task".to_string()];
    header.extend(interval_days(interval));
    header.push("Total".to_string());
    wtr.write_record(&header)?;

    for task_contributions in &interval.task_contributions {
        let mut record = vec![task_contributions.code_path.clone()];
        record.extend(
            task_contributions
                .contributions
                .iter()
                .map(|slot| slot.map(|c| hundredth_to_entry(c.duration_id)).unwrap_or_default()),
        );
        record.push(hundredth_to_entry(task_contributions.total()));
        wtr.write_record(&record)?;
    }

    let mut totals = vec!["Total".to_string()];
    let mut grand_total = 0;
    for index in 0..interval.days_count() {
        let total = interval.day_total(index);
        grand_total += total;
        totals.push(hundredth_to_entry(total));
    }
    totals.push(hundredth_to_entry(grand_total));
    wtr.write_record(&totals)?;

    wtr.flush()?;
    Ok(())
}
