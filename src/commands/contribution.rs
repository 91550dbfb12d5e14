use super::{collaborator_by_login, confirm, open_model, parse_amount};
use crate::{
    libs::{
        contribution::{Contribution, ContributionFilter},
        error::ModelError,
        formatter::hundredth_to_entry,
        messages::Message,
        model_mgr::ModelMgr,
        view::View,
    },
    msg_error_anyhow, msg_info, msg_print, msg_success,
};
use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};
use std::collections::HashMap;

#[derive(Debug, Args)]
pub struct ContributionArgs {
    #[command(subcommand)]
    command: ContributionCommand,
}

#[derive(Debug, Args)]
struct Target {
    /// Contributor login
    login: String,
    /// Code path of the leaf task
    task: String,
    /// Day of the contribution, today when omitted
    #[arg(short, long)]
    date: Option<NaiveDate>,
}

#[derive(Debug, Subcommand)]
enum ContributionCommand {
    /// Record time spent on a leaf task
    Add {
        #[command(flatten)]
        target: Target,
        #[arg(value_parser = parse_amount)]
        duration: i64,
        /// Leave the task's todo untouched
        #[arg(long)]
        keep_todo: bool,
    },
    /// Change the duration of a contribution
    Edit {
        #[command(flatten)]
        target: Target,
        #[arg(value_parser = parse_amount)]
        duration: i64,
        #[arg(long)]
        keep_todo: bool,
    },
    /// Remove a contribution
    Delete {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        keep_todo: bool,
        #[arg(short, long)]
        yes: bool,
    },
    /// List contributions
    List {
        #[arg(short, long)]
        login: Option<String>,
        /// Task code path; a container task covers its whole sub tree
        #[arg(short, long)]
        task: Option<String>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Move a collaborator's contributions from one leaf task to another
    Reassign {
        login: String,
        task: String,
        new_task: String,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Years holding contributions
    Years,
}

pub fn cmd(args: ContributionArgs) -> Result<()> {
    let mgr = open_model()?;
    match args.command {
        ContributionCommand::Add {
            target,
            duration,
            keep_todo,
        } => {
            let (contributor, task, date) = resolve(&mgr, &target)?;
            mgr.create_duration_if_not_exists(duration)?;
            let contribution = Contribution::new(contributor, task, date, duration);
            mgr.create_contribution(&contribution, update_todo(&mgr, keep_todo))?;
            msg_success!(Message::ContributionCreated(hundredth_to_entry(duration), target.task, date));
        }
        ContributionCommand::Edit {
            target,
            duration,
            keep_todo,
        } => {
            let contribution = existing(&mgr, &target)?;
            mgr.create_duration_if_not_exists(duration)?;
            mgr.update_contribution(&contribution, duration, update_todo(&mgr, keep_todo))?;
            msg_success!(Message::ContributionUpdated(target.task, contribution.date));
        }
        ContributionCommand::Delete { target, keep_todo, yes } => {
            let contribution = existing(&mgr, &target)?;
            let prompt = Message::ConfirmDeleteContribution(
                hundredth_to_entry(contribution.duration_id),
                target.task.clone(),
                contribution.date,
            );
            if confirm(prompt, yes)? {
                mgr.remove_contribution(&contribution, update_todo(&mgr, keep_todo))?;
                msg_success!(Message::ContributionDeleted(target.task, contribution.date));
            }
        }
        ContributionCommand::List { login, task, from, to } => {
            let mut filter = ContributionFilter {
                from,
                to,
                ..Default::default()
            };
            if let Some(login) = login {
                filter = filter.contributor(collaborator_by_login(&mgr, &login)?.id);
            }
            if let Some(task) = task {
                filter = filter.task(&mgr.get_task_by_code_path(&task)?);
            }
            handle_list(&mgr, &filter)?;
        }
        ContributionCommand::Reassign {
            login,
            task,
            new_task,
            from,
            to,
        } => {
            let contributor = collaborator_by_login(&mgr, &login)?;
            let task = mgr.get_task_by_code_path(&task)?;
            let new_task_entity = mgr.get_task_by_code_path(&new_task)?;
            let filter = ContributionFilter {
                contributor_id: Some(contributor.id),
                task: Some(task),
                from,
                to,
            };
            let contributions = mgr.get_contributions(&filter)?;
            if contributions.is_empty() {
                msg_info!(Message::NoContributionsFound);
                return Ok(());
            }
            let moved = mgr.change_contribution_task(&contributions, &new_task_entity)?;
            msg_success!(Message::ContributionsReassigned(moved.len(), new_task));
        }
        ContributionCommand::Years => {
            let years = mgr.get_contribution_years()?;
            if years.is_empty() {
                msg_info!(Message::NoContributionsFound);
                return Ok(());
            }
            for year in years {
                println!("{year}");
            }
        }
    }
    Ok(())
}

/// Contributor id, task id and date designated on the command line.
fn resolve(mgr: &ModelMgr, target: &Target) -> Result<(i64, i64, NaiveDate)> {
    let contributor = collaborator_by_login(mgr, &target.login)?;
    let task = mgr.get_task_by_code_path(&target.task)?;
    let date = target.date.unwrap_or_else(|| Local::now().date_naive());
    Ok((contributor.id, task.id, date))
}

fn existing(mgr: &ModelMgr, target: &Target) -> Result<Contribution> {
    let (contributor_id, task_id, date) = resolve(mgr, target)?;
    let task = mgr.get_task(task_id)?.ok_or(ModelError::TaskNotFound(task_id))?;
    let filter = ContributionFilter::new().contributor(contributor_id).task(&task).from(date).to(date);
    let contribution = mgr
        .get_contributions(&filter)?
        .into_iter()
        .find(|contribution| contribution.task_id == task_id)
        .ok_or_else(|| {
            msg_error_anyhow!(ModelError::ContributionNotFound {
                contributor_id,
                task_id,
                date,
            })
        })?;
    Ok(contribution)
}

fn update_todo(mgr: &ModelMgr, keep_todo: bool) -> bool {
    mgr.config().update_todo && !keep_todo
}

fn handle_list(mgr: &ModelMgr, filter: &ContributionFilter) -> Result<()> {
    let contributions = mgr.get_contributions(filter)?;

    if contributions.is_empty() {
        msg_info!(Message::NoContributionsFound);
        return Ok(());
    }

    let mut logins: HashMap<i64, String> = HashMap::new();
    let mut code_paths: HashMap<i64, String> = HashMap::new();
    let mut rows = Vec::with_capacity(contributions.len());
    for contribution in contributions {
        if !logins.contains_key(&contribution.contributor_id) {
            let login = mgr
                .get_collaborator(contribution.contributor_id)?
                .map(|collaborator| collaborator.login)
                .unwrap_or_default();
            logins.insert(contribution.contributor_id, login);
        }
        if !code_paths.contains_key(&contribution.task_id) {
            let task = mgr
                .get_task(contribution.task_id)?
                .ok_or(ModelError::TaskNotFound(contribution.task_id))?;
            code_paths.insert(contribution.task_id, mgr.get_task_code_path(&task)?);
        }
        rows.push((
            contribution,
            logins[&contribution.contributor_id].clone(),
            code_paths[&contribution.task_id].clone(),
        ));
    }

    msg_print!(Message::ContributionsHeader(rows.len()), true);
    View::contributions(&rows)?;
    Ok(())
}
