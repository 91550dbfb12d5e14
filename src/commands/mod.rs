pub mod collaborator;
pub mod contribution;
pub mod duration;
pub mod export;
pub mod import;
pub mod init;
pub mod report;
pub mod sums;
pub mod task;

use crate::db::db::Db;
use crate::libs::collaborator::Collaborator;
use crate::libs::config::Config;
use crate::libs::error::ModelError;
use crate::libs::formatter::entry_to_hundredth;
use crate::libs::messages::Message;
use crate::libs::model_mgr::ModelMgr;
use crate::{msg_debug, msg_error_anyhow, msg_info};
use anyhow::Result;
use clap::{Parser, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configuration initialization")]
    Init(init::InitArgs),
    #[command(about = "Manage collaborators")]
    Collaborator(collaborator::CollaboratorArgs),
    #[command(about = "Manage the durations contributions may use")]
    Duration(duration::DurationArgs),
    #[command(about = "Manage the task tree")]
    Task(task::TaskArgs),
    #[command(about = "Record and review contributions")]
    Contribution(contribution::ContributionArgs),
    #[command(about = "Show budget, consumption and todo figures of tasks")]
    Sums(sums::SumsArgs),
    #[command(about = "Day by day contributions of a collaborator")]
    Report(report::ReportArgs),
    #[command(about = "Export the whole model to an XML document")]
    Export(export::ExportArgs),
    #[command(about = "Import an XML document into the model")]
    Import(import::ImportArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::Collaborator(args) => collaborator::cmd(args),
            Commands::Duration(args) => duration::cmd(args),
            Commands::Task(args) => task::cmd(args),
            Commands::Contribution(args) => contribution::cmd(args),
            Commands::Sums(args) => sums::cmd(args),
            Commands::Report(args) => report::cmd(args),
            Commands::Export(args) => export::cmd(args),
            Commands::Import(args) => import::cmd(args),
        }
    }
}

/// Opens the model configured for the current user.
pub(crate) fn open_model() -> Result<ModelMgr> {
    let config = Config::read()?;
    let path = config.database_path()?;
    msg_debug!(Message::DatabaseLocation(path.display().to_string()));
    let db = Db::open(path)?;
    Ok(ModelMgr::new(db, config.model))
}

/// Asks for confirmation unless `yes` is set.
pub(crate) fn confirm(prompt: Message, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt.to_string())
        .default(false)
        .interact()?;
    if !confirmed {
        msg_info!(Message::OperationCancelled);
    }
    Ok(confirmed)
}

pub(crate) fn collaborator_by_login(mgr: &ModelMgr, login: &str) -> Result<Collaborator> {
    let collaborator = mgr
        .get_collaborator_by_login(login)?
        .ok_or_else(|| msg_error_anyhow!(ModelError::UnknownLogin(login.to_string())))?;
    Ok(collaborator)
}

/// Parses a decimal amount such as `1.5` into hundredths.
pub(crate) fn parse_amount(value: &str) -> Result<i64, String> {
    entry_to_hundredth(value).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parses(args: &[&str]) -> bool {
        Cli::try_parse_from(std::iter::once("actman").chain(args.iter().copied())).is_ok()
    }

    #[test]
    fn documented_verbs_parse() {
        assert!(parses(&["collaborator", "create", "jdoe"]));
        assert!(parses(&["collaborator", "new"]));
        assert!(parses(&["collaborator", "list", "--active"]));
        assert!(parses(&["collaborator", "edit", "jdoe", "--deactivate"]));
        assert!(parses(&["collaborator", "delete", "jdoe", "--yes"]));

        assert!(parses(&["duration", "create", "0.25"]));
        assert!(parses(&["duration", "list"]));
        assert!(parses(&["duration", "activate", "0.25"]));
        assert!(parses(&["duration", "deactivate", "0.25"]));
        assert!(parses(&["duration", "change", "0.25", "0.5"]));
        assert!(parses(&["duration", "delete", "0.25", "--yes"]));

        assert!(parses(&["task", "create", "DEV", "Development", "--parent", "/PRJ"]));
        assert!(parses(&["task", "new"]));
        assert!(parses(&["task", "list"]));
        assert!(parses(&["task", "edit", "/PRJ/DEV", "--name", "Dev"]));
        assert!(parses(&["task", "move", "/PRJ/DEV", "--root"]));
        assert!(parses(&["task", "up", "/PRJ/DEV"]));
        assert!(parses(&["task", "down", "/PRJ/DEV"]));
        assert!(parses(&["task", "number", "/PRJ/DEV", "2"]));
        assert!(parses(&["task", "delete", "/PRJ/DEV", "--yes"]));

        assert!(parses(&["contribution", "add", "jdoe", "/PRJ/DEV", "1"]));
        assert!(parses(&["contribution", "edit", "jdoe", "/PRJ/DEV", "0.5"]));
        assert!(parses(&["contribution", "delete", "jdoe", "/PRJ/DEV", "--yes"]));
        assert!(parses(&["contribution", "list", "--login", "jdoe"]));
        assert!(parses(&["contribution", "reassign", "jdoe", "/PRJ/DEV", "/PRJ/QA"]));
        assert!(parses(&["contribution", "years"]));
    }

    #[test]
    fn retired_verbs_are_rejected() {
        assert!(!parses(&["collaborator", "add", "jdoe"]));
        assert!(!parses(&["task", "remove", "/PRJ/DEV"]));
        assert!(!parses(&["duration", "rm", "0.25"]));
    }
}
