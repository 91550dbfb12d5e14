use super::{confirm, open_model};
use crate::{
    libs::{messages::Message, xml},
    msg_bail_anyhow, msg_success,
};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// XML document produced by `actman export`
    path: PathBuf,
    #[arg(short, long)]
    yes: bool,
}

pub fn cmd(args: ImportArgs) -> Result<()> {
    if !args.path.is_file() {
        msg_bail_anyhow!(Message::FileNotFound(args.path.display().to_string()));
    }
    let mgr = open_model()?;

    if !confirm(Message::ConfirmImport(args.path.display().to_string()), args.yes)? {
        return Ok(());
    }

    let summary = xml::import_from_file(&mgr, &args.path)?;
    msg_success!(Message::ModelImported {
        durations: summary.durations,
        collaborators: summary.collaborators,
        tasks: summary.tasks,
        contributions: summary.contributions,
    });
    Ok(())
}
