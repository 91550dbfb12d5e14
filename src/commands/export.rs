use super::open_model;
use crate::{
    libs::{messages::Message, xml},
    msg_success,
};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Destination XML file
    path: PathBuf,
    /// Also write the document grammar (actman.dtd) next to the file
    #[arg(long)]
    dtd: bool,
}

pub fn cmd(args: ExportArgs) -> Result<()> {
    let mgr = open_model()?;
    xml::export_to_file(&mgr, &args.path)?;

    if args.dtd {
        let dir = args.path.parent().map(PathBuf::from).unwrap_or_default();
        xml::write_dtd(dir)?;
    }

    msg_success!(Message::ModelExported(args.path.display().to_string()));
    Ok(())
}
