use super::open_model;
use crate::{
    libs::{config::Config, messages::Message},
    msg_info, msg_print, msg_success,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Print the current configuration instead of running the wizard
    #[arg(short, long)]
    show: bool,
}

pub fn cmd(init_args: InitArgs) -> Result<()> {
    if init_args.show {
        let config = Config::read()?;
        msg_info!(Message::DatabaseLocation(config.database_path()?.display().to_string()));
        msg_print!(serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    Config::init()?.save()?;
    msg_success!(Message::ConfigSaved);

    // Creates the database and its schema when missing
    open_model()?;
    msg_info!(Message::DatabaseLocation(Config::read()?.database_path()?.display().to_string()));
    Ok(())
}
