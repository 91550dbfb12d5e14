use super::{confirm, open_model, parse_amount};
use crate::{
    libs::{duration::Duration, error::ModelError, formatter::hundredth_to_entry, messages::Message, model_mgr::ModelMgr, view::View},
    msg_error_anyhow, msg_info, msg_print, msg_success,
};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct DurationArgs {
    #[command(subcommand)]
    command: DurationCommand,
}

#[derive(Debug, Subcommand)]
enum DurationCommand {
    /// Add a duration, e.g. `0.25`
    Create {
        #[arg(value_parser = parse_amount)]
        value: i64,
    },
    /// List durations
    List {
        #[arg(short, long)]
        active: bool,
    },
    /// Offer a duration again when recording contributions
    Activate {
        #[arg(value_parser = parse_amount)]
        value: i64,
    },
    /// Stop offering a duration when recording contributions
    Deactivate {
        #[arg(value_parser = parse_amount)]
        value: i64,
    },
    /// Replace an unused duration by another value
    Change {
        #[arg(value_parser = parse_amount)]
        old: i64,
        #[arg(value_parser = parse_amount)]
        new: i64,
    },
    /// Remove an unused duration
    Delete {
        #[arg(value_parser = parse_amount)]
        value: i64,
        #[arg(short, long)]
        yes: bool,
    },
}

pub fn cmd(args: DurationArgs) -> Result<()> {
    let mgr = open_model()?;
    match args.command {
        DurationCommand::Create { value } => {
            let created = mgr.create_duration(&Duration::new(value))?;
            msg_success!(Message::DurationCreated(hundredth_to_entry(created.id)));
        }
        DurationCommand::List { active } => {
            let durations = if active { mgr.get_active_durations()? } else { mgr.get_durations()? };
            if durations.is_empty() {
                msg_info!(Message::NoDurationsFound);
                return Ok(());
            }
            let mut rows = Vec::with_capacity(durations.len());
            for duration in durations {
                let used = mgr.is_duration_used(duration.id)?;
                rows.push((duration, used));
            }
            msg_print!(Message::DurationsHeader(rows.len()), true);
            View::durations(&rows)?;
        }
        DurationCommand::Activate { value } => set_active(&mgr, value, true)?,
        DurationCommand::Deactivate { value } => set_active(&mgr, value, false)?,
        DurationCommand::Change { old, new } => {
            let old = existing(&mgr, old)?;
            let updated = mgr.update_duration(
                &old,
                &Duration {
                    id: new,
                    is_active: old.is_active,
                },
            )?;
            msg_success!(Message::DurationUpdated(hundredth_to_entry(updated.id)));
        }
        DurationCommand::Delete { value, yes } => {
            let duration = existing(&mgr, value)?;
            if confirm(Message::ConfirmDeleteDuration(hundredth_to_entry(duration.id)), yes)? {
                mgr.remove_duration(&duration)?;
                msg_success!(Message::DurationDeleted(hundredth_to_entry(duration.id)));
            }
        }
    }
    Ok(())
}

fn existing(mgr: &ModelMgr, value: i64) -> Result<Duration> {
    mgr.get_duration(value)?
        .ok_or_else(|| msg_error_anyhow!(ModelError::DurationNotFound(value)))
}

fn set_active(mgr: &ModelMgr, value: i64, is_active: bool) -> Result<()> {
    let duration = existing(mgr, value)?;
    let updated = mgr.update_duration(&duration, &Duration { is_active, ..duration })?;
    msg_success!(Message::DurationUpdated(hundredth_to_entry(updated.id)));
    Ok(())
}
