use super::{collaborator_by_login, confirm, open_model};
use crate::{
    libs::{
        collaborator::{Collaborator, CollaboratorOrder, CollaboratorQuery},
        messages::Message,
        view::View,
    },
    msg_info, msg_print, msg_success,
};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct CollaboratorArgs {
    #[command(subcommand)]
    command: CollaboratorCommand,
}

#[derive(Debug, Subcommand)]
enum CollaboratorCommand {
    /// Create a collaborator
    Create {
        login: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
    },
    /// Create a collaborator with a generated login
    New,
    /// List collaborators
    List {
        #[arg(short, long, value_enum, default_value_t = CollaboratorOrder::Login)]
        order: CollaboratorOrder,
        #[arg(long)]
        desc: bool,
        /// Only active collaborators
        #[arg(short, long)]
        active: bool,
    },
    /// Change a collaborator's login, names or status
    Edit {
        login: String,
        #[arg(long)]
        new_login: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long, conflicts_with = "deactivate")]
        activate: bool,
        #[arg(long)]
        deactivate: bool,
    },
    /// Remove a collaborator without contributions
    Delete {
        login: String,
        #[arg(short, long)]
        yes: bool,
    },
}

pub fn cmd(args: CollaboratorArgs) -> Result<()> {
    match args.command {
        CollaboratorCommand::Create {
            login,
            first_name,
            last_name,
        } => handle_create(&Collaborator::new(&login, &first_name, &last_name)),
        CollaboratorCommand::New => handle_new(),
        CollaboratorCommand::List { order, desc, active } => handle_list(CollaboratorQuery {
            order_by: order,
            ascending: !desc,
            only_active: active,
            ..Default::default()
        }),
        CollaboratorCommand::Edit {
            login,
            new_login,
            first_name,
            last_name,
            activate,
            deactivate,
        } => {
            let mgr = open_model()?;
            let mut collaborator = collaborator_by_login(&mgr, &login)?;
            if let Some(new_login) = new_login {
                collaborator.login = new_login;
            }
            if let Some(first_name) = first_name {
                collaborator.first_name = first_name;
            }
            if let Some(last_name) = last_name {
                collaborator.last_name = last_name;
            }
            if activate || deactivate {
                collaborator.is_active = activate;
            }
            let updated = mgr.update_collaborator(&collaborator)?;
            msg_success!(Message::CollaboratorUpdated(updated.login));
            Ok(())
        }
        CollaboratorCommand::Delete { login, yes } => handle_delete(&login, yes),
    }
}

fn handle_create(collaborator: &Collaborator) -> Result<()> {
    let created = open_model()?.create_collaborator(collaborator)?;
    msg_success!(Message::CollaboratorCreated(created.login));
    Ok(())
}

fn handle_new() -> Result<()> {
    let created = open_model()?.create_new_collaborator()?;
    msg_success!(Message::CollaboratorCreated(created.login));
    Ok(())
}

fn handle_list(query: CollaboratorQuery) -> Result<()> {
    let collaborators = open_model()?.get_collaborators(&query)?;

    if collaborators.is_empty() {
        msg_info!(Message::NoCollaboratorsFound);
        return Ok(());
    }

    msg_print!(Message::CollaboratorsHeader(collaborators.len()), true);
    View::collaborators(&collaborators)?;
    Ok(())
}

fn handle_delete(login: &str, yes: bool) -> Result<()> {
    let mgr = open_model()?;
    let collaborator = collaborator_by_login(&mgr, login)?;

    if confirm(Message::ConfirmDeleteCollaborator(collaborator.login.clone()), yes)? {
        mgr.remove_collaborator(&collaborator)?;
        msg_success!(Message::CollaboratorDeleted(collaborator.login));
    }
    Ok(())
}
