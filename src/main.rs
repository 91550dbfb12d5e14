use actman::commands::Cli;
use actman::libs::messages::macros::is_debug_mode;
use actman::msg_error;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    if is_debug_mode() {
        tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "actman=debug".into()))
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }

    match Cli::menu() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            msg_error!(format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
