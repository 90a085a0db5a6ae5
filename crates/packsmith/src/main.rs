mod async_helpers;
mod cli;
mod commands;
mod error;
mod logging;
mod settings;

use std::process::ExitCode;

use clap::Parser;
use log::debug;
use packsmith_platform::AppPaths;

use crate::cli::Cli;
use crate::commands::Context;
use crate::error::AppError;
use crate::settings::AppSettings;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let paths = match AppPaths::resolve(cli.data_dir.as_deref()) {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("error: {}", AppError::paths_unavailable(e.to_string()));
            return ExitCode::FAILURE;
        }
    };

    let settings = AppSettings::load(&paths);
    logging::init_logging(
        &paths,
        settings.debug_logging || cli.verbose,
        settings.max_log_size_bytes,
    );
    debug!("Using data directory {}", paths.data_dir.display());

    let context = Context { paths, settings };
    match commands::run(&context, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("Command failed: {e:?}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
