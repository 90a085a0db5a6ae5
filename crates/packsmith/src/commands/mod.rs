mod catalog;
mod feedback;
mod package;
mod project;
mod settings;

use std::time::Duration;

use packsmith_core::{PackageStore, UpdateProject};
use packsmith_model::{PackageSet, UpdateVersion};
use packsmith_platform::{AppPaths, ProjectLock};

use crate::cli::Commands;
use crate::error::AppError;
use crate::settings::AppSettings;

pub struct Context {
    pub paths: AppPaths,
    pub settings: AppSettings,
}

impl Context {
    pub fn http_client(&self) -> Result<reqwest::Client, AppError> {
        reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(self.settings.http_timeout_secs))
            .user_agent(format!("packsmith/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| AppError::message(format!("Failed to build HTTP client: {error}")))
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.settings.upload_timeout_secs)
    }

    pub fn load_project(&self, name: &str) -> Result<UpdateProject, AppError> {
        UpdateProject::load(&self.paths, name).map_err(|error| AppError::project_failed("load", error))
    }

    /// Locks the project for the lifetime of the returned guard.
    pub fn lock_project(&self, name: &str) -> Result<ProjectLock, AppError> {
        match ProjectLock::acquire(&self.paths.project_lock_file(name)) {
            Ok(lock) => Ok(lock),
            Err(packsmith_platform::LockError::AlreadyLocked { .. }) => {
                Err(AppError::project_locked(name))
            }
            Err(error) => Err(AppError::project_failed("lock", error)),
        }
    }

    pub fn load_packages(&self, project: &str) -> Result<PackageSet, AppError> {
        PackageStore::for_project(&self.paths, project)
            .load()
            .map_err(|error| AppError::package_failed("load", error))
    }

    pub fn save_packages(&self, project: &str, set: &PackageSet) -> Result<(), AppError> {
        PackageStore::for_project(&self.paths, project)
            .save(set)
            .map_err(|error| AppError::package_failed("save", error))
    }
}

pub fn parse_version(argument: &'static str, literal: &str) -> Result<UpdateVersion, AppError> {
    literal
        .parse()
        .map_err(|error: packsmith_model::VersionParseError| {
            AppError::invalid_argument(argument, error.to_string())
        })
}

pub async fn run(context: &Context, command: Commands) -> Result<(), AppError> {
    match command {
        Commands::Project { command } => project::run(context, command),
        Commands::Package { command } => package::run(context, command).await,
        Commands::Catalog { command } => {
            catalog::run(&command);
            Ok(())
        }
        Commands::Feedback(args) => feedback::run(context, args).await,
        Commands::Settings { command } => settings::run(context, command),
    }
}
