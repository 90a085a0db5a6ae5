use std::path::PathBuf;

use packsmith_model::{Transfer, TransferError, UpdateVersion};
use packsmith_platform::AppPaths;
use thiserror::Error;

use crate::editor::SaveOutcome;
use crate::project::{ProjectError, UpdateProject};

pub const CONFIGURATION_REMOTE_NAME: &str = "updates.json";

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Error while uploading the new configuration: {0}")]
    Upload(#[source] TransferError),

    #[error("Error while saving the project: {0}")]
    ProjectSave(#[source] ProjectError),

    #[error("Package \"{version}\" is not part of the project")]
    PackageNotFound { version: String },

    #[error("Failed to read package directory {}: {source}", .path.display())]
    ReadPackageDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PublishError {
    /// Connection-level failures are worth another attempt; rejections and
    /// local errors are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Upload(TransferError::NetworkError { .. }))
    }
}

/// Re-publishes the configuration of an already released package after it
/// was edited: upload `updates.json`, rename the remote package directory
/// when the version changed, then save the project.
///
/// # Errors
/// Returns [`PublishError::Upload`] when a transfer step fails and
/// [`PublishError::ProjectSave`] when the project file cannot be written.
pub async fn publish_configuration(
    transfer: &dyn Transfer,
    outcome: &SaveOutcome,
    paths: &AppPaths,
    project: &UpdateProject,
) -> Result<(), PublishError> {
    log::info!(
        "Uploading configuration of {} via {}",
        project.name,
        transfer.name()
    );
    let config_file = paths.package_config_file(&project.name);
    transfer
        .upload_file(&config_file, CONFIGURATION_REMOTE_NAME)
        .await
        .map_err(PublishError::Upload)?;

    if outcome.renamed {
        transfer
            .rename_directory(
                &outcome.old_version.to_string(),
                &outcome.new_version.to_string(),
            )
            .await
            .map_err(PublishError::Upload)?;
    }

    project.save(paths).map_err(PublishError::ProjectSave)
}

/// Releases a package for the first time: uploads the files of its local
/// directory below `<version>/`, then `updates.json`, marks the package as
/// released and saves the project.
///
/// # Errors
/// Fails like [`publish_configuration`], or when the package is unknown or
/// its directory cannot be listed.
pub async fn publish_package(
    transfer: &dyn Transfer,
    paths: &AppPaths,
    project: &mut UpdateProject,
    version: &UpdateVersion,
) -> Result<(), PublishError> {
    if project.entry(version).is_none() {
        return Err(PublishError::PackageNotFound {
            version: version.to_string(),
        });
    }

    let directory = paths.package_dir(&project.name, &version.to_string());
    let files = package_files(&directory)?;
    let remote_names: Vec<String> = files
        .iter()
        .filter_map(|path| path.file_name().and_then(|name| name.to_str()))
        .map(|name| format!("{version}/{name}"))
        .collect();
    let uploads: Vec<(&std::path::Path, &str)> = files
        .iter()
        .map(PathBuf::as_path)
        .zip(remote_names.iter().map(String::as_str))
        .collect();

    log::info!(
        "Publishing package {version} of {} ({} file(s)) via {}",
        project.name,
        uploads.len(),
        transfer.name()
    );
    transfer
        .upload_files(&uploads)
        .await
        .map_err(PublishError::Upload)?;
    transfer
        .upload_file(
            &paths.package_config_file(&project.name),
            CONFIGURATION_REMOTE_NAME,
        )
        .await
        .map_err(PublishError::Upload)?;

    if let Some(entry) = project.entry_mut(version) {
        entry.is_released = true;
    }
    project.save(paths).map_err(PublishError::ProjectSave)
}

fn package_files(directory: &std::path::Path) -> Result<Vec<PathBuf>, PublishError> {
    let entries = match std::fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(PublishError::ReadPackageDirectory {
                path: directory.to_path_buf(),
                source,
            });
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}
