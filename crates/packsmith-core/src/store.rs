use std::path::{Path, PathBuf};

use packsmith_model::PackageSet;
use packsmith_platform::{AppPaths, write_atomic};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{context} {}: {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Package configuration {} is malformed: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize package configuration: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Reads and writes the `updates.json` of one project.
#[derive(Debug, Clone)]
pub struct PackageStore {
    path: PathBuf,
}

impl PackageStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn for_project(paths: &AppPaths, project: &str) -> Self {
        Self::new(paths.package_config_file(project))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty set.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<PackageSet, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(PackageSet::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    context: "Failed to read",
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(PackageSet::new());
        }

        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// # Errors
    /// Returns an error if serialization or the atomic write fails.
    pub fn save(&self, set: &PackageSet) -> Result<(), StoreError> {
        let content = serde_json::to_vec_pretty(set).map_err(StoreError::Serialize)?;
        write_atomic(&self.path, &content).map_err(|source| StoreError::Io {
            context: "Failed to write",
            path: self.path.clone(),
            source,
        })?;
        log::debug!(
            "Saved {} package configuration(s) to {}",
            set.len(),
            self.path.display()
        );
        Ok(())
    }
}
