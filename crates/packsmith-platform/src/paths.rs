use std::path::{Path, PathBuf};
use thiserror::Error;

/// Overrides the root of all application data when set.
pub const DATA_DIR_ENV: &str = "PACKSMITH_DATA_DIR";

const PACKAGE_CONFIG_FILE: &str = "updates.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AppPathsError {
    #[error("Could not determine home directory")]
    HomeDirUnavailable,
    #[error("Could not determine config directory")]
    ConfigDirUnavailable,
    #[error("Could not determine data directory")]
    DataDirUnavailable,
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl AppPaths {
    /// Build application paths for the current platform.
    ///
    /// # Errors
    /// Returns an error when a required base directory (for example the user
    /// home/config/data directory) cannot be determined.
    pub fn new() -> Result<Self, AppPathsError> {
        #[cfg(target_os = "macos")]
        {
            let home = dirs::home_dir().ok_or(AppPathsError::HomeDirUnavailable)?;
            Ok(Self {
                config_dir: home.join("Library/Application Support/packsmith"),
                data_dir: home.join("Library/Application Support/packsmith"),
            })
        }

        #[cfg(not(target_os = "macos"))]
        {
            Ok(Self {
                config_dir: dirs::config_dir()
                    .ok_or(AppPathsError::ConfigDirUnavailable)?
                    .join("packsmith"),
                data_dir: dirs::data_dir()
                    .ok_or(AppPathsError::DataDirUnavailable)?
                    .join("packsmith"),
            })
        }
    }

    /// Keeps configuration and data below a single directory.
    #[must_use]
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
        }
    }

    /// Uses `root` when given, then [`DATA_DIR_ENV`], then the platform
    /// defaults.
    ///
    /// # Errors
    /// Returns an error when falling back to platform directories fails.
    pub fn resolve(root: Option<&Path>) -> Result<Self, AppPathsError> {
        if let Some(root) = root {
            return Ok(Self::with_root(root));
        }
        match std::env::var_os(DATA_DIR_ENV) {
            Some(root) if !root.is_empty() => Ok(Self::with_root(PathBuf::from(root))),
            _ => Self::new(),
        }
    }

    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("debug.log")
    }

    #[must_use]
    pub fn projects_dir(&self) -> PathBuf {
        self.data_dir.join("projects")
    }

    #[must_use]
    pub fn project_file(&self, project: &str) -> PathBuf {
        self.projects_dir().join(format!("{project}.json"))
    }

    #[must_use]
    pub fn project_lock_file(&self, project: &str) -> PathBuf {
        self.projects_dir().join(format!("{project}.lock"))
    }

    #[must_use]
    pub fn project_dir(&self, project: &str) -> PathBuf {
        self.projects_dir().join(project)
    }

    #[must_use]
    pub fn package_config_file(&self, project: &str) -> PathBuf {
        self.project_dir(project).join(PACKAGE_CONFIG_FILE)
    }

    #[must_use]
    pub fn package_dir(&self, project: &str, literal_version: &str) -> PathBuf {
        self.project_dir(project).join(literal_version)
    }

    /// Ensure all application directories exist on disk.
    ///
    /// # Errors
    /// Returns an error if any directory cannot be created.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(self.projects_dir())?;
        Ok(())
    }
}
