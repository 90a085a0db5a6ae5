use std::path::PathBuf;

use chrono::{DateTime, Utc};
use packsmith_model::UpdateVersion;
use packsmith_platform::{AppPaths, write_atomic};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

const RESERVED_NAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("\"{name}\" is not a valid project name")]
    InvalidName { name: String },

    #[error("A project named \"{name}\" already exists")]
    AlreadyExists { name: String },

    #[error("Project \"{name}\" does not exist")]
    NotFound { name: String },

    #[error("\"{uri}\" is not a valid update directory URI")]
    InvalidUri { uri: String },

    #[error("Package \"{version}\" is already part of the project")]
    DuplicatePackage { version: String },

    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Project file {} is malformed: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize project: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl ProjectError {
    fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }
}

/// Where published files of a project end up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransferSettings {
    Local {
        root: PathBuf,
    },
    Http {
        base_url: String,
        #[serde(default)]
        username: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageEntry {
    pub version: UpdateVersion,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_released: bool,
    pub created_at: DateTime<Utc>,
}

impl PackageEntry {
    #[must_use]
    pub fn new(version: UpdateVersion, description: impl Into<String>) -> Self {
        Self {
            version,
            description: description.into(),
            is_released: false,
            created_at: Utc::now(),
        }
    }
}

/// Project metadata kept at `projects/<name>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProject {
    pub name: String,
    pub guid: String,
    pub update_directory_uri: String,
    #[serde(default)]
    pub use_statistics: bool,
    pub transfer: TransferSettings,
    #[serde(default)]
    pub packages: Vec<PackageEntry>,
}

/// Project names double as file and directory names.
///
/// # Errors
/// Returns [`ProjectError::InvalidName`] for blank names, names with
/// surrounding whitespace, reserved characters or a leading dot.
pub fn validate_project_name(name: &str) -> Result<(), ProjectError> {
    let invalid = name.trim().is_empty()
        || name.trim() != name
        || name.starts_with('.')
        || name.contains(RESERVED_NAME_CHARS)
        || name.chars().any(char::is_control);
    if invalid {
        Err(ProjectError::InvalidName {
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

fn validate_directory_uri(uri: &str) -> Result<(), ProjectError> {
    let valid = uri
        .split_once("://")
        .is_some_and(|(scheme, rest)| {
            !scheme.is_empty()
                && scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+')
                && !rest.trim().is_empty()
        })
        && !uri.chars().any(char::is_whitespace);
    if valid {
        Ok(())
    } else {
        Err(ProjectError::InvalidUri {
            uri: uri.to_string(),
        })
    }
}

fn generate_guid(name: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(nanos.to_le_bytes());
    hasher.update(std::process::id().to_le_bytes());
    let hex = format!("{:x}", hasher.finalize());
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

impl UpdateProject {
    /// Creates and persists a new project with an empty package list.
    ///
    /// # Errors
    /// Fails when the name or URI is invalid, the project already exists, or
    /// the project file cannot be written.
    pub fn create(
        paths: &AppPaths,
        name: &str,
        update_directory_uri: &str,
        transfer: TransferSettings,
        use_statistics: bool,
    ) -> Result<Self, ProjectError> {
        validate_project_name(name)?;
        validate_directory_uri(update_directory_uri)?;

        if paths.project_file(name).exists() {
            return Err(ProjectError::AlreadyExists {
                name: name.to_string(),
            });
        }

        let project = Self {
            name: name.to_string(),
            guid: generate_guid(name),
            update_directory_uri: update_directory_uri.trim_end_matches('/').to_string(),
            use_statistics,
            transfer,
            packages: Vec::new(),
        };

        std::fs::create_dir_all(paths.project_dir(name))
            .map_err(|error| ProjectError::io("Failed to create project directory", error))?;
        project.save(paths)?;
        log::info!("Created project {name} ({})", project.guid);
        Ok(project)
    }

    /// # Errors
    /// Returns [`ProjectError::NotFound`] when no project file exists, or a
    /// parse error when it is malformed.
    pub fn load(paths: &AppPaths, name: &str) -> Result<Self, ProjectError> {
        validate_project_name(name)?;
        let path = paths.project_file(name);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProjectError::NotFound {
                    name: name.to_string(),
                });
            }
            Err(error) => return Err(ProjectError::io("Failed to read project file", error)),
        };
        serde_json::from_str(&content).map_err(|source| ProjectError::Parse { path, source })
    }

    /// Names of all projects below [`AppPaths::projects_dir`], sorted.
    ///
    /// # Errors
    /// Returns an error if the projects directory exists but cannot be read.
    pub fn list(paths: &AppPaths) -> Result<Vec<String>, ProjectError> {
        let entries = match std::fs::read_dir(paths.projects_dir()) {
            Ok(entries) => entries,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => {
                return Err(ProjectError::io("Failed to read projects directory", error));
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().is_some_and(|extension| extension == "json")
            })
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_string)
            })
            .collect();
        names.sort();
        Ok(names)
    }

    /// # Errors
    /// Returns an error if serialization or the atomic write fails.
    pub fn save(&self, paths: &AppPaths) -> Result<(), ProjectError> {
        let content = serde_json::to_vec_pretty(self).map_err(ProjectError::Serialize)?;
        write_atomic(&paths.project_file(&self.name), &content)
            .map_err(|error| ProjectError::io("Failed to write project file", error))
    }

    #[must_use]
    pub fn entry(&self, version: &UpdateVersion) -> Option<&PackageEntry> {
        self.packages.iter().find(|entry| entry.version == *version)
    }

    pub fn entry_mut(&mut self, version: &UpdateVersion) -> Option<&mut PackageEntry> {
        self.packages.iter_mut().find(|entry| entry.version == *version)
    }

    /// # Errors
    /// Returns [`ProjectError::DuplicatePackage`] if the version is taken.
    pub fn add_package(&mut self, entry: PackageEntry) -> Result<(), ProjectError> {
        if self.entry(&entry.version).is_some() {
            return Err(ProjectError::DuplicatePackage {
                version: entry.version.to_string(),
            });
        }
        self.packages.push(entry);
        Ok(())
    }

    pub fn remove_package(&mut self, version: &UpdateVersion) -> Option<PackageEntry> {
        let index = self
            .packages
            .iter()
            .position(|entry| entry.version == *version)?;
        Some(self.packages.remove(index))
    }

    /// `<update_directory_uri>/<version>/<guid>.zip`
    #[must_use]
    pub fn package_archive_uri(&self, version: &UpdateVersion) -> String {
        format!(
            "{}/{version}/{}.zip",
            self.update_directory_uri.trim_end_matches('/'),
            self.guid
        )
    }
}
