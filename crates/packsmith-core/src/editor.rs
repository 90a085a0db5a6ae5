use std::path::PathBuf;

use packsmith_model::{
    Architecture, Changelog, Locale, Operation, OperationKind, OperationList,
    PackageConfiguration, PackageSet, RequirementList, UnsupportedVersions, UpdateRequirement,
    UpdateVersion, ValidationError,
};
use packsmith_platform::AppPaths;
use thiserror::Error;

use crate::project::{PackageEntry, ProjectError, UpdateProject};
use crate::store::{PackageStore, StoreError};

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("The project does not contain any package configuration")]
    EmptyConfiguration,

    #[error("Package \"{version}\" was not found in the configuration")]
    PackageNotFound { version: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No {what} at position {}", .index + 1)]
    IndexOutOfRange { what: &'static str, index: usize },

    #[error("Package directory {} already exists", .path.display())]
    DirectoryExists { path: PathBuf },

    #[error("Error while changing the version of the package directory: {source}")]
    MoveDirectory {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Error while saving the new configuration: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Project(#[from] ProjectError),
}

/// Result of a successful [`PackageEditor::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub old_version: UpdateVersion,
    pub new_version: UpdateVersion,
    pub renamed: bool,
    /// The package was already released, so the configuration must be
    /// published again.
    pub needs_publish: bool,
}

/// Editable copy of one package configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageDraft {
    version: UpdateVersion,
    changelog: Changelog,
    necessary_update: bool,
    use_statistics: bool,
    architecture: Architecture,
    unsupported: UnsupportedVersions,
    some_versions_unsupported: bool,
    operations: OperationList,
    requirements: RequirementList,
    description: Option<String>,
    signature: Option<String>,
}

impl PackageDraft {
    fn from_configuration(
        config: &PackageConfiguration,
        version: UpdateVersion,
    ) -> Result<Self, ValidationError> {
        let unsupported = config.unsupported()?;
        Ok(Self {
            version,
            changelog: config.changelog.clone(),
            necessary_update: config.necessary_update,
            use_statistics: config.use_statistics,
            architecture: config.architecture,
            some_versions_unsupported: !unsupported.is_empty(),
            unsupported,
            operations: config.operations.clone(),
            requirements: config.update_requirements.clone(),
            description: None,
            signature: config.signature.clone(),
        })
    }

    #[must_use]
    pub fn version(&self) -> UpdateVersion {
        self.version
    }

    pub fn set_version(&mut self, version: UpdateVersion) {
        self.version = version;
    }

    #[must_use]
    pub fn changelog(&self) -> &Changelog {
        &self.changelog
    }

    /// Returns `false` when an empty translation was dropped instead.
    pub fn set_changelog(&mut self, locale: Locale, text: impl Into<String>) -> bool {
        self.changelog.set(locale, text)
    }

    pub fn remove_changelog(&mut self, locale: &Locale) -> bool {
        self.changelog.remove(locale)
    }

    #[must_use]
    pub fn necessary_update(&self) -> bool {
        self.necessary_update
    }

    pub fn set_necessary_update(&mut self, necessary: bool) {
        self.necessary_update = necessary;
    }

    #[must_use]
    pub fn use_statistics(&self) -> bool {
        self.use_statistics
    }

    /// Only takes effect when the project has statistics enabled.
    pub fn set_use_statistics(&mut self, enabled: bool) {
        self.use_statistics = enabled;
    }

    #[must_use]
    pub fn architecture(&self) -> Architecture {
        self.architecture
    }

    pub fn set_architecture(&mut self, architecture: Architecture) {
        self.architecture = architecture;
    }

    #[must_use]
    pub fn unsupported_versions(&self) -> &UnsupportedVersions {
        &self.unsupported
    }

    #[must_use]
    pub fn all_versions_supported(&self) -> bool {
        !self.some_versions_unsupported
    }

    /// Adds a client version the package must not be offered to and switches
    /// to "some versions unsupported".
    ///
    /// # Errors
    /// Returns [`ValidationError::ZeroVersion`] for `0.0.0.0`.
    pub fn add_unsupported_version(
        &mut self,
        version: UpdateVersion,
    ) -> Result<bool, ValidationError> {
        let added = self.unsupported.add(version)?;
        self.some_versions_unsupported = true;
        Ok(added)
    }

    pub fn remove_unsupported_version(&mut self, index: usize) -> Option<UpdateVersion> {
        self.unsupported.remove(index)
    }

    /// The list is kept so switching back restores it.
    pub fn set_all_versions_supported(&mut self, all_supported: bool) {
        self.some_versions_unsupported = !all_supported;
    }

    #[must_use]
    pub fn operations(&self) -> &OperationList {
        &self.operations
    }

    /// Appends the empty template of `kind` and returns its index.
    pub fn add_operation(&mut self, kind: OperationKind) -> usize {
        self.operations.push(kind.template());
        self.operations.len() - 1
    }

    pub fn push_operation(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    pub fn insert_operation(&mut self, index: usize, operation: Operation) {
        self.operations.insert(index, operation);
    }

    /// # Errors
    /// Returns [`EditorError::IndexOutOfRange`] if there is no such entry.
    pub fn replace_operation(
        &mut self,
        index: usize,
        operation: Operation,
    ) -> Result<Operation, EditorError> {
        self.operations
            .replace(index, operation)
            .ok_or(EditorError::IndexOutOfRange {
                what: "operation",
                index,
            })
    }

    pub fn remove_operation(&mut self, index: usize) -> Option<Operation> {
        self.operations.remove(index)
    }

    pub fn move_operation_up(&mut self, index: usize) -> bool {
        self.operations.move_up(index)
    }

    pub fn move_operation_down(&mut self, index: usize) -> bool {
        self.operations.move_down(index)
    }

    #[must_use]
    pub fn requirements(&self) -> &RequirementList {
        &self.requirements
    }

    pub fn add_requirement(&mut self, requirement: UpdateRequirement) -> bool {
        self.requirements.add(requirement)
    }

    /// # Errors
    /// Returns [`EditorError::IndexOutOfRange`] if there is no such entry.
    pub fn replace_requirement(
        &mut self,
        index: usize,
        requirement: UpdateRequirement,
    ) -> Result<UpdateRequirement, EditorError> {
        self.requirements
            .replace(index, requirement)
            .ok_or(EditorError::IndexOutOfRange {
                what: "requirement",
                index,
            })
    }

    pub fn remove_requirement(&mut self, index: usize) -> Option<UpdateRequirement> {
        self.requirements.remove(index)
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    fn into_configuration(mut self, project: &UpdateProject) -> PackageConfiguration {
        self.changelog.prune_empty();
        let unsupported_versions = if self.some_versions_unsupported {
            self.unsupported.into_option()
        } else {
            None
        };

        PackageConfiguration {
            literal_version: self.version.to_string(),
            changelog: self.changelog,
            necessary_update: self.necessary_update,
            use_statistics: self.use_statistics && project.use_statistics,
            architecture: self.architecture,
            unsupported_versions,
            operations: self.operations,
            update_requirements: self.requirements,
            update_package_uri: Some(project.package_archive_uri(&self.version)),
            signature: self.signature,
        }
    }
}

/// Load, edit, validate and save one package of a [`PackageSet`].
#[derive(Debug, Clone)]
pub struct PackageEditor {
    original_version: UpdateVersion,
    draft: PackageDraft,
}

impl PackageEditor {
    /// # Errors
    /// Returns [`EditorError::EmptyConfiguration`] for an empty set,
    /// [`EditorError::PackageNotFound`] when `version` is missing, or a
    /// validation error if the stored entry cannot be read back.
    pub fn open(set: &PackageSet, version: &UpdateVersion) -> Result<Self, EditorError> {
        if set.is_empty() {
            return Err(EditorError::EmptyConfiguration);
        }
        let config = set.find(version).ok_or_else(|| EditorError::PackageNotFound {
            version: version.to_string(),
        })?;

        Ok(Self {
            original_version: *version,
            draft: PackageDraft::from_configuration(config, *version)?,
        })
    }

    #[must_use]
    pub fn original_version(&self) -> UpdateVersion {
        self.original_version
    }

    #[must_use]
    pub fn draft(&self) -> &PackageDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut PackageDraft {
        &mut self.draft
    }

    /// Runs the checks that gate saving, in order: non-zero version, unique
    /// version, English changelog, valid operations.
    ///
    /// # Errors
    /// Returns the first failed check.
    pub fn validate(&self, set: &PackageSet, project: &UpdateProject) -> Result<(), EditorError> {
        let new_version = self.draft.version;
        if new_version.is_zero() {
            return Err(ValidationError::ZeroVersion.into());
        }
        if new_version != self.original_version
            && (project.entry(&new_version).is_some() || set.contains_version(&new_version))
        {
            return Err(ValidationError::DuplicateVersion {
                version: new_version.description(),
            }
            .into());
        }
        self.draft.changelog.validate()?;
        self.draft.operations.validate()?;
        Ok(())
    }

    /// Validates, writes the draft back into `set` and persists the set.
    ///
    /// A version change moves the local package directory and updates the
    /// project entry. The project file itself is not written; callers save
    /// it directly or through publishing.
    ///
    /// # Errors
    /// Returns a validation error, a directory move failure or a store
    /// failure. On any error `set`, `project` and the package directory are
    /// left as they were.
    pub fn save(
        self,
        set: &mut PackageSet,
        project: &mut UpdateProject,
        paths: &AppPaths,
    ) -> Result<SaveOutcome, EditorError> {
        self.validate(set, project)?;

        let old_version = self.original_version;
        let index = set
            .position(&old_version)
            .ok_or_else(|| EditorError::PackageNotFound {
                version: old_version.to_string(),
            })?;
        let new_version = self.draft.version;
        let description = self.draft.description.clone();
        let config = self.draft.into_configuration(project);
        let renamed = new_version != old_version;

        let mut updated = set.clone();
        updated.replace(index, config);

        let moved = if renamed {
            Some(move_package_directory(
                paths,
                &project.name,
                &old_version,
                &new_version,
            )?)
        } else {
            None
        };

        if let Err(error) = PackageStore::for_project(paths, &project.name).save(&updated) {
            if let Some(moved) = moved {
                moved.undo();
            }
            return Err(error.into());
        }
        *set = updated;

        let needs_publish = match project.entry_mut(&old_version) {
            Some(entry) => {
                entry.version = new_version;
                if let Some(description) = description {
                    entry.description = description;
                }
                entry.is_released
            }
            None => {
                log::warn!(
                    "Project {} has no entry for package {old_version}",
                    project.name
                );
                false
            }
        };

        log::info!(
            "Saved package {new_version} of project {}{}",
            project.name,
            if renamed {
                format!(" (was {old_version})")
            } else {
                String::new()
            }
        );

        Ok(SaveOutcome {
            old_version,
            new_version,
            renamed,
            needs_publish,
        })
    }
}

/// A package directory move that can be reverted while the store write is
/// still pending.
#[derive(Debug)]
enum DirectoryMove {
    Renamed { from: PathBuf, to: PathBuf },
    Created { path: PathBuf },
}

impl DirectoryMove {
    fn undo(self) {
        let result = match &self {
            Self::Renamed { from, to } => std::fs::rename(to, from),
            Self::Created { path } => std::fs::remove_dir(path),
        };
        if let Err(error) = result {
            log::error!("Failed to revert package directory change {self:?}: {error}");
        }
    }
}

fn move_package_directory(
    paths: &AppPaths,
    project: &str,
    old_version: &UpdateVersion,
    new_version: &UpdateVersion,
) -> Result<DirectoryMove, EditorError> {
    let from = paths.package_dir(project, &old_version.to_string());
    let to = paths.package_dir(project, &new_version.to_string());

    if to.exists() {
        return Err(EditorError::DirectoryExists { path: to });
    }
    if !from.exists() {
        log::warn!(
            "Package directory {} is missing, creating {}",
            from.display(),
            to.display()
        );
        return match std::fs::create_dir_all(&to) {
            Ok(()) => Ok(DirectoryMove::Created { path: to }),
            Err(source) => Err(EditorError::MoveDirectory { from, to, source }),
        };
    }

    match std::fs::rename(&from, &to) {
        Ok(()) => Ok(DirectoryMove::Renamed { from, to }),
        Err(source) => Err(EditorError::MoveDirectory { from, to, source }),
    }
}

/// Adds a new, unreleased package to the project and its package set, and
/// creates its local directory. Neither file is written.
///
/// # Errors
/// Returns a validation error for a zero or duplicate version or a blank
/// English changelog, or an IO error if the directory cannot be created.
pub fn create_package(
    set: &mut PackageSet,
    project: &mut UpdateProject,
    paths: &AppPaths,
    version: UpdateVersion,
    english_changelog: &str,
    description: &str,
) -> Result<(), EditorError> {
    if version.is_zero() {
        return Err(ValidationError::ZeroVersion.into());
    }
    if project.entry(&version).is_some() || set.contains_version(&version) {
        return Err(ValidationError::DuplicateVersion {
            version: version.description(),
        }
        .into());
    }

    let changelog = Changelog::new(english_changelog);
    changelog.validate()?;

    let mut config = PackageConfiguration::new(version, changelog);
    config.update_package_uri = Some(project.package_archive_uri(&version));

    std::fs::create_dir_all(paths.package_dir(&project.name, &version.to_string())).map_err(
        |source| EditorError::Io {
            context: "Failed to create package directory",
            source,
        },
    )?;

    project.add_package(PackageEntry::new(version, description))?;
    set.push(config);
    log::info!("Created package {version} in project {}", project.name);
    Ok(())
}

/// Removes a package from the set and the project and deletes its local
/// directory.
///
/// # Errors
/// Returns [`EditorError::PackageNotFound`] when the set has no such
/// package, or an IO error if the directory cannot be removed.
pub fn delete_package(
    set: &mut PackageSet,
    project: &mut UpdateProject,
    paths: &AppPaths,
    version: &UpdateVersion,
) -> Result<PackageConfiguration, EditorError> {
    let removed = set
        .remove(version)
        .ok_or_else(|| EditorError::PackageNotFound {
            version: version.to_string(),
        })?;
    project.remove_package(version);

    let directory = paths.package_dir(&project.name, &version.to_string());
    match std::fs::remove_dir_all(&directory) {
        Ok(()) => {}
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(EditorError::Io {
                context: "Failed to delete package directory",
                source,
            });
        }
    }

    log::info!("Deleted package {version} from project {}", project.name);
    Ok(removed)
}
