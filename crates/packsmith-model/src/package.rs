use serde::{Deserialize, Serialize};
use std::fmt;

use crate::changelog::Changelog;
use crate::operation::OperationList;
use crate::requirement::RequirementList;
use crate::validation::ValidationError;
use crate::version::{UpdateVersion, VersionParseError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Architecture {
    X86,
    X64,
    #[default]
    AnyCpu,
}

impl Architecture {
    pub const ALL: [Self; 3] = [Self::X86, Self::X64, Self::AnyCpu];

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|arch| {
            arch.to_string().eq_ignore_ascii_case(name)
                || (*arch == Self::AnyCpu && name.eq_ignore_ascii_case("any"))
        })
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X86 => write!(f, "x86"),
            Self::X64 => write!(f, "x64"),
            Self::AnyCpu => write!(f, "AnyCPU"),
        }
    }
}

/// Persisted description of one release, as stored in `updates.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PackageConfiguration {
    pub literal_version: String,
    #[serde(default)]
    pub changelog: Changelog,
    #[serde(default)]
    pub necessary_update: bool,
    #[serde(default)]
    pub use_statistics: bool,
    #[serde(default)]
    pub architecture: Architecture,
    #[serde(default)]
    pub unsupported_versions: Option<Vec<String>>,
    #[serde(default)]
    pub operations: OperationList,
    #[serde(default)]
    pub update_requirements: RequirementList,
    #[serde(default)]
    pub update_package_uri: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
}

impl PackageConfiguration {
    #[must_use]
    pub fn new(version: UpdateVersion, changelog: Changelog) -> Self {
        Self {
            literal_version: version.to_string(),
            changelog,
            necessary_update: false,
            use_statistics: false,
            architecture: Architecture::default(),
            unsupported_versions: None,
            operations: OperationList::new(),
            update_requirements: RequirementList::new(),
            update_package_uri: None,
            signature: None,
        }
    }

    /// # Errors
    /// Returns an error if the stored literal is not a valid version.
    pub fn version(&self) -> Result<UpdateVersion, VersionParseError> {
        self.literal_version.parse()
    }

    /// # Errors
    /// Returns an error if any stored unsupported version is malformed.
    pub fn unsupported(&self) -> Result<UnsupportedVersions, ValidationError> {
        UnsupportedVersions::from_literals(self.unsupported_versions.as_deref().unwrap_or_default())
    }

    /// Whether a client running `client` may install this package.
    #[must_use]
    pub fn supports_client(&self, client: &UpdateVersion) -> bool {
        self.unsupported_versions
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|literal| literal.parse::<UpdateVersion>().ok())
            .all(|unsupported| unsupported != *client)
    }

    /// Checks version, English changelog, unsupported versions and
    /// operations, in that order.
    ///
    /// # Errors
    /// Returns the first failed check.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.version()?.is_zero() {
            return Err(ValidationError::ZeroVersion);
        }
        self.changelog.validate()?;
        self.unsupported()?;
        self.operations.validate()
    }
}

/// Editable list of client versions a package must not be offered to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnsupportedVersions(Vec<UpdateVersion>);

impl UnsupportedVersions {
    /// # Errors
    /// Returns [`ValidationError::InvalidUnsupportedVersion`] for the first
    /// literal that does not parse or is `0.0.0.0`.
    pub fn from_literals(literals: &[String]) -> Result<Self, ValidationError> {
        literals
            .iter()
            .map(|literal| match literal.parse::<UpdateVersion>() {
                Ok(version) if !version.is_zero() => Ok(version),
                _ => Err(ValidationError::InvalidUnsupportedVersion {
                    literal: literal.clone(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// # Errors
    /// Returns [`ValidationError::ZeroVersion`] for `0.0.0.0`.
    pub fn add(&mut self, version: UpdateVersion) -> Result<bool, ValidationError> {
        if version.is_zero() {
            return Err(ValidationError::ZeroVersion);
        }
        if self.0.contains(&version) {
            return Ok(false);
        }
        self.0.push(version);
        Ok(true)
    }

    pub fn remove(&mut self, index: usize) -> Option<UpdateVersion> {
        (index < self.0.len()).then(|| self.0.remove(index))
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UpdateVersion> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The stored form: `None` when every version is supported.
    #[must_use]
    pub fn into_option(self) -> Option<Vec<String>> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.0.iter().map(ToString::to_string).collect())
        }
    }
}

/// Every package configuration of a project, the content of `updates.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageSet(Vec<PackageConfiguration>);

impl PackageSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn position(&self, version: &UpdateVersion) -> Option<usize> {
        self.0
            .iter()
            .position(|config| config.version().is_ok_and(|v| v == *version))
    }

    #[must_use]
    pub fn find(&self, version: &UpdateVersion) -> Option<&PackageConfiguration> {
        self.position(version).map(|index| &self.0[index])
    }

    #[must_use]
    pub fn contains_version(&self, version: &UpdateVersion) -> bool {
        self.position(version).is_some()
    }

    pub fn push(&mut self, config: PackageConfiguration) {
        self.0.push(config);
    }

    pub fn replace(
        &mut self,
        index: usize,
        config: PackageConfiguration,
    ) -> Option<PackageConfiguration> {
        self.0
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, config))
    }

    pub fn remove(&mut self, version: &UpdateVersion) -> Option<PackageConfiguration> {
        self.position(version).map(|index| self.0.remove(index))
    }

    /// Parsable versions in ascending order.
    #[must_use]
    pub fn versions(&self) -> Vec<UpdateVersion> {
        let mut versions: Vec<_> = self
            .0
            .iter()
            .filter_map(|config| config.version().ok())
            .collect();
        versions.sort();
        versions
    }

    #[must_use]
    pub fn latest(&self) -> Option<UpdateVersion> {
        self.versions().pop()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PackageConfiguration> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<PackageConfiguration>> for PackageSet {
    fn from(configs: Vec<PackageConfiguration>) -> Self {
        Self(configs)
    }
}
