use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::{framework_label, os_name_for_version, os_version_by_name};
use crate::version::RequirementVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequirementKind {
    #[serde(rename = "OSVersion")]
    OsVersion,
    DotNetFramework,
}

impl fmt::Display for RequirementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OsVersion => write!(f, "Operating system"),
            Self::DotNetFramework => write!(f, ".NET Framework"),
        }
    }
}

/// A precondition the installer checks before applying a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateRequirement {
    #[serde(rename = "Type")]
    pub kind: RequirementKind,
    pub version: RequirementVersion,
}

impl UpdateRequirement {
    #[must_use]
    pub fn os(version: RequirementVersion) -> Self {
        Self {
            kind: RequirementKind::OsVersion,
            version,
        }
    }

    #[must_use]
    pub fn framework(version: RequirementVersion) -> Self {
        Self {
            kind: RequirementKind::DotNetFramework,
            version,
        }
    }

    /// Builds an OS requirement from a catalog name such as `Windows 7`.
    #[must_use]
    pub fn from_os_name(name: &str) -> Option<Self> {
        os_version_by_name(name).map(Self::os)
    }
}

impl fmt::Display for UpdateRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            RequirementKind::OsVersion => match os_name_for_version(&self.version) {
                Some(name) => write!(f, "{name} or higher"),
                None => write!(
                    f,
                    "OS version {} or higher",
                    self.version.to_string_components(2)
                ),
            },
            RequirementKind::DotNetFramework => {
                write!(f, "{} or higher", framework_label(&self.version))
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequirementList(Vec<UpdateRequirement>);

impl RequirementList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `requirement` unless an identical one is already listed.
    pub fn add(&mut self, requirement: UpdateRequirement) -> bool {
        if self.0.contains(&requirement) {
            return false;
        }
        self.0.push(requirement);
        true
    }

    pub fn replace(
        &mut self,
        index: usize,
        requirement: UpdateRequirement,
    ) -> Option<UpdateRequirement> {
        self.0
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, requirement))
    }

    pub fn remove(&mut self, index: usize) -> Option<UpdateRequirement> {
        (index < self.0.len()).then(|| self.0.remove(index))
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&UpdateRequirement> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UpdateRequirement> {
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

    fn highest(&self, kind: RequirementKind) -> Option<RequirementVersion> {
        self.0
            .iter()
            .filter(|req| req.kind == kind)
            .map(|req| req.version)
            .max()
    }

    #[must_use]
    pub fn minimum_os(&self) -> Option<RequirementVersion> {
        self.highest(RequirementKind::OsVersion)
    }

    #[must_use]
    pub fn minimum_framework(&self) -> Option<RequirementVersion> {
        self.highest(RequirementKind::DotNetFramework)
    }
}

impl From<Vec<UpdateRequirement>> for RequirementList {
    fn from(requirements: Vec<UpdateRequirement>) -> Self {
        Self(requirements)
    }
}

impl<'a> IntoIterator for &'a RequirementList {
    type Item = &'a UpdateRequirement;
    type IntoIter = std::slice::Iter<'a, UpdateRequirement>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
