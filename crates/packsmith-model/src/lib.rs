//! Data model of an update package: versions, the operation catalog,
//! requirements, changelogs and the persisted package configuration.
//!
//! Nothing in this crate touches the filesystem or network; persistence
//! lives in `packsmith-core` and transport in `packsmith-transfer`.

pub mod catalog;
mod changelog;
mod error;
mod operation;
mod package;
mod requirement;
mod traits;
mod validation;
mod version;

pub use catalog::{OperationArea, OperationKind, OperationMethod};
pub use changelog::{Changelog, Locale, LocaleError};
pub use error::{NetworkStage, TransferError};
pub use operation::{
    Operation, OperationError, OperationList, OperationParseError, PATH_VARIABLES, REGISTRY_HIVES,
    RegistryValue, RegistryValueKind,
};
pub use package::{Architecture, PackageConfiguration, PackageSet, UnsupportedVersions};
pub use requirement::{RequirementKind, RequirementList, UpdateRequirement};
pub use traits::{Transfer, check_remote_name};
pub use validation::ValidationError;
pub use version::{
    DevelopmentalStage, RequirementVersion, UpdateVersion, VersionComponent, VersionParseError,
};
