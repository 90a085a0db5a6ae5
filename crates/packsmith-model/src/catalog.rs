//! Static catalogs: the supported operation kinds and the requirement
//! thresholds offered when authoring a package.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::operation::Operation;
use crate::version::RequirementVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationArea {
    Files,
    Registry,
    Processes,
    Services,
    Scripts,
}

impl fmt::Display for OperationArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Files => write!(f, "Files"),
            Self::Registry => write!(f, "Registry"),
            Self::Processes => write!(f, "Processes"),
            Self::Services => write!(f, "Services"),
            Self::Scripts => write!(f, "Scripts"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationMethod {
    Create,
    Delete,
    Rename,
    SetValue,
    DeleteValue,
    Start,
    Stop,
    Execute,
}

impl fmt::Display for OperationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "Create"),
            Self::Delete => write!(f, "Delete"),
            Self::Rename => write!(f, "Rename"),
            Self::SetValue => write!(f, "SetValue"),
            Self::DeleteValue => write!(f, "DeleteValue"),
            Self::Start => write!(f, "Start"),
            Self::Stop => write!(f, "Stop"),
            Self::Execute => write!(f, "Execute"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    DeleteFile,
    RenameFile,
    CreateRegistrySubKey,
    DeleteRegistrySubKey,
    SetRegistryValue,
    DeleteRegistryValue,
    StartProcess,
    TerminateProcess,
    StartService,
    StopService,
    ExecuteScript,
}

impl OperationKind {
    pub const ALL: [Self; 11] = [
        Self::DeleteFile,
        Self::RenameFile,
        Self::CreateRegistrySubKey,
        Self::DeleteRegistrySubKey,
        Self::SetRegistryValue,
        Self::DeleteRegistryValue,
        Self::StartProcess,
        Self::TerminateProcess,
        Self::StartService,
        Self::StopService,
        Self::ExecuteScript,
    ];

    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::DeleteFile => "DeleteFile",
            Self::RenameFile => "RenameFile",
            Self::CreateRegistrySubKey => "CreateRegistrySubKey",
            Self::DeleteRegistrySubKey => "DeleteRegistrySubKey",
            Self::SetRegistryValue => "SetRegistryValue",
            Self::DeleteRegistryValue => "DeleteRegistryValue",
            Self::StartProcess => "StartProcess",
            Self::TerminateProcess => "TerminateProcess",
            Self::StartService => "StartService",
            Self::StopService => "StopService",
            Self::ExecuteScript => "ExecuteScript",
        }
    }

    /// Resolves a tag case-insensitively. `StopProcess` is an older spelling
    /// of `TerminateProcess` still found in some stored projects.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        if tag.eq_ignore_ascii_case("StopProcess") {
            return Some(Self::TerminateProcess);
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag().eq_ignore_ascii_case(tag))
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::DeleteFile => "Delete file",
            Self::RenameFile => "Rename file",
            Self::CreateRegistrySubKey => "Create registry subkey",
            Self::DeleteRegistrySubKey => "Delete registry subkey",
            Self::SetRegistryValue => "Set registry value",
            Self::DeleteRegistryValue => "Delete registry value",
            Self::StartProcess => "Start process",
            Self::TerminateProcess => "Terminate process",
            Self::StartService => "Start service",
            Self::StopService => "Stop service",
            Self::ExecuteScript => "Execute script",
        }
    }

    #[must_use]
    pub fn area_method(self) -> (OperationArea, OperationMethod) {
        use OperationArea as A;
        use OperationMethod as M;

        match self {
            Self::DeleteFile => (A::Files, M::Delete),
            Self::RenameFile => (A::Files, M::Rename),
            Self::CreateRegistrySubKey => (A::Registry, M::Create),
            Self::DeleteRegistrySubKey => (A::Registry, M::Delete),
            Self::SetRegistryValue => (A::Registry, M::SetValue),
            Self::DeleteRegistryValue => (A::Registry, M::DeleteValue),
            Self::StartProcess => (A::Processes, M::Start),
            Self::TerminateProcess => (A::Processes, M::Stop),
            Self::StartService => (A::Services, M::Start),
            Self::StopService => (A::Services, M::Stop),
            Self::ExecuteScript => (A::Scripts, M::Execute),
        }
    }

    #[must_use]
    pub fn from_area_method(area: OperationArea, method: OperationMethod) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.area_method() == (area, method))
    }

    #[must_use]
    pub fn area(self) -> OperationArea {
        self.area_method().0
    }

    /// An operation of this kind with every payload field empty.
    #[must_use]
    pub fn template(self) -> Operation {
        match self {
            Self::DeleteFile => Operation::DeleteFile {
                directory: String::new(),
                files: Vec::new(),
            },
            Self::RenameFile => Operation::RenameFile {
                path: String::new(),
                new_name: String::new(),
            },
            Self::CreateRegistrySubKey => Operation::CreateRegistrySubKey {
                key_path: String::new(),
                sub_keys: Vec::new(),
            },
            Self::DeleteRegistrySubKey => Operation::DeleteRegistrySubKey {
                key_path: String::new(),
                sub_keys: Vec::new(),
            },
            Self::SetRegistryValue => Operation::SetRegistryValue {
                key_path: String::new(),
                values: Vec::new(),
            },
            Self::DeleteRegistryValue => Operation::DeleteRegistryValue {
                key_path: String::new(),
                value_names: Vec::new(),
            },
            Self::StartProcess => Operation::StartProcess {
                path: String::new(),
                arguments: Vec::new(),
            },
            Self::TerminateProcess => Operation::TerminateProcess {
                process_name: String::new(),
            },
            Self::StartService => Operation::StartService {
                service_name: String::new(),
            },
            Self::StopService => Operation::StopService {
                service_name: String::new(),
            },
            Self::ExecuteScript => Operation::ExecuteScript {
                code: String::new(),
            },
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

pub const OS_VERSIONS: [(&str, RequirementVersion); 8] = [
    ("Windows Vista", RequirementVersion::new(6, 0, 6000, 0)),
    (
        "Windows Vista Service Pack 1",
        RequirementVersion::new(6, 0, 6001, 0),
    ),
    (
        "Windows Vista Service Pack 2",
        RequirementVersion::new(6, 0, 6002, 0),
    ),
    ("Windows 7", RequirementVersion::new(6, 1, 7600, 0)),
    (
        "Windows 7 Service Pack 1",
        RequirementVersion::new(6, 1, 7601, 0),
    ),
    ("Windows 8", RequirementVersion::new(6, 2, 9200, 0)),
    ("Windows 8.1", RequirementVersion::new(6, 3, 9600, 0)),
    ("Windows 10", RequirementVersion::new(10, 0, 10240, 0)),
];

pub const FRAMEWORK_VERSIONS: [RequirementVersion; 11] = [
    RequirementVersion::short(4, 0, 0),
    RequirementVersion::short(4, 5, 0),
    RequirementVersion::short(4, 5, 1),
    RequirementVersion::short(4, 5, 2),
    RequirementVersion::short(4, 6, 0),
    RequirementVersion::short(4, 6, 1),
    RequirementVersion::short(4, 6, 2),
    RequirementVersion::short(4, 7, 0),
    RequirementVersion::short(4, 7, 1),
    RequirementVersion::short(4, 7, 2),
    RequirementVersion::short(4, 8, 0),
];

const FRAMEWORK_LABEL_PREFIX: &str = ".NET Framework ";

#[must_use]
pub fn os_version_by_name(name: &str) -> Option<RequirementVersion> {
    OS_VERSIONS
        .iter()
        .find(|(label, _)| label.eq_ignore_ascii_case(name.trim()))
        .map(|(_, version)| *version)
}

#[must_use]
pub fn os_name_for_version(version: &RequirementVersion) -> Option<&'static str> {
    OS_VERSIONS
        .iter()
        .find(|(_, known)| known == version)
        .map(|(label, _)| *label)
}

#[must_use]
pub fn framework_label(version: &RequirementVersion) -> String {
    format!("{FRAMEWORK_LABEL_PREFIX}{}", version.to_string_components(3))
}

/// Accepts either a full label (`.NET Framework 4.7.2`) or a bare version.
#[must_use]
pub fn parse_framework_label(label: &str) -> Option<RequirementVersion> {
    let label = label.trim();
    let raw = label.strip_prefix(FRAMEWORK_LABEL_PREFIX).unwrap_or(label);
    raw.parse().ok()
}
