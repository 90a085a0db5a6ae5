use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

use crate::catalog::{OperationArea, OperationKind, OperationMethod};
use crate::validation::ValidationError;

/// Placeholders the installer expands when it replays a file operation.
pub const PATH_VARIABLES: [&str; 6] = [
    "%program%",
    "%appdata%",
    "%localappdata%",
    "%temp%",
    "%desktop%",
    "%documents%",
];

pub const REGISTRY_HIVES: [&str; 9] = [
    "HKEY_CLASSES_ROOT",
    "HKEY_CURRENT_USER",
    "HKEY_LOCAL_MACHINE",
    "HKEY_USERS",
    "HKEY_CURRENT_CONFIG",
    "HKCR",
    "HKCU",
    "HKLM",
    "HKU",
];

/// Windows registry value kinds, stored by their native numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum RegistryValueKind {
    String,
    ExpandString,
    Binary,
    DWord,
    MultiString,
    QWord,
}

impl RegistryValueKind {
    pub const ALL: [Self; 6] = [
        Self::String,
        Self::ExpandString,
        Self::Binary,
        Self::DWord,
        Self::MultiString,
        Self::QWord,
    ];

    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::String => 1,
            Self::ExpandString => 2,
            Self::Binary => 3,
            Self::DWord => 4,
            Self::MultiString => 7,
            Self::QWord => 11,
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.to_string().eq_ignore_ascii_case(name.trim()))
    }

    fn accepts(self, data: &Value) -> bool {
        match self {
            Self::String | Self::ExpandString => data.is_string(),
            Self::DWord => data.as_u64().is_some_and(|v| u32::try_from(v).is_ok()),
            Self::QWord => data.as_u64().is_some(),
            Self::MultiString => data
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            Self::Binary => data.as_array().is_some_and(|items| {
                items
                    .iter()
                    .all(|item| item.as_u64().is_some_and(|byte| byte <= 255))
            }),
        }
    }
}

impl fmt::Display for RegistryValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "String"),
            Self::ExpandString => write!(f, "ExpandString"),
            Self::Binary => write!(f, "Binary"),
            Self::DWord => write!(f, "DWord"),
            Self::MultiString => write!(f, "MultiString"),
            Self::QWord => write!(f, "QWord"),
        }
    }
}

impl TryFrom<i32> for RegistryValueKind {
    type Error = OperationParseError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.code() == code)
            .ok_or(OperationParseError::UnknownRegistryValueKind { code })
    }
}

impl From<RegistryValueKind> for i32 {
    fn from(kind: RegistryValueKind) -> Self {
        kind.code()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryValue {
    #[serde(rename = "Item1")]
    pub name: String,
    #[serde(rename = "Item2")]
    pub data: Value,
    #[serde(rename = "Item3")]
    pub kind: RegistryValueKind,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationParseError {
    #[error("Unknown operation {area}/{method}")]
    UnknownOperation {
        area: OperationArea,
        method: OperationMethod,
    },
    #[error("Secondary value of {kind} operation must be {expected}")]
    InvalidPayload {
        kind: &'static str,
        expected: &'static str,
    },
    #[error("Unknown registry value kind code: {code}")]
    UnknownRegistryValueKind { code: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("Unknown path variable: {variable}")]
    UnknownPathVariable { variable: String },
    #[error("\"{name}\" is not a plain file name")]
    InvalidFileName { name: String },
    #[error("At least one entry is required in {field}")]
    EmptyList { field: &'static str },
    #[error("Entry {} of {field} is empty", .index + 1)]
    EmptyListEntry { field: &'static str, index: usize },
    #[error("Registry key \"{key_path}\" does not start with a known hive")]
    UnknownRegistryHive { key_path: String },
    #[error("Data of registry value \"{name}\" does not fit kind {kind}")]
    RegistryDataMismatch {
        name: String,
        kind: RegistryValueKind,
    },
}

/// A single machine-state mutation replayed by the installer. The payload
/// shape is fixed by the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawOperation", into = "RawOperation")]
pub enum Operation {
    DeleteFile {
        directory: String,
        files: Vec<String>,
    },
    RenameFile {
        path: String,
        new_name: String,
    },
    CreateRegistrySubKey {
        key_path: String,
        sub_keys: Vec<String>,
    },
    DeleteRegistrySubKey {
        key_path: String,
        sub_keys: Vec<String>,
    },
    SetRegistryValue {
        key_path: String,
        values: Vec<RegistryValue>,
    },
    DeleteRegistryValue {
        key_path: String,
        value_names: Vec<String>,
    },
    StartProcess {
        path: String,
        arguments: Vec<String>,
    },
    TerminateProcess {
        process_name: String,
    },
    StartService {
        service_name: String,
    },
    StopService {
        service_name: String,
    },
    ExecuteScript {
        code: String,
    },
}

impl Operation {
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::DeleteFile { .. } => OperationKind::DeleteFile,
            Self::RenameFile { .. } => OperationKind::RenameFile,
            Self::CreateRegistrySubKey { .. } => OperationKind::CreateRegistrySubKey,
            Self::DeleteRegistrySubKey { .. } => OperationKind::DeleteRegistrySubKey,
            Self::SetRegistryValue { .. } => OperationKind::SetRegistryValue,
            Self::DeleteRegistryValue { .. } => OperationKind::DeleteRegistryValue,
            Self::StartProcess { .. } => OperationKind::StartProcess,
            Self::TerminateProcess { .. } => OperationKind::TerminateProcess,
            Self::StartService { .. } => OperationKind::StartService,
            Self::StopService { .. } => OperationKind::StopService,
            Self::ExecuteScript { .. } => OperationKind::ExecuteScript,
        }
    }

    /// The text stored in the `Value` slot: a path, key, name or script body.
    #[must_use]
    pub fn primary_value(&self) -> &str {
        match self {
            Self::DeleteFile { directory, .. } => directory,
            Self::RenameFile { path, .. } | Self::StartProcess { path, .. } => path,
            Self::CreateRegistrySubKey { key_path, .. }
            | Self::DeleteRegistrySubKey { key_path, .. }
            | Self::SetRegistryValue { key_path, .. }
            | Self::DeleteRegistryValue { key_path, .. } => key_path,
            Self::TerminateProcess { process_name } => process_name,
            Self::StartService { service_name } | Self::StopService { service_name } => {
                service_name
            }
            Self::ExecuteScript { code } => code,
        }
    }

    /// One-line description for listings.
    #[must_use]
    pub fn summary(&self) -> String {
        let name = self.kind().display_name();
        match self {
            Self::DeleteFile { directory, files } => {
                format!("{name}: {directory} ({} file(s))", files.len())
            }
            Self::RenameFile { path, new_name } => format!("{name}: {path} -> {new_name}"),
            Self::CreateRegistrySubKey { key_path, sub_keys }
            | Self::DeleteRegistrySubKey { key_path, sub_keys } => {
                format!("{name}: {key_path} ({} subkey(s))", sub_keys.len())
            }
            Self::SetRegistryValue { key_path, values } => {
                format!("{name}: {key_path} ({} value(s))", values.len())
            }
            Self::DeleteRegistryValue {
                key_path,
                value_names,
            } => format!("{name}: {key_path} ({} value(s))", value_names.len()),
            Self::StartProcess { path, arguments } if arguments.is_empty() => {
                format!("{name}: {path}")
            }
            Self::StartProcess { path, arguments } => {
                format!("{name}: {path} {}", arguments.join(" "))
            }
            Self::TerminateProcess { process_name } => format!("{name}: {process_name}"),
            Self::StartService { service_name } | Self::StopService { service_name } => {
                format!("{name}: {service_name}")
            }
            Self::ExecuteScript { code } => {
                format!("{name}: {} line(s)", code.lines().count())
            }
        }
    }

    /// Checks that every field the installer needs is present and well formed.
    ///
    /// # Errors
    /// Returns the first problem found in the payload.
    pub fn validate(&self) -> Result<(), OperationError> {
        match self {
            Self::DeleteFile { directory, files } => {
                validate_path("directory", directory)?;
                validate_list("files", files)?;
                files.iter().try_for_each(|file| validate_file_name(file))
            }
            Self::RenameFile { path, new_name } => {
                validate_path("path", path)?;
                require("new name", new_name)?;
                validate_file_name(new_name)
            }
            Self::CreateRegistrySubKey { key_path, sub_keys }
            | Self::DeleteRegistrySubKey { key_path, sub_keys } => {
                validate_key_path(key_path)?;
                validate_list("subkeys", sub_keys)
            }
            Self::SetRegistryValue { key_path, values } => {
                validate_key_path(key_path)?;
                if values.is_empty() {
                    return Err(OperationError::EmptyList { field: "values" });
                }
                for (index, value) in values.iter().enumerate() {
                    if value.name.trim().is_empty() {
                        return Err(OperationError::EmptyListEntry {
                            field: "values",
                            index,
                        });
                    }
                    if !value.kind.accepts(&value.data) {
                        return Err(OperationError::RegistryDataMismatch {
                            name: value.name.clone(),
                            kind: value.kind,
                        });
                    }
                }
                Ok(())
            }
            Self::DeleteRegistryValue {
                key_path,
                value_names,
            } => {
                validate_key_path(key_path)?;
                validate_list("value names", value_names)
            }
            Self::StartProcess { path, .. } => validate_path("path", path),
            Self::TerminateProcess { process_name } => require("process name", process_name),
            Self::StartService { service_name } | Self::StopService { service_name } => {
                require("service name", service_name)
            }
            Self::ExecuteScript { code } => require("code", code),
        }
    }
}

fn require(field: &'static str, value: &str) -> Result<(), OperationError> {
    if value.trim().is_empty() {
        Err(OperationError::EmptyField { field })
    } else {
        Ok(())
    }
}

fn validate_path(field: &'static str, path: &str) -> Result<(), OperationError> {
    require(field, path)?;
    let path = path.trim();
    if let Some(rest) = path.strip_prefix('%') {
        let variable = match rest.find('%') {
            Some(end) => &path[..end + 2],
            None => path,
        };
        if !PATH_VARIABLES
            .iter()
            .any(|known| known.eq_ignore_ascii_case(variable))
        {
            return Err(OperationError::UnknownPathVariable {
                variable: variable.to_string(),
            });
        }
    }
    Ok(())
}

fn validate_file_name(name: &str) -> Result<(), OperationError> {
    if name.trim().is_empty() {
        return Err(OperationError::EmptyField { field: "file name" });
    }
    if name.contains(['/', '\\']) {
        return Err(OperationError::InvalidFileName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn validate_list(field: &'static str, items: &[String]) -> Result<(), OperationError> {
    if items.is_empty() {
        return Err(OperationError::EmptyList { field });
    }
    match items.iter().position(|item| item.trim().is_empty()) {
        Some(index) => Err(OperationError::EmptyListEntry { field, index }),
        None => Ok(()),
    }
}

fn validate_key_path(key_path: &str) -> Result<(), OperationError> {
    require("key path", key_path)?;
    let hive = key_path.trim().split('\\').next().unwrap_or_default();
    if REGISTRY_HIVES
        .iter()
        .any(|known| known.eq_ignore_ascii_case(hive))
    {
        Ok(())
    } else {
        Err(OperationError::UnknownRegistryHive {
            key_path: key_path.to_string(),
        })
    }
}

/// Stored layout of an operation: `{"Area", "Method", "Value", "Value2"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawOperation {
    area: OperationArea,
    method: OperationMethod,
    #[serde(default)]
    value: String,
    #[serde(default)]
    value2: Value,
}

fn string_list(kind: OperationKind, value: Value) -> Result<Vec<String>, OperationParseError> {
    let invalid = || OperationParseError::InvalidPayload {
        kind: kind.tag(),
        expected: "a list of strings",
    };
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                _ => Err(invalid()),
            })
            .collect(),
        _ => Err(invalid()),
    }
}

fn string_value(kind: OperationKind, value: Value) -> Result<String, OperationParseError> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        _ => Err(OperationParseError::InvalidPayload {
            kind: kind.tag(),
            expected: "a string",
        }),
    }
}

fn registry_values(
    kind: OperationKind,
    value: Value,
) -> Result<Vec<RegistryValue>, OperationParseError> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value).map_err(|_| OperationParseError::InvalidPayload {
        kind: kind.tag(),
        expected: "a list of {Item1, Item2, Item3} registry values",
    })
}

impl TryFrom<RawOperation> for Operation {
    type Error = OperationParseError;

    fn try_from(raw: RawOperation) -> Result<Self, Self::Error> {
        let kind = OperationKind::from_area_method(raw.area, raw.method).ok_or(
            OperationParseError::UnknownOperation {
                area: raw.area,
                method: raw.method,
            },
        )?;
        let value = raw.value;
        let value2 = raw.value2;

        Ok(match kind {
            OperationKind::DeleteFile => Self::DeleteFile {
                directory: value,
                files: string_list(kind, value2)?,
            },
            OperationKind::RenameFile => Self::RenameFile {
                path: value,
                new_name: string_value(kind, value2)?,
            },
            OperationKind::CreateRegistrySubKey => Self::CreateRegistrySubKey {
                key_path: value,
                sub_keys: string_list(kind, value2)?,
            },
            OperationKind::DeleteRegistrySubKey => Self::DeleteRegistrySubKey {
                key_path: value,
                sub_keys: string_list(kind, value2)?,
            },
            OperationKind::SetRegistryValue => Self::SetRegistryValue {
                key_path: value,
                values: registry_values(kind, value2)?,
            },
            OperationKind::DeleteRegistryValue => Self::DeleteRegistryValue {
                key_path: value,
                value_names: string_list(kind, value2)?,
            },
            OperationKind::StartProcess => Self::StartProcess {
                path: value,
                arguments: string_list(kind, value2)?,
            },
            OperationKind::TerminateProcess => Self::TerminateProcess {
                process_name: value,
            },
            OperationKind::StartService => Self::StartService {
                service_name: value,
            },
            OperationKind::StopService => Self::StopService {
                service_name: value,
            },
            OperationKind::ExecuteScript => Self::ExecuteScript { code: value },
        })
    }
}

impl From<Operation> for RawOperation {
    fn from(operation: Operation) -> Self {
        let (area, method) = operation.kind().area_method();
        let (value, value2) = match operation {
            Operation::DeleteFile {
                directory: value,
                files: list,
            }
            | Operation::CreateRegistrySubKey {
                key_path: value,
                sub_keys: list,
            }
            | Operation::DeleteRegistrySubKey {
                key_path: value,
                sub_keys: list,
            }
            | Operation::DeleteRegistryValue {
                key_path: value,
                value_names: list,
            }
            | Operation::StartProcess {
                path: value,
                arguments: list,
            } => (value, Value::from(list)),
            Operation::RenameFile { path, new_name } => (path, Value::String(new_name)),
            Operation::SetRegistryValue { key_path, values } => {
                let items = values
                    .into_iter()
                    .map(|v| json!({ "Item1": v.name, "Item2": v.data, "Item3": v.kind.code() }))
                    .collect();
                (key_path, Value::Array(items))
            }
            Operation::TerminateProcess {
                process_name: value,
            }
            | Operation::StartService {
                service_name: value,
            }
            | Operation::StopService {
                service_name: value,
            }
            | Operation::ExecuteScript { code: value } => (value, Value::Null),
        };

        Self {
            area,
            method,
            value,
            value2,
        }
    }
}

/// Operations in installer replay order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationList(Vec<Operation>);

impl OperationList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, operation: Operation) {
        self.0.push(operation);
    }

    /// Inserts at `index`, appending when the index is past the end.
    pub fn insert(&mut self, index: usize, operation: Operation) {
        let index = index.min(self.0.len());
        self.0.insert(index, operation);
    }

    pub fn remove(&mut self, index: usize) -> Option<Operation> {
        (index < self.0.len()).then(|| self.0.remove(index))
    }

    /// Replaces the entry at `index`, returning the previous one.
    pub fn replace(&mut self, index: usize, operation: Operation) -> Option<Operation> {
        self.0
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, operation))
    }

    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.0.len() {
            return false;
        }
        self.0.swap(index - 1, index);
        true
    }

    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.0.len() {
            return false;
        }
        self.0.swap(index, index + 1);
        true
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Operation> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
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

    /// # Errors
    /// Returns [`ValidationError::InvalidOperation`] for the first invalid
    /// entry.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (index, operation) in self.0.iter().enumerate() {
            operation
                .validate()
                .map_err(|source| ValidationError::InvalidOperation {
                    index,
                    kind: operation.kind().display_name(),
                    source,
                })?;
        }
        Ok(())
    }
}

impl From<Vec<Operation>> for OperationList {
    fn from(operations: Vec<Operation>) -> Self {
        Self(operations)
    }
}

impl FromIterator<Operation> for OperationList {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a OperationList {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
