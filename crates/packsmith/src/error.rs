use packsmith_core::{EditorError, FeedbackError, ProjectError, PublishError, StoreError};
use packsmith_model::{TransferError, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppErrorDetail {
    Message(String),
    Io {
        kind: std::io::ErrorKind,
        message: String,
    },
    Validation(ValidationError),
    Transfer(TransferError),
}

impl std::fmt::Display for AppErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Message(message) => write!(f, "{message}"),
            Self::Io { kind, message } => write!(f, "{kind}: {message}"),
            Self::Validation(error) => write!(f, "{error}"),
            Self::Transfer(error) => write!(f, "{error}"),
        }
    }
}

impl From<String> for AppErrorDetail {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

impl From<&str> for AppErrorDetail {
    fn from(value: &str) -> Self {
        Self::Message(value.to_string())
    }
}

impl From<std::io::Error> for AppErrorDetail {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl From<ValidationError> for AppErrorDetail {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<TransferError> for AppErrorDetail {
    fn from(value: TransferError) -> Self {
        Self::Transfer(value)
    }
}

impl From<EditorError> for AppErrorDetail {
    fn from(value: EditorError) -> Self {
        match value {
            EditorError::Validation(error) => Self::Validation(error),
            other => Self::Message(other.to_string()),
        }
    }
}

impl From<PublishError> for AppErrorDetail {
    fn from(value: PublishError) -> Self {
        match value {
            PublishError::Upload(error) => Self::Transfer(error),
            other => Self::Message(other.to_string()),
        }
    }
}

impl From<ProjectError> for AppErrorDetail {
    fn from(value: ProjectError) -> Self {
        Self::Message(value.to_string())
    }
}

impl From<StoreError> for AppErrorDetail {
    fn from(value: StoreError) -> Self {
        Self::Message(value.to_string())
    }
}

impl From<FeedbackError> for AppErrorDetail {
    fn from(value: FeedbackError) -> Self {
        Self::Message(value.to_string())
    }
}

impl From<packsmith_platform::LockError> for AppErrorDetail {
    fn from(value: packsmith_platform::LockError) -> Self {
        Self::Message(value.to_string())
    }
}

impl From<serde_json::Error> for AppErrorDetail {
    fn from(value: serde_json::Error) -> Self {
        Self::Message(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    Message(String),
    Timeout {
        operation: &'static str,
        seconds: u64,
    },
    PathsUnavailable {
        details: AppErrorDetail,
    },
    InvalidArgument {
        argument: &'static str,
        details: AppErrorDetail,
    },
    ProjectFailed {
        action: &'static str,
        details: AppErrorDetail,
    },
    ProjectLocked {
        project: String,
    },
    PackageFailed {
        action: &'static str,
        details: AppErrorDetail,
    },
    PublishFailed {
        phase: &'static str,
        details: AppErrorDetail,
        retryable: bool,
    },
    FeedbackFailed {
        details: AppErrorDetail,
    },
    SettingsSaveFailed {
        details: AppErrorDetail,
    },
}

impl AppError {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub fn timeout(operation: &'static str, seconds: u64) -> Self {
        Self::Timeout { operation, seconds }
    }

    pub fn paths_unavailable(details: impl Into<AppErrorDetail>) -> Self {
        Self::PathsUnavailable {
            details: details.into(),
        }
    }

    pub fn invalid_argument(argument: &'static str, details: impl Into<AppErrorDetail>) -> Self {
        Self::InvalidArgument {
            argument,
            details: details.into(),
        }
    }

    pub fn project_failed(action: &'static str, details: impl Into<AppErrorDetail>) -> Self {
        Self::ProjectFailed {
            action,
            details: details.into(),
        }
    }

    pub fn project_locked(project: impl Into<String>) -> Self {
        Self::ProjectLocked {
            project: project.into(),
        }
    }

    pub fn package_failed(action: &'static str, details: impl Into<AppErrorDetail>) -> Self {
        Self::PackageFailed {
            action,
            details: details.into(),
        }
    }

    pub fn publish_failed(phase: &'static str, error: PublishError) -> Self {
        Self::PublishFailed {
            phase,
            retryable: error.is_retryable(),
            details: error.into(),
        }
    }

    pub fn feedback_failed(details: impl Into<AppErrorDetail>) -> Self {
        Self::FeedbackFailed {
            details: details.into(),
        }
    }

    pub fn settings_save_failed(details: impl Into<AppErrorDetail>) -> Self {
        Self::SettingsSaveFailed {
            details: details.into(),
        }
    }

    /// Whether running the same operation again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::PublishFailed { retryable: true, .. }
        )
    }
}

impl From<String> for AppError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

impl From<&str> for AppError {
    fn from(value: &str) -> Self {
        Self::Message(value.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Message(message) => write!(f, "{message}"),
            Self::Timeout { operation, seconds } => {
                write!(f, "{operation} timed out after {seconds}s")
            }
            Self::PathsUnavailable { details } => {
                write!(f, "Could not determine application directories: {details}")
            }
            Self::InvalidArgument { argument, details } => {
                write!(f, "Invalid value for {argument}: {details}")
            }
            Self::ProjectFailed { action, details } => {
                write!(f, "Failed to {action} project: {details}")
            }
            Self::ProjectLocked { project } => {
                write!(f, "Project {project} is being edited by another process")
            }
            Self::PackageFailed { action, details } => {
                write!(f, "Failed to {action} package: {details}")
            }
            Self::PublishFailed { phase, details, .. } => {
                write!(f, "Publishing failed while {phase}: {details}")
            }
            Self::FeedbackFailed { details } => write!(f, "Feedback not sent: {details}"),
            Self::SettingsSaveFailed { details } => {
                write!(f, "Failed to save settings: {details}")
            }
        }
    }
}

impl std::error::Error for AppError {}
