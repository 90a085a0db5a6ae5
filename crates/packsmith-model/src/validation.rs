use crate::operation::OperationError;
use crate::version::VersionParseError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid package version: {0}")]
    InvalidVersion(#[from] VersionParseError),

    #[error("Version \"0.0.0.0\" is not a valid version")]
    ZeroVersion,

    #[error("Version \"{version}\" already exists")]
    DuplicateVersion { version: String },

    #[error(
        "No English changelog set. A changelog for \"en\" is required for clients that don't use one of the specified cultures"
    )]
    MissingEnglishChangelog,

    #[error("Unsupported version entry \"{literal}\" is invalid")]
    InvalidUnsupportedVersion { literal: String },

    #[error("Operation #{} ({kind}) is invalid: {source}", .index + 1)]
    InvalidOperation {
        index: usize,
        kind: &'static str,
        source: OperationError,
    },
}
