use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Remote item not found: {name}")]
    NotFound { name: String },

    #[error("IO error ({kind}): {message}")]
    IoError {
        kind: std::io::ErrorKind,
        message: String,
    },

    #[error("Network error during {operation} ({stage}): {details}")]
    NetworkError {
        operation: &'static str,
        stage: NetworkStage,
        details: String,
    },

    #[error("Server rejected {operation} with HTTP {status}{details}")]
    Rejected {
        operation: &'static str,
        status: u16,
        details: String,
    },

    #[error("Operation not supported by this transfer: {operation}")]
    Unsupported { operation: &'static str },

    #[error("Invalid remote name: {name}")]
    InvalidRemoteName { name: String },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStage {
    #[error("request")]
    Request,
    #[error("response")]
    Response,
}

impl TransferError {
    pub fn network_request(operation: &'static str, details: impl Into<String>) -> Self {
        Self::NetworkError {
            operation,
            stage: NetworkStage::Request,
            details: details.into(),
        }
    }

    pub fn network_request_from<E>(operation: &'static str, error: E) -> Self
    where
        E: std::fmt::Display,
    {
        Self::network_request(operation, error.to_string())
    }

    pub fn network_response(operation: &'static str, details: impl Into<String>) -> Self {
        Self::NetworkError {
            operation,
            stage: NetworkStage::Response,
            details: details.into(),
        }
    }

    pub fn rejected(operation: &'static str, status: u16, body: &str) -> Self {
        let snippet: String = body.trim().chars().take(160).collect();
        Self::Rejected {
            operation,
            status,
            details: if snippet.is_empty() {
                String::new()
            } else {
                format!(": {snippet}")
            },
        }
    }
}

impl From<std::io::Error> for TransferError {
    fn from(err: std::io::Error) -> Self {
        TransferError::IoError {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
