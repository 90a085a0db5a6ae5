use async_trait::async_trait;
use std::path::Path;

use crate::error::TransferError;

/// Rejects remote names that would escape the update directory.
///
/// # Errors
/// Returns [`TransferError::InvalidRemoteName`] for empty names, absolute
/// paths and names containing `..` segments.
pub fn check_remote_name(name: &str) -> Result<(), TransferError> {
    let invalid = name.trim().is_empty()
        || name.starts_with(['/', '\\'])
        || name.contains(':')
        || name.split(['/', '\\']).any(|segment| segment == "..");
    if invalid {
        Err(TransferError::InvalidRemoteName {
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Moves published files to wherever clients fetch updates from.
#[async_trait]
pub trait Transfer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn upload_file(&self, local: &Path, remote_name: &str) -> Result<(), TransferError>;

    async fn rename_directory(&self, from: &str, to: &str) -> Result<(), TransferError>;

    async fn exists(&self, _remote_name: &str) -> Result<bool, TransferError> {
        Err(TransferError::Unsupported { operation: "exists" })
    }

    /// Uploads files in order, stopping at the first failure.
    async fn upload_files(&self, files: &[(&Path, &str)]) -> Result<(), TransferError> {
        for (local, remote_name) in files {
            self.upload_file(local, remote_name).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct RecordingTransfer {
        uploads: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl Transfer for RecordingTransfer {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn upload_file(&self, _local: &Path, remote_name: &str) -> Result<(), TransferError> {
            check_remote_name(remote_name)?;
            if self.fail_on == Some(remote_name) {
                return Err(TransferError::network_request("upload", "connection reset"));
            }
            self.uploads
                .lock()
                .expect("uploads lock")
                .push(remote_name.to_string());
            Ok(())
        }

        async fn rename_directory(&self, _from: &str, _to: &str) -> Result<(), TransferError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn exists_default_returns_unsupported() {
        let transfer = RecordingTransfer::default();
        let result = transfer.exists("updates.json").await;
        assert_eq!(
            result,
            Err(TransferError::Unsupported { operation: "exists" })
        );
    }

    #[tokio::test]
    async fn upload_files_stops_at_first_failure() {
        let transfer = RecordingTransfer {
            fail_on: Some("b.zip"),
            ..RecordingTransfer::default()
        };
        let local = PathBuf::from("/tmp/packsmith-test");
        let files = [
            (local.as_path(), "a.zip"),
            (local.as_path(), "b.zip"),
            (local.as_path(), "c.zip"),
        ];

        let result = transfer.upload_files(&files).await;

        assert!(matches!(result, Err(TransferError::NetworkError { .. })));
        assert_eq!(*transfer.uploads.lock().expect("uploads lock"), vec!["a.zip"]);
    }

    #[test]
    fn remote_names_cannot_escape_root() {
        assert!(check_remote_name("updates.json").is_ok());
        assert!(check_remote_name("1.2.0.0/package.zip").is_ok());
        assert!(check_remote_name("").is_err());
        assert!(check_remote_name("/etc/passwd").is_err());
        assert!(check_remote_name("..\\outside").is_err());
        assert!(check_remote_name("a/../../b").is_err());
        assert!(check_remote_name("C:\\x").is_err());
    }
}
