use std::path::{Path, PathBuf};

use async_trait::async_trait;
use packsmith_model::{Transfer, TransferError, check_remote_name};

/// Publishes into a directory, for example a mounted share that a web
/// server exposes.
#[derive(Debug, Clone)]
pub struct LocalTransfer {
    root: PathBuf,
}

impl LocalTransfer {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn target(&self, remote_name: &str) -> Result<PathBuf, TransferError> {
        check_remote_name(remote_name)?;
        Ok(remote_name
            .split(['/', '\\'])
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .fold(self.root.clone(), |path, segment| path.join(segment)))
    }
}

#[async_trait]
impl Transfer for LocalTransfer {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn upload_file(&self, local: &Path, remote_name: &str) -> Result<(), TransferError> {
        let target = self.target(remote_name)?;
        if !tokio::fs::try_exists(local).await? {
            return Err(TransferError::NotFound {
                name: local.display().to_string(),
            });
        }
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = tokio::fs::copy(local, &target).await?;
        log::debug!("Copied {bytes} bytes to {}", target.display());
        Ok(())
    }

    async fn rename_directory(&self, from: &str, to: &str) -> Result<(), TransferError> {
        let source = self.target(from)?;
        let destination = self.target(to)?;
        if !tokio::fs::try_exists(&source).await? {
            return Err(TransferError::NotFound {
                name: from.to_string(),
            });
        }
        if tokio::fs::try_exists(&destination).await? {
            return Err(TransferError::IoError {
                kind: std::io::ErrorKind::AlreadyExists,
                message: format!("{} already exists", destination.display()),
            });
        }
        tokio::fs::rename(&source, &destination).await?;
        log::debug!(
            "Renamed {} to {}",
            source.display(),
            destination.display()
        );
        Ok(())
    }

    async fn exists(&self, remote_name: &str) -> Result<bool, TransferError> {
        let target = self.target(remote_name)?;
        Ok(tokio::fs::try_exists(target).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_copies_into_nested_remote_path() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let local = temp_dir.path().join("updates.json");
        tokio::fs::write(&local, b"[]")
            .await
            .expect("local file should be written");
        let transfer = LocalTransfer::new(temp_dir.path().join("remote"));

        transfer
            .upload_file(&local, "1.0.0.0/updates.json")
            .await
            .expect("upload should succeed");

        let copied = tokio::fs::read_to_string(transfer.root().join("1.0.0.0").join("updates.json"))
            .await
            .expect("copied file should be readable");
        assert_eq!(copied, "[]");
        assert_eq!(transfer.exists("1.0.0.0/updates.json").await, Ok(true));
        assert_eq!(transfer.exists("2.0.0.0").await, Ok(false));
    }

    #[tokio::test]
    async fn upload_of_missing_file_reports_not_found() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let transfer = LocalTransfer::new(temp_dir.path());

        let result = transfer
            .upload_file(&temp_dir.path().join("missing.json"), "updates.json")
            .await;

        assert!(matches!(result, Err(TransferError::NotFound { .. })));
    }

    #[tokio::test]
    async fn rename_moves_directory_once() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let transfer = LocalTransfer::new(temp_dir.path());
        tokio::fs::create_dir_all(temp_dir.path().join("1.0.0.0"))
            .await
            .expect("remote directory should be created");

        transfer
            .rename_directory("1.0.0.0", "1.1.0.0")
            .await
            .expect("rename should succeed");

        assert!(temp_dir.path().join("1.1.0.0").is_dir());
        assert!(matches!(
            transfer.rename_directory("1.0.0.0", "1.1.0.0").await,
            Err(TransferError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn escaping_names_are_rejected() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let transfer = LocalTransfer::new(temp_dir.path());

        let result = transfer.exists("../outside").await;

        assert!(matches!(
            result,
            Err(TransferError::InvalidRemoteName { .. })
        ));
    }
}
