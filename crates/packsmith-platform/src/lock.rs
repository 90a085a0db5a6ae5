use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("project is being edited by another process (lock file {})", .path.display())]
    AlreadyLocked { path: PathBuf },
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl LockError {
    fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }
}

/// Advisory exclusive lock held while a project is being modified. The lock
/// is released when the guard is dropped.
#[derive(Debug)]
pub struct ProjectLock {
    file: File,
    path: PathBuf,
}

impl ProjectLock {
    /// # Errors
    /// Returns [`LockError::AlreadyLocked`] when another process holds the
    /// lock, or an IO error when the lock file cannot be opened or written.
    pub fn acquire(path: &Path) -> Result<Self, LockError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|error| LockError::io("failed to create lock directory", error))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|error| LockError::io("failed to open project lock file", error))?;

        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(error) if error.kind() == std::io::ErrorKind::WouldBlock => {
                return Err(LockError::AlreadyLocked {
                    path: path.to_path_buf(),
                });
            }
            Err(error) => {
                // fs2 reports contention on Windows as a raw OS error rather
                // than WouldBlock.
                if error.raw_os_error() == fs2::lock_contended_error().raw_os_error() {
                    return Err(LockError::AlreadyLocked {
                        path: path.to_path_buf(),
                    });
                }
                return Err(LockError::io("failed to acquire project lock", error));
            }
        }

        file.set_len(0)
            .and_then(|()| file.seek(SeekFrom::Start(0)).map(|_| ()))
            .and_then(|()| writeln!(file, "{}", std::process::id()))
            .map_err(|error| LockError::io("failed to write project lock metadata", error))?;

        log::debug!("Acquired project lock {}", path.display());
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ProjectLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
