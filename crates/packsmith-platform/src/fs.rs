use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Replaces the file at `path` with `data` in one step: the bytes go to a
/// hidden sibling file which is then renamed over the target.
///
/// # Errors
/// Returns an error if the parent directory cannot be created, the data
/// cannot be written, or the final rename fails. No temporary file is left
/// behind in either case.
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no parent directory", path.display()),
            ));
        }
    };
    std::fs::create_dir_all(parent)?;

    let prefix = format!(
        ".{}.",
        path.file_name()
            .map_or_else(|| "packsmith".into(), |name| name.to_string_lossy())
    );
    let mut staged = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(parent)?;
    staged.write_all(data)?;
    staged.as_file().sync_all()?;
    persist(staged, path)?;

    log::debug!("Wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}

fn persist(staged: NamedTempFile, path: &Path) -> io::Result<()> {
    staged.persist(path).map(drop).map_err(|error| error.error)
}
