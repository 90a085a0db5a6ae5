use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use packsmith_platform::AppPaths;

const LOG_TARGET_PREFIX: &str = "packsmith";

/// Append-only debug log that reopens its file when it has been deleted
/// between writes.
struct DebugLogFile {
    path: PathBuf,
    file: File,
}

impl DebugLogFile {
    fn open(path: PathBuf) -> io::Result<Self> {
        let file = Self::open_append(&path)?;
        Ok(Self { path, file })
    }

    fn open_append(path: &Path) -> io::Result<File> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(path)
    }

    fn current(&mut self) -> io::Result<&mut File> {
        if !self.path.exists() {
            self.file = Self::open_append(&self.path)?;
        }
        Ok(&mut self.file)
    }
}

impl Write for DebugLogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.current()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Drops the older half of the log once it grows past `max_len` bytes.
/// The cut is moved forward to the next line start.
fn trim_log(path: &Path, max_len: u64) -> io::Result<bool> {
    if std::fs::metadata(path)?.len() <= max_len {
        return Ok(false);
    }

    let contents = std::fs::read(path)?;
    let middle = contents.len() / 2;
    let start = contents
        .iter()
        .skip(middle)
        .position(|&byte| byte == b'\n')
        .map_or(middle, |offset| middle + offset + 1);
    std::fs::write(path, &contents[start..])?;
    Ok(true)
}

fn config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str(LOG_TARGET_PREFIX)
        .build()
}

/// Warnings always reach stderr. With `debug_enabled` (the `debug_logging`
/// setting or `--verbose`) everything down to debug is also appended to the
/// log file.
pub fn init_logging(paths: &AppPaths, debug_enabled: bool, max_log_size: u64) {
    let level = max_level(debug_enabled);
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        config(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    let log_path = paths.log_file();
    if debug_enabled {
        if let Err(error) = trim_log(&log_path, max_log_size)
            && error.kind() != io::ErrorKind::NotFound
        {
            eprintln!("warning: could not trim {}: {error}", log_path.display());
        }
        match DebugLogFile::open(log_path.clone()) {
            Ok(file) => loggers.push(WriteLogger::new(LevelFilter::Debug, config(), file)),
            Err(error) => eprintln!("warning: could not open {}: {error}", log_path.display()),
        }
    }

    if CombinedLogger::init(loggers).is_ok() {
        log::set_max_level(level);
        log::debug!("Logging to {}", log_path.display());
    }
}

fn max_level(debug_enabled: bool) -> LevelFilter {
    if debug_enabled {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}
