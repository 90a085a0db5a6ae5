mod fs;
mod lock;
mod paths;

pub use fs::write_atomic;
pub use lock::{LockError, ProjectLock};
pub use paths::{AppPaths, AppPathsError, DATA_DIR_ENV};
