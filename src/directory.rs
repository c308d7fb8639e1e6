//! Scoped working directory changes
//!
//! The process working directory is the only shared mutable state this crate touches.
//! [`enter`] switches it and hands back a guard that switches back to the directory that
//! was current right before, on every exit path. Nested guards unwind one layer at a time.

use parking_lot::{const_reentrant_mutex, ReentrantMutex, ReentrantMutexGuard};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

static WORKING_DIRECTORY: ReentrantMutex<()> = const_reentrant_mutex(());

/// Restores the previous working directory when dropped.
///
/// Holds the process-wide working directory lock, so other threads wait while the
/// guard lives. The same thread may nest further guards.
#[must_use = "the previous directory is restored as soon as the guard is dropped"]
pub struct DirectoryGuard {
    previous: PathBuf,
    _lock: ReentrantMutexGuard<'static, ()>,
}

impl DirectoryGuard {
    /// The directory restored on drop
    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl Drop for DirectoryGuard {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.previous) {
            warn!(
                directory = %self.previous.display(),
                error = %e,
                "Failed to restore working directory"
            );
        } else {
            debug!(directory = %self.previous.display(), "Restored working directory");
        }
    }
}

/// Change into `destination` until the returned guard is dropped.
///
/// A leading `~` is expanded to the user's home directory. With `make`, missing
/// directories are created first.
pub fn enter(destination: impl AsRef<Path>, make: bool) -> io::Result<DirectoryGuard> {
    let lock = WORKING_DIRECTORY.lock();
    let destination = expand_home(destination.as_ref());

    if make {
        std::fs::create_dir_all(&destination)?;
    }

    let previous = std::env::current_dir()?;
    std::env::set_current_dir(&destination)?;
    debug!(
        from = %previous.display(),
        to = %destination.display(),
        "Entered directory"
    );

    Ok(DirectoryGuard {
        previous,
        _lock: lock,
    })
}

/// Run `f` with `destination` as working directory
pub fn within<T>(
    destination: impl AsRef<Path>,
    make: bool,
    f: impl FnOnce() -> T,
) -> io::Result<T> {
    let _guard = enter(destination, make)?;
    Ok(f())
}

/// The current working directory, read under the working directory lock
pub fn current() -> io::Result<PathBuf> {
    let _lock = WORKING_DIRECTORY.lock();
    std::env::current_dir()
}

/// Expand a leading `~` component to the home directory
pub fn expand_home(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(std::path::Component::Normal(first)) if first == "~" => {
            match directories::BaseDirs::new() {
                Some(base) => base.home_dir().join(components.as_path()),
                None => path.to_path_buf(),
            }
        }
        _ => path.to_path_buf(),
    }
}
