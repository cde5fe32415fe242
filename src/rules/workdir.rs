//! Working Directory Guard
//!
//! The process working directory is global state. [`WorkingDirGuard`]
//! changes it and puts the original back when dropped, so every exit path
//! (including `?` returns and panics) restores it. Only one guard may be
//! active per process at a time; callers must serialize loads.

use std::env;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{Result, RuleArgsError};

/// Restores the original working directory on drop unless retained.
#[derive(Debug)]
pub struct WorkingDirGuard {
    original: PathBuf,
    restore: bool,
}

impl WorkingDirGuard {
    /// Records the current directory and changes to `dir`.
    ///
    /// An empty `dir` leaves the working directory where it is.
    pub fn enter(dir: &Path) -> Result<Self> {
        let original =
            env::current_dir().map_err(|source| RuleArgsError::CurrentDirectory { source })?;

        if !dir.as_os_str().is_empty() {
            env::set_current_dir(dir).map_err(|source| RuleArgsError::WorkingDirectory {
                path: dir.to_path_buf(),
                source,
            })?;
            debug!("Changed working directory to {}", dir.display());
        }

        Ok(Self {
            original,
            restore: true,
        })
    }

    /// The working directory observed before the change.
    pub fn original(&self) -> &Path {
        &self.original
    }

    /// Keeps the new working directory after the guard is dropped.
    pub fn retain(&mut self) {
        self.restore = false;
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if !self.restore {
            return;
        }
        match env::set_current_dir(&self.original) {
            Ok(()) => debug!("Restored working directory to {}", self.original.display()),
            Err(e) => warn!(
                "Failed to restore working directory to {}: {}",
                self.original.display(),
                e
            ),
        }
    }
}
