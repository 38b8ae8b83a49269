//! Scratch directories with guaranteed cleanup.
//!
//! `tempfile::TempDir` already removes itself on normal and error exits.
//! An interrupt skips destructors, so every live scratch directory is also
//! registered with a SIGINT handler that removes it before the process
//! dies.

use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Exit status for an interrupted run (128 + SIGINT).
const EXIT_INTERRUPTED: i32 = 130;

static SCRATCH_DIRS: LazyLock<Mutex<Vec<PathBuf>>> = LazyLock::new(|| Mutex::new(Vec::new()));

/// Install the interrupt handler. Call once, early in `main`.
pub fn install_handler() {
    let _ = ctrlc::set_handler(|| {
        cleanup_scratch();
        std::process::exit(EXIT_INTERRUPTED);
    });
}

fn cleanup_scratch() {
    if let Ok(dirs) = SCRATCH_DIRS.lock() {
        for dir in dirs.iter() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}

fn register(path: &Path) {
    if let Ok(mut dirs) = SCRATCH_DIRS.lock() {
        dirs.push(path.to_path_buf());
    }
}

fn unregister(path: &Path) {
    if let Ok(mut dirs) = SCRATCH_DIRS.lock() {
        dirs.retain(|p| p != path);
    }
}

/// A temporary directory removed on drop and on interrupt.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create a new scratch directory under the system temp location.
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("failed to create scratch directory")?;
        register(dir.path());
        Ok(ScratchDir { dir })
    }

    /// Path of the scratch directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        unregister(self.dir.path());
        // TempDir removes the directory itself.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_dir_registered_while_alive() {
        let scratch = ScratchDir::new().unwrap();
        let path = scratch.path().to_path_buf();

        assert!(SCRATCH_DIRS.lock().unwrap().contains(&path));
        assert!(path.exists());

        drop(scratch);

        assert!(!SCRATCH_DIRS.lock().unwrap().contains(&path));
        assert!(!path.exists());
    }
}
