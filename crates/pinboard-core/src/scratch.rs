//! Owned scratch directory for intermediate files (flipped image copies).
//!
//! Everything handed out lives under one temporary directory that is removed
//! when the `ScratchSpace` is dropped.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thiserror::Error;

/// Scratch space errors.
#[derive(Debug, Error)]
pub enum ScratchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid scratch file name: {0}")]
    InvalidName(String),
}

/// Result type for scratch operations.
pub type ScratchResult<T> = Result<T, ScratchError>;

/// A temporary directory plus the files allocated in it.
#[derive(Debug)]
pub struct ScratchSpace {
    dir: TempDir,
    files: Vec<PathBuf>,
    counter: u64,
}

impl ScratchSpace {
    /// Create a fresh directory under the system temp location.
    pub fn new() -> ScratchResult<Self> {
        Ok(Self::from_dir(TempDir::with_prefix("pinboard-")?))
    }

    /// Create a fresh directory under `parent`.
    pub fn new_in(parent: impl AsRef<Path>) -> ScratchResult<Self> {
        Ok(Self::from_dir(TempDir::with_prefix_in("pinboard-", parent)?))
    }

    fn from_dir(dir: TempDir) -> Self {
        log::debug!("Scratch space at {}", dir.path().display());
        Self {
            dir,
            files: Vec::new(),
            counter: 0,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Reserve a unique path `<stem>_<n>.<extension>`. The file is not created.
    pub fn allocate(&mut self, stem: &str, extension: &str) -> ScratchResult<PathBuf> {
        let valid = |s: &str| !s.contains(['/', '\\']) && s != "." && s != "..";
        if stem.is_empty() || !valid(stem) || !valid(extension) {
            return Err(ScratchError::InvalidName(format!("{stem}.{extension}")));
        }

        self.counter += 1;
        let name = if extension.is_empty() {
            format!("{stem}_{}", self.counter)
        } else {
            format!("{stem}_{}.{extension}", self.counter)
        };
        let path = self.dir.path().join(name);
        self.files.push(path.clone());
        Ok(path)
    }

    /// Paths handed out so far.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Delete every allocated file that exists, keeping the directory.
    pub fn clear(&mut self) -> ScratchResult<()> {
        for path in self.files.drain(..) {
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}
