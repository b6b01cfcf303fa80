//! Filesystem-backed asset resolution.

use super::{AssetError, AssetResolver, AssetResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolves references as file paths.
///
/// Relative references are joined onto `root` when one is set, otherwise they
/// are taken relative to the working directory.
#[derive(Debug, Clone, Default)]
pub struct FileAssets {
    root: Option<PathBuf>,
}

impl FileAssets {
    /// Resolve paths as given.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths under `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Full path a reference maps to.
    pub fn path_for(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl AssetResolver for FileAssets {
    fn resolve(&self, reference: &str) -> AssetResult<()> {
        if reference.is_empty() {
            return Err(AssetError::EmptyReference);
        }
        let path = self.path_for(reference);
        let metadata = fs::metadata(&path)
            .map_err(|_| AssetError::NotFound(path.display().to_string()))?;
        if !metadata.is_file() {
            return Err(AssetError::Unreadable(format!(
                "{} is not a file",
                path.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_assets_with_root() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("photo.png"), b"png").unwrap();

        let assets = FileAssets::with_root(dir.path());
        assert!(assets.resolve("photo.png").is_ok());
        assert!(matches!(assets.resolve("missing.png"), Err(AssetError::NotFound(_))));
    }

    #[test]
    fn test_absolute_path_ignores_root() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("abs.png");
        fs::write(&file, b"png").unwrap();

        let assets = FileAssets::with_root("/nonexistent-root");
        assert!(assets.resolve(file.to_str().unwrap()).is_ok());
    }

    #[test]
    fn test_directory_is_unreadable() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("folder")).unwrap();
        let assets = FileAssets::with_root(dir.path());
        assert!(matches!(assets.resolve("folder"), Err(AssetError::Unreadable(_))));
        assert_eq!(assets.resolve(""), Err(AssetError::EmptyReference));
    }
}
