//! Asset resolution for objects that reference external files.
//!
//! The core never decodes pixels. A resolver only answers whether a reference
//! is still usable, which history restore needs before rebuilding an image.

mod file;
mod memory;

pub use file::FileAssets;
pub use memory::MemoryAssets;

use thiserror::Error;

/// Asset errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),
    #[error("Asset unreadable: {0}")]
    Unreadable(String),
    #[error("Asset reference is empty")]
    EmptyReference,
}

/// Result type for asset operations.
pub type AssetResult<T> = Result<T, AssetError>;

/// Checks that an asset reference can still be loaded.
pub trait AssetResolver {
    /// Succeeds when `reference` points at a usable asset.
    fn resolve(&self, reference: &str) -> AssetResult<()>;
}

impl<R: AssetResolver + ?Sized> AssetResolver for &R {
    fn resolve(&self, reference: &str) -> AssetResult<()> {
        (**self).resolve(reference)
    }
}

impl<R: AssetResolver + ?Sized> AssetResolver for Box<R> {
    fn resolve(&self, reference: &str) -> AssetResult<()> {
        (**self).resolve(reference)
    }
}
