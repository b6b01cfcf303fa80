//! In-memory asset registry.

use super::{AssetError, AssetResolver, AssetResult};
use std::collections::HashSet;

/// Known references held in memory, for tests and embedding hosts that manage
/// their own asset store.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    known: HashSet<String>,
}

impl MemoryAssets {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a reference.
    pub fn insert(&mut self, reference: impl Into<String>) {
        self.known.insert(reference.into());
    }

    /// Forget a reference. Returns true if it was registered.
    pub fn remove(&mut self, reference: &str) -> bool {
        self.known.remove(reference)
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.known.contains(reference)
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for MemoryAssets {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            known: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl AssetResolver for MemoryAssets {
    fn resolve(&self, reference: &str) -> AssetResult<()> {
        if reference.is_empty() {
            return Err(AssetError::EmptyReference);
        }
        if self.known.contains(reference) {
            Ok(())
        } else {
            Err(AssetError::NotFound(reference.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_assets() {
        let mut assets = MemoryAssets::new();
        assert!(assets.is_empty());
        assets.insert("a.png");
        assert!(assets.resolve("a.png").is_ok());
        assert_eq!(
            assets.resolve("b.png"),
            Err(AssetError::NotFound("b.png".to_string()))
        );
        assert!(assets.remove("a.png"));
        assert!(assets.resolve("a.png").is_err());
    }

    #[test]
    fn test_empty_reference() {
        let assets: MemoryAssets = ["a.png"].into_iter().collect();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets.resolve(""), Err(AssetError::EmptyReference));
    }
}
