//! Per-file module version counters.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;

/// Monotonic per-location counters. Unknown locations are at version 0.
#[derive(Debug, Clone, Default)]
pub struct ModuleVersions {
    inner: Arc<DashMap<PathBuf, u64>>,
}

impl ModuleVersions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current version of a location.
    pub fn current(&self, location: &Path) -> u64 {
        self.inner.get(location).map(|v| *v.value()).unwrap_or(0)
    }

    /// Bump a location's version, returning the new value.
    pub fn bump(&self, location: &Path) -> u64 {
        let mut entry = self.inner.entry(location.to_path_buf()).or_insert(0);
        *entry += 1;
        *entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_is_per_location() {
        let versions = ModuleVersions::new();
        let a = Path::new("/routes/a.html");
        let b = Path::new("/routes/b.html");

        assert_eq!(versions.current(a), 0);
        assert_eq!(versions.bump(a), 1);
        assert_eq!(versions.bump(a), 2);
        assert_eq!(versions.current(a), 2);
        assert_eq!(versions.current(b), 0);
    }

    #[test]
    fn test_clones_share_state() {
        let versions = ModuleVersions::new();
        let other = versions.clone();
        other.bump(Path::new("x"));
        assert_eq!(versions.current(Path::new("x")), 1);
    }
}
