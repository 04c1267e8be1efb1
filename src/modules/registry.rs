//! Version-keyed module cache.
//!
//! # Responsibilities
//! - Cache loaded component definitions keyed by `(location, version)`
//! - Invalidate a location: bump its version and evict older entries
//! - Always resolve the current version through the loader
//!
//! # Design Decisions
//! - Production never bumps versions, so every module loads once
//! - A location whose version moved is loaded with `bypass_cache`

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;

use crate::modules::loader::{ComponentModule, LoadError, ModuleLoader};
use crate::modules::versions::ModuleVersions;
use crate::observability::metrics;

/// A module resolved at a specific version.
#[derive(Debug, Clone)]
pub struct LoadedModule {
    pub module: ComponentModule,
    pub version: u64,
}

/// Shared registry handle; clones see the same cache and versions.
#[derive(Clone)]
pub struct ModuleRegistry {
    loader: Arc<dyn ModuleLoader>,
    versions: ModuleVersions,
    cache: Arc<DashMap<(PathBuf, u64), ComponentModule>>,
}

impl ModuleRegistry {
    pub fn new(loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            loader,
            versions: ModuleVersions::new(),
            cache: Arc::new(DashMap::new()),
        }
    }

    pub fn versions(&self) -> &ModuleVersions {
        &self.versions
    }

    /// Current version of a location.
    pub fn current_version(&self, location: &Path) -> u64 {
        self.versions.current(location)
    }

    /// Bump the version of `location` and drop every cached definition for
    /// it. Returns the new version.
    pub fn invalidate(&self, location: &Path) -> u64 {
        let version = self.versions.bump(location);
        self.cache.retain(|(path, _), _| path.as_path() != location);
        tracing::debug!(location = %location.display(), version, "Module invalidated");
        version
    }

    /// Resolve the current version of `location`.
    pub async fn load(&self, location: &Path) -> Result<LoadedModule, LoadError> {
        let version = self.versions.current(location);
        let key = (location.to_path_buf(), version);

        if let Some(module) = self.cache.get(&key) {
            metrics::record_module_load("hit");
            return Ok(LoadedModule {
                module: module.value().clone(),
                version,
            });
        }

        let start = Instant::now();
        let module = self.loader.load(location, version > 0).await?;
        metrics::record_module_load("miss");
        tracing::debug!(
            location = %location.display(),
            version,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Module loaded"
        );

        // Invalidated mid-load: the key is already stale.
        if self.versions.current(location) == version {
            self.cache.insert(key, module.clone());
        }

        Ok(LoadedModule { module, version })
    }
}
