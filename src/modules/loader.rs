//! Module loader seam and the in-memory loader.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use thiserror::Error;

use crate::render::Component;

/// An executable component definition resolved from a file location.
#[derive(Clone, Default)]
pub struct ComponentModule {
    /// `None` when the file exists but exports nothing usable.
    pub default: Option<Arc<dyn Component>>,
}

impl ComponentModule {
    pub fn with_default(component: Arc<dyn Component>) -> Self {
        Self {
            default: Some(component),
        }
    }

    pub fn empty() -> Self {
        Self { default: None }
    }
}

impl std::fmt::Debug for ComponentModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentModule")
            .field("default", &self.default.as_ref().map(|c| c.name().to_string()))
            .finish()
    }
}

/// Errors raised while resolving a module.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("module not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read module {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid module {}: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}

/// Resolves a file location to a component definition.
///
/// `bypass_cache` asks the loader to skip any cache of its own; the
/// registry sets it whenever a location's version moved.
pub trait ModuleLoader: Send + Sync {
    fn load<'a>(
        &'a self,
        location: &'a Path,
        bypass_cache: bool,
    ) -> BoxFuture<'a, Result<ComponentModule, LoadError>>;
}

/// Loader over components compiled into the binary.
#[derive(Default)]
pub struct StaticLoader {
    modules: HashMap<PathBuf, ComponentModule>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component as the default export of `location`.
    pub fn with(mut self, location: impl Into<PathBuf>, component: Arc<dyn Component>) -> Self {
        self.modules
            .insert(location.into(), ComponentModule::with_default(component));
        self
    }

    /// Register a location that resolves but exports nothing.
    pub fn with_empty(mut self, location: impl Into<PathBuf>) -> Self {
        self.modules.insert(location.into(), ComponentModule::empty());
        self
    }
}

impl ModuleLoader for StaticLoader {
    fn load<'a>(
        &'a self,
        location: &'a Path,
        _bypass_cache: bool,
    ) -> BoxFuture<'a, Result<ComponentModule, LoadError>> {
        let result = self
            .modules
            .get(location)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(location.to_path_buf()));
        futures_util::future::ready(result).boxed()
    }
}
