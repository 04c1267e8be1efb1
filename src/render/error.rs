//! Render failures surfaced before a response is committed.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::modules::LoadError;
use crate::render::component::ComponentError;
use crate::routing::RouteError;

/// Which part of the composition a module plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleRole {
    Root,
    Layout,
    Route,
}

impl fmt::Display for ModuleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleRole::Root => write!(f, "root template"),
            ModuleRole::Layout => write!(f, "layout"),
            ModuleRole::Route => write!(f, "route"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{role} module {} has no default export", path.display())]
    ComponentExportMissing { role: ModuleRole, path: PathBuf },

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Component(#[from] ComponentError),

    /// The shell was not ready within the bound, in seconds.
    #[error("render timed out after {0}s")]
    Timeout(u64),

    #[error(transparent)]
    Route(#[from] RouteError),
}
