//! Route manifest errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouteError {
    /// The routes directory does not exist (or is not a directory).
    #[error("routes directory not found at {}", .0.display())]
    RoutesRootMissing(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A blocking scan task panicked or was cancelled.
    #[error("route scan task failed: {0}")]
    Task(String),
}

impl RouteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RouteError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type RouteResult<T> = Result<T, RouteError>;
