//! Filesystem watcher feeding the route manifest in development.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;

use crate::routing::path::is_route_file;
use crate::routing::scanner::canonical_root;
use crate::routing::{ChangeKind, RouteError, RouteManifest};

#[derive(Debug, Error)]
pub enum WatchError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("filesystem watcher failed: {0}")]
    Notify(#[from] notify::Error),
}

/// Watches the routes root (recursively) and the root template.
pub struct RouteWatcher {
    manifest: Arc<RouteManifest>,
    routes_root: PathBuf,
    root_template: PathBuf,
}

impl RouteWatcher {
    pub fn new(manifest: Arc<RouteManifest>) -> Result<Self, WatchError> {
        let routes_root = canonical_root(manifest.routes_root())?;
        let root_template = manifest.root_template().to_path_buf();
        Ok(Self {
            manifest,
            routes_root,
            root_template,
        })
    }

    /// Start watching. Events are delivered until the returned watcher is
    /// dropped.
    pub fn run(self) -> Result<RecommendedWatcher, WatchError> {
        let routes_root = self.routes_root.clone();
        let root_template = self.root_template.clone();
        let manifest = Arc::clone(&self.manifest);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for (location, kind) in classify(&event) {
                        if !is_relevant(&location, kind, &routes_root, &root_template) {
                            continue;
                        }
                        tracing::debug!(location = %location.display(), %kind, "File change detected");
                        manifest.notify_file_change(location, kind);
                    }
                }
                Err(e) => tracing::error!(error = %e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.routes_root, RecursiveMode::Recursive)?;
        match self.root_template.parent() {
            Some(parent) if !parent.starts_with(&self.routes_root) && parent.is_dir() => {
                watcher.watch(parent, RecursiveMode::NonRecursive)?;
            }
            _ => {}
        }

        tracing::info!(
            routes_root = %self.routes_root.display(),
            root_template = %self.root_template.display(),
            "Route watcher started"
        );
        Ok(watcher)
    }
}

fn is_relevant(location: &Path, kind: ChangeKind, routes_root: &Path, root_template: &Path) -> bool {
    if location == root_template {
        return true;
    }
    if !location.starts_with(routes_root) || location == routes_root {
        return false;
    }
    match kind {
        // A removed directory may carry an extension-like name.
        ChangeKind::AddDir | ChangeKind::UnlinkDir | ChangeKind::Unlink => true,
        _ => location
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(is_route_file),
    }
}

/// Map a notify event to manifest notifications.
pub fn classify(event: &Event) -> Vec<(PathBuf, ChangeKind)> {
    match &event.kind {
        EventKind::Create(CreateKind::Folder) => with_kind(&event.paths, ChangeKind::AddDir),
        EventKind::Create(_) => event.paths.iter().map(|p| appeared(p)).collect(),

        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            event.paths.iter().map(|p| disappeared(p)).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            event.paths.iter().map(|p| appeared(p)).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => match event.paths.as_slice() {
            [from, to] => vec![disappeared(from), appeared(to)],
            _ => Vec::new(),
        },
        EventKind::Modify(ModifyKind::Name(_)) => event
            .paths
            .iter()
            .map(|p| if p.exists() { appeared(p) } else { disappeared(p) })
            .collect(),
        EventKind::Modify(_) => event
            .paths
            .iter()
            .filter(|p| !p.is_dir())
            .map(|p| (p.clone(), ChangeKind::Change))
            .collect(),

        EventKind::Remove(RemoveKind::Folder) => with_kind(&event.paths, ChangeKind::UnlinkDir),
        EventKind::Remove(RemoveKind::File) => with_kind(&event.paths, ChangeKind::Unlink),
        EventKind::Remove(_) => event.paths.iter().map(|p| disappeared(p)).collect(),

        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}

fn with_kind(paths: &[PathBuf], kind: ChangeKind) -> Vec<(PathBuf, ChangeKind)> {
    paths.iter().map(|p| (p.clone(), kind)).collect()
}

fn appeared(path: &Path) -> (PathBuf, ChangeKind) {
    let kind = if path.is_dir() {
        ChangeKind::AddDir
    } else {
        ChangeKind::Add
    };
    (path.to_path_buf(), kind)
}

// The path is gone, so only its name says what it was.
fn disappeared(path: &Path) -> (PathBuf, ChangeKind) {
    let kind = if path.extension().is_some() {
        ChangeKind::Unlink
    } else {
        ChangeKind::UnlinkDir
    };
    (path.to_path_buf(), kind)
}
