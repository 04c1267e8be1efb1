//! Incremental reconciliation of the route table.
//!
//! # Responsibilities
//! - Route file add/change: recompute that file's definition and upsert it
//! - Route file unlink: drop the path it owns, let a shadowed twin take over
//! - Layout file (any event) or directory event: rescan that subtree
//! - Unlink of a path that still owns routes below it: treated as a directory
//!
//! # Design Decisions
//! - Works on a private copy; the manifest publishes a snapshot afterwards
//! - `owners` tracks every route file, including shadowed duplicates

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::routing::changes::{ChangeKind, PendingChange};
use crate::routing::definition::{RouteDefinition, RouteTable};
use crate::routing::error::RouteResult;
use crate::routing::path::{is_layout_file, is_route_file};
use crate::routing::scanner::{definition_for_file, scan_routes, scan_subtree};

/// Route table plus the reverse index needed to edit it.
#[derive(Debug, Clone)]
pub struct RouteIndex {
    root: PathBuf,
    table: RouteTable,
    /// Route file → canonical path it declares.
    owners: HashMap<PathBuf, String>,
}

impl RouteIndex {
    /// Full scan of `root` (canonical).
    pub fn scan(root: &Path) -> RouteResult<Self> {
        let mut index = Self {
            root: root.to_path_buf(),
            table: RouteTable::new(),
            owners: HashMap::new(),
        };
        for definition in scan_routes(root)? {
            index.upsert(definition);
        }
        Ok(index)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Apply one change. Locations outside the routes root are ignored.
    pub fn apply(&mut self, change: &PendingChange) -> RouteResult<()> {
        let location = change.location.as_path();
        if !location.starts_with(&self.root) {
            return Ok(());
        }
        let name = location.file_name().and_then(|n| n.to_str()).unwrap_or("");

        match change.kind {
            ChangeKind::AddDir | ChangeKind::UnlinkDir => self.replace_subtree(location),
            // A vanished directory whose name looks like a file.
            ChangeKind::Unlink if self.owns_below(location) => self.replace_subtree(location),
            _ if is_layout_file(name) => match location.parent() {
                Some(dir) => self.replace_subtree(dir),
                None => Ok(()),
            },
            _ if is_route_file(name) => match change.kind {
                ChangeKind::Unlink => {
                    self.remove_file(location)?;
                    Ok(())
                }
                _ => self.refresh_file(location),
            },
            _ => Ok(()),
        }
    }

    fn owns_below(&self, dir: &Path) -> bool {
        self.owners
            .keys()
            .any(|file| file != dir && file.starts_with(dir))
    }

    fn upsert(&mut self, definition: RouteDefinition) {
        self.owners
            .insert(definition.file.clone(), definition.path.clone());
        self.table.insert(definition);
    }

    fn refresh_file(&mut self, file: &Path) -> RouteResult<()> {
        match definition_for_file(&self.root, file)? {
            Some(definition) => {
                self.upsert(definition);
                Ok(())
            }
            // Gone again before the batch was drained.
            None => self.remove_file(file).map(|_| ()),
        }
    }

    /// Forget `file`. Returns whether the table changed.
    fn remove_file(&mut self, file: &Path) -> RouteResult<bool> {
        let Some(path) = self.owners.remove(file) else {
            return Ok(false);
        };
        if self.table.remove_if_backed_by(&path, file) {
            self.promote(&path)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Rebuild every route under `dir` from disk.
    fn replace_subtree(&mut self, dir: &Path) -> RouteResult<()> {
        let stale: Vec<PathBuf> = self
            .owners
            .keys()
            .filter(|file| file.starts_with(dir))
            .cloned()
            .collect();

        let mut vacated = BTreeSet::new();
        for file in stale {
            if let Some(path) = self.owners.remove(&file) {
                if self.table.remove_if_backed_by(&path, &file) {
                    vacated.insert(path);
                }
            }
        }

        for definition in scan_subtree(&self.root, dir)? {
            vacated.remove(&definition.path);
            self.upsert(definition);
        }

        for path in vacated {
            self.promote(&path)?;
        }
        Ok(())
    }

    /// Hand a vacated path to the last remaining file declaring it.
    fn promote(&mut self, path: &str) -> RouteResult<()> {
        if self.table.get(path).is_some() {
            return Ok(());
        }
        let candidate = self
            .owners
            .iter()
            .filter(|(_, owned)| owned.as_str() == path)
            .map(|(file, _)| file.clone())
            .max();

        if let Some(file) = candidate {
            match definition_for_file(&self.root, &file)? {
                Some(definition) => {
                    tracing::info!(path, file = %file.display(), "Shadowed route file takes over path");
                    self.upsert(definition);
                }
                None => {
                    self.owners.remove(&file);
                }
            }
        }
        Ok(())
    }
}
