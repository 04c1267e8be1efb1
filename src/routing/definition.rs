//! Route definitions and the published route table.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::protocol::FrameId;

/// A layout file in a route's chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutRef {
    /// Location of the layout file.
    pub file: PathBuf,
    /// Directory scope relative to the routes root (`/`, `/(marketing)`).
    pub scope: String,
}

impl LayoutRef {
    pub fn frame_id(&self) -> FrameId {
        FrameId::layout(self.scope.clone())
    }
}

/// A routable page: canonical path, backing file, inherited layouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition {
    pub path: String,
    pub file: PathBuf,
    /// Root-most first.
    pub layouts: Vec<LayoutRef>,
}

impl RouteDefinition {
    pub fn frame_id(&self) -> FrameId {
        FrameId::route(self.path.clone())
    }

    /// Frame identities and backing files, outermost first, ending at the
    /// route frame.
    pub fn stack(&self) -> Vec<(FrameId, &Path)> {
        self.layouts
            .iter()
            .map(|layout| (layout.frame_id(), layout.file.as_path()))
            .chain(std::iter::once((self.frame_id(), self.file.as_path())))
            .collect()
    }
}

/// Immutable snapshot of every known route, keyed by canonical path.
///
/// Never mutated once published; reconciliation edits a clone and swaps it
/// in.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, Arc<RouteDefinition>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from definitions in discovery order; later duplicates win.
    pub fn from_definitions(definitions: impl IntoIterator<Item = RouteDefinition>) -> Self {
        let mut table = Self::new();
        for definition in definitions {
            table.insert(definition);
        }
        table
    }

    pub fn get(&self, path: &str) -> Option<&Arc<RouteDefinition>> {
        self.routes.get(path)
    }

    /// Insert a definition, replacing any with the same path. Returns the
    /// replaced definition.
    pub fn insert(&mut self, definition: RouteDefinition) -> Option<Arc<RouteDefinition>> {
        if let Some(existing) = self.routes.get(&definition.path) {
            if existing.file != definition.file {
                tracing::warn!(
                    path = %definition.path,
                    previous = %existing.file.display(),
                    winner = %definition.file.display(),
                    "Duplicate route path; last discovered file wins"
                );
            }
        }
        self.routes
            .insert(definition.path.clone(), Arc::new(definition))
    }

    /// Remove `path` regardless of its backing file.
    pub fn remove(&mut self, path: &str) -> Option<Arc<RouteDefinition>> {
        self.routes.remove(path)
    }

    /// Remove `path` only if it is currently backed by `file`.
    pub fn remove_if_backed_by(&mut self, path: &str, file: &Path) -> bool {
        match self.routes.get(path) {
            Some(definition) if definition.file == file => {
                self.routes.remove(path);
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Sorted canonical paths.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<RouteDefinition>> {
        self.routes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(path: &str, file: &str) -> RouteDefinition {
        RouteDefinition {
            path: path.into(),
            file: file.into(),
            layouts: vec![],
        }
    }

    #[test]
    fn test_last_write_wins() {
        let table = RouteTable::from_definitions(vec![
            route("/about", "/r/about.html"),
            route("/about", "/r/about/index.html"),
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("/about").unwrap().file, PathBuf::from("/r/about/index.html"));
    }

    #[test]
    fn test_remove_only_owner() {
        let mut table = RouteTable::from_definitions(vec![route("/a", "/r/a.html")]);
        assert!(!table.remove_if_backed_by("/a", Path::new("/r/a/index.html")));
        assert!(table.get("/a").is_some());
        assert!(table.remove_if_backed_by("/a", Path::new("/r/a.html")));
        assert!(table.is_empty());
    }

    #[test]
    fn test_stack_order() {
        let definition = RouteDefinition {
            path: "/shop/cart".into(),
            file: "/r/shop/cart.html".into(),
            layouts: vec![
                LayoutRef { file: "/r/_layout.html".into(), scope: "/".into() },
                LayoutRef { file: "/r/shop/_layout.html".into(), scope: "/shop".into() },
            ],
        };
        let ids: Vec<String> = definition.stack().into_iter().map(|(id, _)| id.to_string()).collect();
        assert_eq!(ids, vec!["layout:/", "layout:/shop", "route:/shop/cart"]);
    }
}
