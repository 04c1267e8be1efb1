//! Filesystem scanning of the routes root.
//!
//! # Responsibilities
//! - Full scan: every route file under the routes root with its layout chain
//! - Subtree scan: the same for one directory, inheriting ancestor layouts
//! - Single file: recompute one route definition
//!
//! # Design Decisions
//! - Blocking `std::fs`; callers run scans on the blocking pool
//! - Entries are visited in name order so duplicate resolution is stable
//! - At most one layout per directory, picked by extension priority

use std::fs;
use std::path::{Path, PathBuf};

use crate::routing::definition::{LayoutRef, RouteDefinition};
use crate::routing::error::{RouteError, RouteResult};
use crate::routing::path::{
    compute_route_path, is_layout_file, is_route_file, layout_rank, layout_scope,
    sanitize_segment, segments_for,
};

struct Entry {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

fn read_entries(dir: &Path) -> RouteResult<Vec<Entry>> {
    let mut entries = Vec::new();
    let listing = fs::read_dir(dir).map_err(|e| RouteError::io(dir, e))?;

    for entry in listing {
        let entry = entry.map_err(|e| RouteError::io(dir, e))?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::debug!(path = %entry.path().display(), "Skipping non-UTF-8 entry");
            continue;
        };
        let path = entry.path();
        // Follows symlinks; entries that vanished mid-scan are skipped.
        let Ok(metadata) = fs::metadata(&path) else {
            continue;
        };
        if metadata.is_dir() || metadata.is_file() {
            entries.push(Entry {
                name,
                path,
                is_dir: metadata.is_dir(),
            });
        }
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn layout_in(entries: &[Entry]) -> Option<&Entry> {
    entries
        .iter()
        .filter(|e| !e.is_dir)
        .filter_map(|e| layout_rank(&e.name).map(|rank| (rank, e)))
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, e)| e)
}

/// Layout file of a single directory, if any.
pub fn find_layout(dir: &Path) -> RouteResult<Option<PathBuf>> {
    if !dir.is_dir() {
        return Ok(None);
    }
    let entries = read_entries(dir)?;
    Ok(layout_in(&entries).map(|e| e.path.clone()))
}

/// Resolve the routes root to its canonical location.
pub fn canonical_root(routes_root: &Path) -> RouteResult<PathBuf> {
    match fs::canonicalize(routes_root) {
        Ok(path) if path.is_dir() => Ok(path),
        _ => Err(RouteError::RoutesRootMissing(routes_root.to_path_buf())),
    }
}

/// Every route under `root` (canonical), in discovery order.
pub fn scan_routes(root: &Path) -> RouteResult<Vec<RouteDefinition>> {
    if !root.is_dir() {
        return Err(RouteError::RoutesRootMissing(root.to_path_buf()));
    }
    let mut output = Vec::new();
    walk(root, Path::new(""), &[], &[], &mut output)?;
    Ok(output)
}

/// Every route under `dir`, with layouts inherited from `dir`'s ancestors.
pub fn scan_subtree(root: &Path, dir: &Path) -> RouteResult<Vec<RouteDefinition>> {
    let Ok(relative) = dir.strip_prefix(root) else {
        return Ok(Vec::new());
    };
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let parent_layouts = match relative.parent() {
        Some(parent) => layout_chain(root, parent)?,
        None => Vec::new(),
    };
    let segments = segments_for(relative);

    let mut output = Vec::new();
    walk(root, relative, &segments, &parent_layouts, &mut output)?;
    Ok(output)
}

/// Definition for a single route file, or `None` if the location is not a
/// route file under `root` (layouts included) or no longer exists.
pub fn definition_for_file(root: &Path, file: &Path) -> RouteResult<Option<RouteDefinition>> {
    let Ok(relative) = file.strip_prefix(root) else {
        return Ok(None);
    };
    let Some(name) = file.file_name().and_then(|n| n.to_str()) else {
        return Ok(None);
    };
    if !is_route_file(name) || is_layout_file(name) || !file.is_file() {
        return Ok(None);
    }

    let relative_dir = relative.parent().unwrap_or(Path::new(""));
    let segments = segments_for(relative_dir);
    Ok(Some(RouteDefinition {
        path: compute_route_path(&segments, name),
        file: file.to_path_buf(),
        layouts: layout_chain(root, relative_dir)?,
    }))
}

/// Layouts found walking from the routes root down to (and including)
/// `relative_dir`.
pub fn layout_chain(root: &Path, relative_dir: &Path) -> RouteResult<Vec<LayoutRef>> {
    let mut chain = Vec::new();
    let mut current = PathBuf::new();

    let mut levels = vec![PathBuf::new()];
    for component in relative_dir.components() {
        current.push(component);
        levels.push(current.clone());
    }

    for level in levels {
        if let Some(file) = find_layout(&root.join(&level))? {
            chain.push(LayoutRef {
                file,
                scope: layout_scope(&level),
            });
        }
    }
    Ok(chain)
}

fn walk(
    root: &Path,
    relative_dir: &Path,
    segments: &[String],
    layouts: &[LayoutRef],
    output: &mut Vec<RouteDefinition>,
) -> RouteResult<()> {
    let dir = root.join(relative_dir);
    let entries = read_entries(&dir)?;

    let mut chain = layouts.to_vec();
    if let Some(layout) = layout_in(&entries) {
        chain.push(LayoutRef {
            file: layout.path.clone(),
            scope: layout_scope(relative_dir),
        });
    }

    for entry in &entries {
        if entry.is_dir {
            let mut next = segments.to_vec();
            if let Some(segment) = sanitize_segment(&entry.name) {
                next.push(segment.to_string());
            }
            walk(root, &relative_dir.join(&entry.name), &next, &chain, output)?;
        } else if is_route_file(&entry.name) && !is_layout_file(&entry.name) {
            output.push(RouteDefinition {
                path: compute_route_path(segments, &entry.name),
                file: entry.path.clone(),
                layouts: chain.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<p>x</p>").unwrap();
    }

    fn fixture() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = canonical_root(dir.path()).unwrap();
        touch(&root, "(marketing)/_layout.html");
        touch(&root, "(marketing)/index.html");
        touch(&root, "(marketing)/about.html");
        touch(&root, "shop/index.html");
        touch(&root, "shop/styles.css");
        (dir, root)
    }

    #[test]
    fn test_scan_marketing_fixture() {
        let (_guard, root) = fixture();
        let mut routes = scan_routes(&root).unwrap();
        routes.sort_by(|a, b| a.path.cmp(&b.path));

        let paths: Vec<&str> = routes.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/", "/about", "/shop"]);

        let marketing = root.join("(marketing)/_layout.html");
        assert_eq!(routes[0].layouts, vec![LayoutRef { file: marketing.clone(), scope: "/(marketing)".into() }]);
        assert_eq!(routes[1].layouts[0].file, marketing);
        assert!(routes[2].layouts.is_empty());
    }

    #[test]
    fn test_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("routes");
        assert!(matches!(canonical_root(&missing), Err(RouteError::RoutesRootMissing(_))));
        assert!(matches!(scan_routes(&missing), Err(RouteError::RoutesRootMissing(_))));
    }

    #[test]
    fn test_layout_priority_and_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let root = canonical_root(dir.path()).unwrap();
        touch(&root, "_layout.htm");
        touch(&root, "_layout.html");
        touch(&root, "a/b/_layout.html");
        touch(&root, "a/b/c.html");

        let definition = definition_for_file(&root, &root.join("a/b/c.html")).unwrap().unwrap();
        assert_eq!(definition.path, "/a/b/c");
        let files: Vec<PathBuf> = definition.layouts.iter().map(|l| l.file.clone()).collect();
        assert_eq!(files, vec![root.join("_layout.html"), root.join("a/b/_layout.html")]);
        assert_eq!(definition.layouts[1].scope, "/a/b");
    }

    #[test]
    fn test_subtree_inherits_ancestor_layouts() {
        let dir = tempfile::tempdir().unwrap();
        let root = canonical_root(dir.path()).unwrap();
        touch(&root, "_layout.html");
        touch(&root, "(shop)/_layout.html");
        touch(&root, "(shop)/cart/index.html");
        touch(&root, "other.html");

        let routes = scan_subtree(&root, &root.join("(shop)/cart")).unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].path, "/cart");
        let scopes: Vec<&str> = routes[0].layouts.iter().map(|l| l.scope.as_str()).collect();
        assert_eq!(scopes, vec!["/", "/(shop)"]);
    }

    #[test]
    fn test_definition_for_non_routes() {
        let (_guard, root) = fixture();
        assert!(definition_for_file(&root, &root.join("(marketing)/_layout.html")).unwrap().is_none());
        assert!(definition_for_file(&root, &root.join("shop/styles.css")).unwrap().is_none());
        assert!(definition_for_file(&root, &root.join("shop/gone.html")).unwrap().is_none());
        assert!(definition_for_file(&root, Path::new("/elsewhere/x.html")).unwrap().is_none());
    }
}
