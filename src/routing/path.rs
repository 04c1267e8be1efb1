//! Path and file-name rules for file-system routes.
//!
//! # Responsibilities
//! - Classify directory entries (route file, layout file, group directory)
//! - Turn directory segments + file name into a canonical route path
//! - Normalize request paths into the same canonical form
//!
//! # Design Decisions
//! - Pure functions over strings; no filesystem access here
//! - Group directories are `(name)` and contribute no path segment
//! - `index` maps to its parent's path

use std::path::{Component, Path};

/// Route file extensions, in layout lookup priority order.
pub const ROUTE_EXTENSIONS: &[&str] = &["html", "htm"];

/// File stem that marks a layout.
pub const LAYOUT_STEM: &str = "_layout";

const INDEX_STEM: &str = "index";

fn split_extension(file_name: &str) -> Option<(&str, &str)> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some((stem, ext))
}

/// Extension priority of a routable file, lower is preferred.
fn extension_rank(file_name: &str) -> Option<usize> {
    let (_, ext) = split_extension(file_name)?;
    ROUTE_EXTENSIONS.iter().position(|known| *known == ext)
}

/// True for any file the manifest cares about (routes and layouts).
pub fn is_route_file(file_name: &str) -> bool {
    extension_rank(file_name).is_some()
}

/// True for `_layout.<ext>` with a known extension.
pub fn is_layout_file(file_name: &str) -> bool {
    layout_rank(file_name).is_some()
}

/// Priority of a layout file name, or `None` if it is not a layout.
pub fn layout_rank(file_name: &str) -> Option<usize> {
    let (stem, _) = split_extension(file_name)?;
    if stem != LAYOUT_STEM {
        return None;
    }
    extension_rank(file_name)
}

/// Strip a known route extension from a file name.
pub fn strip_extension(file_name: &str) -> &str {
    match split_extension(file_name) {
        Some((stem, ext)) if ROUTE_EXTENSIONS.contains(&ext) => stem,
        _ => file_name,
    }
}

/// True when a directory name is fully wrapped in the group marker.
pub fn is_group_segment(name: &str) -> bool {
    name.len() >= 2 && name.starts_with('(') && name.ends_with(')')
}

/// Path segment contributed by a directory, `None` for groups.
pub fn sanitize_segment(name: &str) -> Option<&str> {
    if is_group_segment(name) {
        None
    } else {
        Some(name)
    }
}

/// Canonical path for a route file given its (already sanitized) parent
/// segments.
pub fn compute_route_path<S: AsRef<str>>(segments: &[S], file_name: &str) -> String {
    let base = strip_extension(file_name);
    let mut path = String::new();
    let tail = (base != INDEX_STEM).then_some(base);

    for segment in segments.iter().map(|s| s.as_ref()).chain(tail) {
        let segment = segment.trim_matches('/');
        if segment.is_empty() {
            continue;
        }
        path.push('/');
        path.push_str(segment);
    }

    if path.is_empty() {
        path.push('/');
    }
    path
}

/// Normalize a request path: drop query and fragment, collapse trailing
/// slashes (root stays `/`), ensure a leading slash.
pub fn normalize_path(pathname: &str) -> String {
    let end = pathname.find(['?', '#']).unwrap_or(pathname.len());
    let trimmed = pathname[..end].trim_end_matches('/');

    if trimmed.is_empty() {
        return "/".to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Sanitized segments for a directory relative to the routes root.
pub fn segments_for(relative_dir: &Path) -> Vec<String> {
    relative_dir
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => name.to_str(),
            _ => None,
        })
        .filter_map(sanitize_segment)
        .map(str::to_string)
        .collect()
}

/// Frame scope for a layout living in `relative_dir` (relative to the
/// routes root). Group names are kept: the scope identifies a directory,
/// not a URL.
pub fn layout_scope(relative_dir: &Path) -> String {
    let parts: Vec<&str> = relative_dir
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => name.to_str(),
            _ => None,
        })
        .collect();
    format!("/{}", parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_file_classification() {
        assert!(is_route_file("about.html"));
        assert!(is_route_file("index.htm"));
        assert!(!is_route_file("styles.css"));
        assert!(!is_route_file(".html"));
        assert!(is_layout_file("_layout.html"));
        assert!(is_layout_file("_layout.htm"));
        assert!(!is_layout_file("_layout.css"));
        assert!(!is_layout_file("layout.html"));
        assert!(layout_rank("_layout.html") < layout_rank("_layout.htm"));
    }

    #[test]
    fn test_group_segments() {
        assert_eq!(sanitize_segment("(marketing)"), None);
        assert_eq!(sanitize_segment("shop"), Some("shop"));
        assert_eq!(sanitize_segment("(open"), Some("(open"));
        assert_eq!(sanitize_segment("()"), None);
    }

    #[test]
    fn test_compute_route_path() {
        let none: [&str; 0] = [];
        assert_eq!(compute_route_path(&none, "index.html"), "/");
        assert_eq!(compute_route_path(&none, "about.html"), "/about");
        assert_eq!(compute_route_path(&["shop"], "index.html"), "/shop");
        assert_eq!(compute_route_path(&["shop", "cart"], "items.htm"), "/shop/cart/items");
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/about/"), "/about");
        assert_eq!(normalize_path("/about/?x=1"), "/about");
        assert_eq!(normalize_path("/about"), "/about");
        assert_eq!(normalize_path("/about//"), "/about");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("///"), "/");
        assert_eq!(normalize_path("/?x=1"), "/");
        assert_eq!(normalize_path("about#top"), "/about");
    }

    #[test]
    fn test_segments_and_scope() {
        let dir = PathBuf::from("(marketing)/blog");
        assert_eq!(segments_for(&dir), vec!["blog".to_string()]);
        assert_eq!(layout_scope(&dir), "/(marketing)/blog");
        assert_eq!(layout_scope(Path::new("")), "/");
    }
}
