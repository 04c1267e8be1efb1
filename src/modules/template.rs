//! File-backed template components.
//!
//! A template file is plain markup with two placeholders:
//! - `{{ children }}`: where the wrapped content goes (layouts, root)
//! - `{{ path }}`: the canonical route path, escaped
//!
//! A file holding only whitespace has no default export.

use std::path::Path;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};

use crate::modules::loader::{ComponentModule, LoadError, ModuleLoader};
use crate::render::{Component, ComponentError, Node, Props};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Markup(String),
    Children,
    RoutePath,
}

/// A parsed template file.
#[derive(Debug)]
pub struct TemplateComponent {
    name: String,
    parts: Vec<Part>,
}

impl TemplateComponent {
    pub fn parse(name: impl Into<String>, source: &str) -> Self {
        let mut parts = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            let Some(len) = rest[start + 2..].find("}}") else {
                break;
            };
            let token = rest[start + 2..start + 2 + len].trim();
            let part = match token {
                "children" => Some(Part::Children),
                "path" => Some(Part::RoutePath),
                _ => None,
            };

            let end = start + 2 + len + 2;
            if start > 0 {
                parts.push(Part::Markup(rest[..start].to_string()));
            }
            // Unknown placeholders pass through verbatim.
            parts.push(part.unwrap_or_else(|| Part::Markup(rest[start..end].to_string())));
            rest = &rest[end..];
        }

        if !rest.is_empty() {
            parts.push(Part::Markup(rest.to_string()));
        }

        Self {
            name: name.into(),
            parts,
        }
    }

    /// True when the template has a children slot.
    pub fn has_slot(&self) -> bool {
        self.parts.contains(&Part::Children)
    }
}

impl Component for TemplateComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn render<'a>(
        &'a self,
        props: &'a Props,
        children: Node,
    ) -> BoxFuture<'a, Result<Node, ComponentError>> {
        let mut children = Some(children);
        let nodes = self
            .parts
            .iter()
            .map(|part| match part {
                Part::Markup(m) => Node::markup(m.as_str()),
                // Only the first slot receives the children.
                Part::Children => children.take().unwrap_or(Node::Empty),
                Part::RoutePath => Node::text(props.route_path.as_str()),
            })
            .collect();
        futures_util::future::ready(Ok(Node::Fragment(nodes))).boxed()
    }
}

/// Loads template components from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateLoader;

impl TemplateLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ModuleLoader for TemplateLoader {
    fn load<'a>(
        &'a self,
        location: &'a Path,
        _bypass_cache: bool,
    ) -> BoxFuture<'a, Result<ComponentModule, LoadError>> {
        async move {
            let source = match tokio::fs::read_to_string(location).await {
                Ok(source) => source,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(LoadError::NotFound(location.to_path_buf()));
                }
                Err(source) => {
                    return Err(LoadError::Io {
                        path: location.to_path_buf(),
                        source,
                    });
                }
            };

            if source.trim().is_empty() {
                return Ok(ComponentModule::empty());
            }

            let name = location
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("template");
            let component: Arc<dyn Component> = Arc::new(TemplateComponent::parse(name, &source));
            Ok(ComponentModule::with_default(component))
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::html::render_resolved;

    #[test]
    fn test_parse_parts() {
        let t = TemplateComponent::parse("layout", "<main>{{ children }}</main><p>{{path}}</p>{{ other }}");
        assert!(t.has_slot());
        assert_eq!(
            t.parts,
            vec![
                Part::Markup("<main>".into()),
                Part::Children,
                Part::Markup("</main><p>".into()),
                Part::RoutePath,
                Part::Markup("</p>".into()),
                Part::Markup("{{ other }}".into()),
            ]
        );
    }

    #[test]
    fn test_unterminated_placeholder_is_markup() {
        let t = TemplateComponent::parse("x", "<p>{{ children</p>");
        assert!(!t.has_slot());
        assert_eq!(t.parts, vec![Part::Markup("<p>{{ children</p>".into())]);
    }

    #[tokio::test]
    async fn test_render_fills_first_slot_only() {
        let t = TemplateComponent::parse("x", "[{{ children }}|{{ children }}] {{ path }}");
        let props = Props::for_route("/a<b");
        let node = t.render(&props, Node::markup("<i>c</i>")).await.unwrap();
        let html = render_resolved(node).await.unwrap();
        assert_eq!(html, "[<i>c</i>|] /a&lt;b");
    }

    #[tokio::test]
    async fn test_loader_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let full = dir.path().join("about.html");
        let blank = dir.path().join("blank.html");
        std::fs::write(&full, "<h2>About</h2>").unwrap();
        std::fs::write(&blank, "  \n").unwrap();

        let loader = TemplateLoader::new();
        let module = loader.load(&full, false).await.unwrap();
        assert_eq!(module.default.unwrap().name(), "about.html");

        let module = loader.load(&blank, false).await.unwrap();
        assert!(module.default.is_none());

        let err = loader.load(&dir.path().join("nope.html"), true).await.unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }
}
