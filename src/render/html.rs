//! HTML serialization of node trees.
//!
//! # Responsibilities
//! - Serialize the synchronously available part of a tree (the shell)
//! - Tag boundaries with their frame identity and version
//! - Park deferred content behind numbered placeholders
//! - Resolve every deferred node up front for stack payloads

use futures_util::future::{BoxFuture, FutureExt};

use crate::protocol::{BOUNDARY_ID_ATTR, BOUNDARY_VERSION_ATTR, OUTLET_ATTR};
use crate::render::component::ComponentError;
use crate::render::node::{escape_attr, escape_text, Node};

/// Attribute on the placeholder holding a deferred node's fallback.
pub const PENDING_ATTR: &str = "data-stack-pending";

/// Attribute on the template carrying resolved deferred content.
pub const RESOLVE_ATTR: &str = "data-stack-resolve";

/// A deferred node waiting for its content, keyed by placeholder id.
pub type PendingContent = (usize, BoxFuture<'static, Result<Node, ComponentError>>);

/// Serializes nodes, collecting deferred content for later.
#[derive(Default)]
pub struct ShellWriter {
    out: String,
    pending: Vec<PendingContent>,
    next_id: usize,
}

impl ShellWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue numbering placeholders from `next_id`.
    pub fn starting_at(next_id: usize) -> Self {
        Self {
            next_id,
            ..Self::default()
        }
    }

    pub fn push_markup(&mut self, markup: &str) {
        self.out.push_str(markup);
    }

    /// Insert markup before the last `</body>`, or append it when there is none.
    pub fn insert_before_body_close(&mut self, markup: &str) {
        match self.out.rfind("</body>") {
            Some(at) => self.out.insert_str(at, markup),
            None => self.out.push_str(markup),
        }
    }

    pub fn write(&mut self, node: Node) {
        match node {
            Node::Empty => {}
            Node::Text(text) => escape_text(&text, &mut self.out),
            Node::Markup(markup) => self.out.push_str(&markup),
            Node::Fragment(children) => {
                for child in children {
                    self.write(child);
                }
            }
            Node::Boundary(boundary) => {
                open_boundary(&mut self.out, &boundary.id.to_string(), boundary.version);
                self.write(*boundary.child);
                self.out.push_str("</div>");
            }
            Node::Outlet => {
                self.out.push_str("<div ");
                self.out.push_str(OUTLET_ATTR);
                self.out.push_str("></div>");
            }
            Node::Deferred(deferred) => {
                let id = self.next_id;
                self.next_id += 1;
                self.out.push_str(&format!(
                    "<div {}=\"{}\" style=\"display:contents\">",
                    PENDING_ATTR, id
                ));
                self.write(*deferred.fallback);
                self.out.push_str("</div>");
                self.pending.push((id, deferred.content));
            }
        }
    }

    /// Finish: serialized markup, parked deferred content, next free id.
    pub fn finish(self) -> (String, Vec<PendingContent>, usize) {
        (self.out, self.pending, self.next_id)
    }
}

fn open_boundary(out: &mut String, id: &str, version: u64) {
    out.push_str("<div ");
    out.push_str(BOUNDARY_ID_ATTR);
    out.push_str("=\"");
    escape_attr(id, out);
    out.push_str("\" ");
    out.push_str(BOUNDARY_VERSION_ATTR);
    out.push_str(&format!("=\"{}\" style=\"display:contents\">", version));
}

/// Chunk that moves resolved content into placeholder `id`.
pub fn resolved_chunk(id: usize, html: &str) -> String {
    format!(
        "<template {resolve}=\"{id}\">{html}</template>\
         <script>(function(){{var t=document.querySelector('template[{resolve}=\"{id}\"]'),\
         p=document.querySelector('[{pending}=\"{id}\"]');\
         if(t&&p){{p.replaceWith(t.content);}}if(t){{t.remove();}}}})();</script>",
        resolve = RESOLVE_ATTR,
        pending = PENDING_ATTR,
        id = id,
        html = html,
    )
}

/// Await every deferred node in the tree, replacing it with its content.
pub fn resolve(node: Node) -> BoxFuture<'static, Result<Node, ComponentError>> {
    async move {
        match node {
            Node::Deferred(deferred) => {
                let content = deferred.content.await?;
                resolve(content).await
            }
            Node::Fragment(children) => {
                let mut resolved = Vec::with_capacity(children.len());
                for child in children {
                    resolved.push(resolve(child).await?);
                }
                Ok(Node::Fragment(resolved))
            }
            Node::Boundary(mut boundary) => {
                let child = resolve(*boundary.child).await?;
                boundary.child = Box::new(child);
                Ok(Node::Boundary(boundary))
            }
            other => Ok(other),
        }
    }
    .boxed()
}

/// Serialize a tree with all deferred content resolved inline.
pub async fn render_resolved(node: Node) -> Result<String, ComponentError> {
    let node = resolve(node).await?;
    let mut writer = ShellWriter::new();
    writer.write(node);
    let (html, _, _) = writer.finish();
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::FrameId;

    #[test]
    fn test_boundary_and_outlet_markup() {
        let mut writer = ShellWriter::new();
        writer.write(Node::boundary(
            FrameId::layout("/(marketing)"),
            3,
            Node::Fragment(vec![Node::markup("<section>"), Node::Outlet, Node::markup("</section>")]),
        ));
        let (html, pending, _) = writer.finish();
        assert_eq!(
            html,
            "<div data-stack-id=\"layout:/(marketing)\" data-stack-version=\"3\" style=\"display:contents\">\
             <section><div data-stack-outlet></div></section></div>"
        );
        assert!(pending.is_empty());
    }

    #[test]
    fn test_insert_before_body_close() {
        let mut writer = ShellWriter::new();
        writer.push_markup("<body><p>a</p></body></html>");
        writer.insert_before_body_close("<script></script>");
        assert_eq!(writer.finish().0, "<body><p>a</p><script></script></body></html>");

        let mut bare = ShellWriter::new();
        bare.push_markup("<p>a</p>");
        bare.insert_before_body_close("<script></script>");
        assert_eq!(bare.finish().0, "<p>a</p><script></script>");
    }

    #[tokio::test]
    async fn test_deferred_goes_to_pending() {
        let mut writer = ShellWriter::starting_at(4);
        writer.write(Node::Fragment(vec![
            Node::text("a"),
            Node::deferred(Node::text("loading"), async { Ok(Node::text("done")) }.boxed()),
        ]));
        let (html, pending, next) = writer.finish();
        assert_eq!(
            html,
            "a<div data-stack-pending=\"4\" style=\"display:contents\">loading</div>"
        );
        assert_eq!(next, 5);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].0, 4);
    }

    #[tokio::test]
    async fn test_render_resolved_inlines_nested_deferred() {
        let inner = Node::deferred(Node::Empty, async { Ok(Node::text("deep")) }.boxed());
        let outer = Node::deferred(Node::Empty, async move { Ok(Node::Fragment(vec![Node::text("["), inner, Node::text("]")])) }.boxed());
        assert_eq!(render_resolved(outer).await.unwrap(), "[deep]");
    }

    #[tokio::test]
    async fn test_render_resolved_propagates_errors() {
        let node = Node::deferred(
            Node::Empty,
            async { Err(ComponentError::new("reviews", "down")) }.boxed(),
        );
        assert!(render_resolved(node).await.is_err());
    }

    #[test]
    fn test_resolved_chunk_targets_placeholder() {
        let chunk = resolved_chunk(2, "<p>x</p>");
        assert!(chunk.starts_with("<template data-stack-resolve=\"2\"><p>x</p></template><script>"));
        assert!(chunk.contains("[data-stack-pending=\"2\"]"));
    }
}
