//! Renderable node tree.

use std::fmt;

use futures_util::future::BoxFuture;

use crate::protocol::FrameId;
use crate::render::component::ComponentError;

/// Properties handed to every component in a render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Props {
    /// Canonical path of the route being rendered.
    pub route_path: String,
}

impl Props {
    pub fn for_route(route_path: impl Into<String>) -> Self {
        Self {
            route_path: route_path.into(),
        }
    }
}

/// Output of a component: a tree of markup, text, boundaries and
/// asynchronous holes.
pub enum Node {
    Empty,
    /// Escaped on output.
    Text(String),
    /// Trusted markup, written verbatim.
    Markup(String),
    Fragment(Vec<Node>),
    /// A replaceable stack frame.
    Boundary(Boundary),
    /// Position of a frame's child boundary in stack-only payloads.
    Outlet,
    /// Content that resolves after the shell has been sent.
    Deferred(Deferred),
}

pub struct Boundary {
    pub id: FrameId,
    pub version: u64,
    pub child: Box<Node>,
}

pub struct Deferred {
    pub fallback: Box<Node>,
    pub content: BoxFuture<'static, Result<Node, ComponentError>>,
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn markup(markup: impl Into<String>) -> Self {
        Node::Markup(markup.into())
    }

    pub fn boundary(id: FrameId, version: u64, child: Node) -> Self {
        Node::Boundary(Boundary {
            id,
            version,
            child: Box::new(child),
        })
    }

    pub fn deferred(
        fallback: Node,
        content: BoxFuture<'static, Result<Node, ComponentError>>,
    ) -> Self {
        Node::Deferred(Deferred {
            fallback: Box::new(fallback),
            content,
        })
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Empty => write!(f, "Empty"),
            Node::Text(t) => f.debug_tuple("Text").field(t).finish(),
            Node::Markup(m) => f.debug_tuple("Markup").field(m).finish(),
            Node::Fragment(children) => f.debug_tuple("Fragment").field(children).finish(),
            Node::Boundary(b) => f
                .debug_struct("Boundary")
                .field("id", &b.id.to_string())
                .field("version", &b.version)
                .field("child", &b.child)
                .finish(),
            Node::Outlet => write!(f, "Outlet"),
            Node::Deferred(d) => f.debug_struct("Deferred").field("fallback", &d.fallback).finish_non_exhaustive(),
        }
    }
}

/// Escape text content.
pub fn escape_text(raw: &str, out: &mut String) {
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Escape a double-quoted attribute value.
pub fn escape_attr(raw: &str, out: &mut String) {
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
