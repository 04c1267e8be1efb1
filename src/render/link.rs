//! Anchor helper for in-place navigation.

use crate::protocol::{LINK_ATTR, REPLACE_ATTR};
use crate::render::node::{escape_attr, Node};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkOptions {
    /// Plain anchor; the client router ignores it.
    pub native: bool,
    /// Replace the current history entry instead of pushing.
    pub replace: bool,
}

/// `<a href="to" data-stack-link="true">children</a>`.
pub fn link(to: &str, options: LinkOptions, children: Node) -> Node {
    let mut open = String::from("<a href=\"");
    escape_attr(to, &mut open);
    open.push('"');
    if !options.native {
        open.push_str(&format!(" {}=\"true\"", LINK_ATTR));
        if options.replace {
            open.push_str(&format!(" {}=\"true\"", REPLACE_ATTR));
        }
    }
    open.push('>');

    Node::Fragment(vec![Node::Markup(open), children, Node::markup("</a>")])
}
