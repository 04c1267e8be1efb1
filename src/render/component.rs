//! Component abstraction: a named template consuming props and children.

use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use thiserror::Error;

use crate::render::node::{Node, Props};

/// A failure raised by a component while producing its output.
#[derive(Debug, Clone, Error)]
#[error("component '{component}' failed: {message}")]
pub struct ComponentError {
    pub component: String,
    pub message: String,
}

impl ComponentError {
    pub fn new(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            message: message.into(),
        }
    }
}

/// A composable unit of templated output.
///
/// Layouts and the root template place `children` somewhere in their
/// output; routes receive [`Node::Empty`].
pub trait Component: Send + Sync {
    fn name(&self) -> &str;

    fn render<'a>(
        &'a self,
        props: &'a Props,
        children: Node,
    ) -> BoxFuture<'a, Result<Node, ComponentError>>;
}

type SyncRender = dyn Fn(&Props, Node) -> Result<Node, ComponentError> + Send + Sync;
type AsyncRender = dyn Fn(Props, Node) -> BoxFuture<'static, Result<Node, ComponentError>> + Send + Sync;

enum RenderFn {
    Sync(Box<SyncRender>),
    Async(Box<AsyncRender>),
}

/// Closure-backed component for programmatic registration.
pub struct FnComponent {
    name: String,
    render: RenderFn,
}

impl FnComponent {
    pub fn new<F>(name: impl Into<String>, f: F) -> Arc<dyn Component>
    where
        F: Fn(&Props, Node) -> Result<Node, ComponentError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            name: name.into(),
            render: RenderFn::Sync(Box::new(f)),
        })
    }

    pub fn new_async<F>(name: impl Into<String>, f: F) -> Arc<dyn Component>
    where
        F: Fn(Props, Node) -> BoxFuture<'static, Result<Node, ComponentError>> + Send + Sync + 'static,
    {
        Arc::new(Self {
            name: name.into(),
            render: RenderFn::Async(Box::new(f)),
        })
    }
}

impl Component for FnComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn render<'a>(
        &'a self,
        props: &'a Props,
        children: Node,
    ) -> BoxFuture<'a, Result<Node, ComponentError>> {
        match &self.render {
            RenderFn::Sync(f) => futures_util::future::ready(f(props, children)).boxed(),
            RenderFn::Async(f) => f(props.clone(), children),
        }
    }
}

/// Wrap children in literal markup: `open` + children + `close`.
pub fn wrap(open: &str, children: Node, close: &str) -> Node {
    Node::Fragment(vec![
        Node::markup(open),
        children,
        Node::markup(close),
    ])
}
