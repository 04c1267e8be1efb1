//! Composition of root, layouts and route into a streamed document or a
//! stack diff.
//!
//! # Data Flow
//! ```text
//! RouteDefinition
//!     → load root + layouts + route (registry, current versions)
//!     → full:  root(boundary(layout0(boundary(... boundary(route)))))
//!              → ShellWriter (+ router script tag)
//!              → HtmlDocument (shell, then deferred chunks)
//!     → stack: per position, compare (id, version) with the previous stack
//!              → retain, or fresh html with an outlet for the child frame
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::modules::ModuleRegistry;
use crate::protocol::{FrameDescriptor, FrameId, StackPayload};
use crate::render::component::Component;
use crate::render::error::{ModuleRole, RenderError};
use crate::render::html::{render_resolved, ShellWriter};
use crate::render::node::{Node, Props};
use crate::render::script::script_tag;
use crate::render::stream::HtmlDocument;
use crate::routing::RouteDefinition;

const DOCTYPE: &str = "<!DOCTYPE html>";

/// Caller-supplied render mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Produce a stack diff instead of a document.
    pub stack_only: bool,
    /// Route the client is navigating away from.
    pub current_route_path: Option<String>,
    /// Versions of the client's live frames, outermost first.
    pub client_versions: Option<Vec<u64>>,
}

impl RenderOptions {
    pub fn document() -> Self {
        Self::default()
    }

    pub fn stack(current_route_path: Option<String>) -> Self {
        Self {
            stack_only: true,
            current_route_path,
            client_versions: None,
        }
    }
}

#[derive(Debug)]
pub enum RenderedOutput {
    Document(HtmlDocument),
    Stack(StackPayload),
}

struct Frame {
    id: FrameId,
    version: u64,
    component: Arc<dyn Component>,
}

#[derive(Clone)]
pub struct RenderPipeline {
    registry: ModuleRegistry,
    root_template: PathBuf,
    shell_timeout: Duration,
}

impl RenderPipeline {
    pub fn new(
        registry: ModuleRegistry,
        root_template: impl Into<PathBuf>,
        shell_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            root_template: root_template.into(),
            shell_timeout,
        }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn root_template(&self) -> &Path {
        &self.root_template
    }

    /// Render `route`; `previous` is the definition behind the client's
    /// current route hint, if it still exists.
    pub async fn render(
        &self,
        route: &RouteDefinition,
        previous: Option<&RouteDefinition>,
        options: &RenderOptions,
    ) -> Result<RenderedOutput, RenderError> {
        if options.stack_only {
            self.render_stack(route, previous, options.client_versions.as_deref())
                .await
                .map(RenderedOutput::Stack)
        } else {
            self.render_document(route).await.map(RenderedOutput::Document)
        }
    }

    /// Full document. Returns once the shell is ready; deferred content
    /// streams afterwards under the same deadline.
    pub async fn render_document(&self, route: &RouteDefinition) -> Result<HtmlDocument, RenderError> {
        let deadline = Instant::now() + self.shell_timeout;
        match tokio::time::timeout_at(deadline, self.compose_shell(route)).await {
            Ok(Ok(writer)) => Ok(HtmlDocument::new(writer, deadline)),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(RenderError::Timeout(self.shell_timeout.as_secs())),
        }
    }

    /// Stack diff against `previous`. Retained frames carry no html.
    pub async fn render_stack(
        &self,
        route: &RouteDefinition,
        previous: Option<&RouteDefinition>,
        client_versions: Option<&[u64]>,
    ) -> Result<StackPayload, RenderError> {
        let deadline = Instant::now() + self.shell_timeout;
        let diff = self.diff_stack(route, previous, client_versions);
        match tokio::time::timeout_at(deadline, diff).await {
            Ok(result) => result,
            Err(_) => Err(RenderError::Timeout(self.shell_timeout.as_secs())),
        }
    }

    async fn load_component(
        &self,
        role: ModuleRole,
        location: &Path,
    ) -> Result<(Arc<dyn Component>, u64), RenderError> {
        let loaded = self.registry.load(location).await?;
        let component = loaded
            .module
            .default
            .ok_or_else(|| RenderError::ComponentExportMissing {
                role,
                path: location.to_path_buf(),
            })?;
        Ok((component, loaded.version))
    }

    async fn load_frames(&self, route: &RouteDefinition) -> Result<Vec<Frame>, RenderError> {
        let mut frames = Vec::with_capacity(route.layouts.len() + 1);
        for (id, file) in route.stack() {
            let role = if id.is_route() {
                ModuleRole::Route
            } else {
                ModuleRole::Layout
            };
            let (component, version) = self.load_component(role, file).await?;
            frames.push(Frame {
                id,
                version,
                component,
            });
        }
        Ok(frames)
    }

    async fn compose_shell(&self, route: &RouteDefinition) -> Result<ShellWriter, RenderError> {
        let (root, _) = self
            .load_component(ModuleRole::Root, &self.root_template)
            .await?;
        let frames = self.load_frames(route).await?;
        let props = Props::for_route(&route.path);

        // Innermost first: the route, then each layout around it.
        let mut node = Node::Empty;
        for frame in frames.iter().rev() {
            let output = frame.component.render(&props, node).await?;
            node = Node::boundary(frame.id.clone(), frame.version, output);
        }
        let document = root.render(&props, node).await?;

        let mut writer = ShellWriter::new();
        writer.push_markup(DOCTYPE);
        writer.write(document);
        writer.insert_before_body_close(&script_tag());
        Ok(writer)
    }

    async fn diff_stack(
        &self,
        route: &RouteDefinition,
        previous: Option<&RouteDefinition>,
        client_versions: Option<&[u64]>,
    ) -> Result<StackPayload, RenderError> {
        let frames = self.load_frames(route).await?;
        let previous = previous
            .map(|definition| self.previous_stack(definition, client_versions))
            .unwrap_or_default();
        let props = Props::for_route(&route.path);

        let mut descriptors = Vec::with_capacity(frames.len());
        for (index, frame) in frames.into_iter().enumerate() {
            let unchanged = previous
                .get(index)
                .is_some_and(|(id, version)| *id == frame.id && *version == frame.version);
            if unchanged {
                descriptors.push(FrameDescriptor::retained(frame.id, frame.version));
                continue;
            }

            let children = if frame.id.is_route() {
                Node::Empty
            } else {
                Node::Outlet
            };
            let output = frame.component.render(&props, children).await?;
            let html = render_resolved(output).await?;
            descriptors.push(FrameDescriptor::fresh(frame.id, frame.version, html));
        }

        Ok(StackPayload {
            frames: descriptors,
            route_path: route.path.clone(),
        })
    }

    /// Identities and versions the client is assumed to hold. Client-sent
    /// versions are used when they line up with the hinted stack; otherwise
    /// the hinted stack is taken as rendered at current versions.
    fn previous_stack(
        &self,
        previous: &RouteDefinition,
        client_versions: Option<&[u64]>,
    ) -> Vec<(FrameId, u64)> {
        let stack = previous.stack();
        match client_versions {
            Some(versions) if versions.len() == stack.len() => stack
                .into_iter()
                .map(|(id, _)| id)
                .zip(versions.iter().copied())
                .collect(),
            _ => stack
                .into_iter()
                .map(|(id, file)| (id, self.registry.current_version(file)))
                .collect(),
        }
    }
}
