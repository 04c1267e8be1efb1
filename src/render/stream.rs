//! Streaming of a rendered document: shell first, deferred content after.

use futures_util::stream::{self, BoxStream, FuturesUnordered, StreamExt};
use futures_util::future::{BoxFuture, FutureExt};
use tokio::time::Instant;

use crate::render::component::ComponentError;
use crate::render::html::{resolved_chunk, PendingContent, ShellWriter};
use crate::render::node::Node;

type Resolving = BoxFuture<'static, (usize, Result<Node, ComponentError>)>;

/// A document whose shell is ready and whose remaining content streams
/// until `deadline`.
pub struct HtmlDocument {
    shell: String,
    pending: Vec<PendingContent>,
    next_id: usize,
    deadline: Instant,
}

impl std::fmt::Debug for HtmlDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlDocument")
            .field("shell_len", &self.shell.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl HtmlDocument {
    pub fn new(writer: ShellWriter, deadline: Instant) -> Self {
        let (shell, pending, next_id) = writer.finish();
        Self {
            shell,
            pending,
            next_id,
            deadline,
        }
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Stream of HTML chunks: the shell, then each deferred node as it
    /// resolves. Deferred failures are logged and leave the fallback in
    /// place; hitting the deadline ends the stream.
    pub fn into_stream(self) -> BoxStream<'static, String> {
        let queue: FuturesUnordered<Resolving> = self
            .pending
            .into_iter()
            .map(|(id, content)| content.map(move |result| (id, result)).boxed())
            .collect();

        let state = StreamState {
            shell: Some(self.shell),
            queue,
            next_id: self.next_id,
            deadline: self.deadline,
        };

        stream::unfold(state, |mut state| async move {
            if let Some(shell) = state.shell.take() {
                return Some((shell, state));
            }
            state.next_chunk().await.map(|chunk| (chunk, state))
        })
        .boxed()
    }

    /// Collect the whole stream into one string.
    pub async fn into_string(self) -> String {
        self.into_stream().collect::<Vec<_>>().await.concat()
    }
}

struct StreamState {
    shell: Option<String>,
    queue: FuturesUnordered<Resolving>,
    next_id: usize,
    deadline: Instant,
}

impl StreamState {
    async fn next_chunk(&mut self) -> Option<String> {
        loop {
            if self.queue.is_empty() {
                return None;
            }

            match tokio::time::timeout_at(self.deadline, self.queue.next()).await {
                Err(_) => {
                    tracing::error!(
                        pending = self.queue.len(),
                        "Render deadline reached after shell was sent; ending stream"
                    );
                    return None;
                }
                Ok(None) => return None,
                Ok(Some((id, Ok(node)))) => return Some(self.write_resolved(id, node)),
                Ok(Some((id, Err(e)))) => {
                    tracing::error!(placeholder = id, error = %e, "Deferred content failed after shell was sent");
                }
            }
        }
    }

    fn write_resolved(&mut self, id: usize, node: Node) -> String {
        let mut writer = ShellWriter::starting_at(self.next_id);
        writer.write(node);
        let (html, pending, next_id) = writer.finish();
        self.next_id = next_id;
        for (nested_id, content) in pending {
            self.queue
                .push(content.map(move |result| (nested_id, result)).boxed());
        }
        resolved_chunk(id, &html)
    }
}
