//! The Route Manifest: path lookup over a published route table.
//!
//! # Responsibilities
//! - First consultation: full scan of the routes root
//! - Queue change notifications without doing any work
//! - Drain the queue at the next consultation and publish a new table
//! - Hand matched routes to the render pipeline
//!
//! # Design Decisions
//! - Readers load an `Arc<RouteTable>`; a batch builds a new table and swaps it in
//! - One batch at a time (async mutex); a counter skips the lock when idle
//! - Scans and reconciliation run on the blocking pool
//! - Production ignores notifications after the one-time scan

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use tokio::sync::{mpsc, Mutex};

use crate::config::RuntimeMode;
use crate::modules::{ModuleLoader, ModuleRegistry};
use crate::observability::metrics;
use crate::render::{RenderError, RenderOptions, RenderPipeline, RenderedOutput};
use crate::routing::changes::{ChangeKind, PendingChange};
use crate::routing::definition::RouteTable;
use crate::routing::error::{RouteError, RouteResult};
use crate::routing::path::normalize_path;
use crate::routing::reconcile::RouteIndex;
use crate::routing::scanner::canonical_root;

/// Construction parameters for [`RouteManifest`].
#[derive(Debug, Clone)]
pub struct ManifestSettings {
    pub routes_root: PathBuf,
    pub root_template: PathBuf,
    pub mode: RuntimeMode,
    pub shell_timeout: Duration,
}

struct ReconcileState {
    receiver: mpsc::UnboundedReceiver<PendingChange>,
    /// `None` until the first successful scan.
    index: Option<RouteIndex>,
}

pub struct RouteManifest {
    routes_root: PathBuf,
    mode: RuntimeMode,
    pipeline: RenderPipeline,
    table: ArcSwapOption<RouteTable>,
    state: Mutex<ReconcileState>,
    sender: mpsc::UnboundedSender<PendingChange>,
    pending: AtomicUsize,
}

impl RouteManifest {
    pub fn new(settings: ManifestSettings, loader: Arc<dyn ModuleLoader>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let registry = ModuleRegistry::new(loader);
        let root_template = resolve_location(&settings.root_template);

        Self {
            routes_root: settings.routes_root,
            mode: settings.mode,
            pipeline: RenderPipeline::new(registry, root_template, settings.shell_timeout),
            table: ArcSwapOption::empty(),
            state: Mutex::new(ReconcileState {
                receiver,
                index: None,
            }),
            sender,
            pending: AtomicUsize::new(0),
        }
    }

    pub fn mode(&self) -> RuntimeMode {
        self.mode
    }

    pub fn routes_root(&self) -> &Path {
        &self.routes_root
    }

    pub fn root_template(&self) -> &Path {
        self.pipeline.root_template()
    }

    pub fn registry(&self) -> &ModuleRegistry {
        self.pipeline.registry()
    }

    /// Scan eagerly. Returns the number of routes found.
    pub async fn initialize(&self) -> RouteResult<usize> {
        Ok(self.routes().await?.len())
    }

    /// Queue a change for the next consultation. Never blocks.
    pub fn notify_file_change(&self, location: impl Into<PathBuf>, kind: ChangeKind) {
        let location = location.into();
        if !self.mode.is_dev() {
            tracing::debug!(location = %location.display(), %kind, "Ignoring change notification in production");
            return;
        }

        self.pending.fetch_add(1, Ordering::AcqRel);
        if self.sender.send(PendingChange::new(location, kind)).is_err() {
            self.pending.fetch_sub(1, Ordering::AcqRel);
        }
    }

    /// Current route table, applying any queued changes first.
    pub async fn routes(&self) -> RouteResult<Arc<RouteTable>> {
        if self.pending.load(Ordering::Acquire) == 0 {
            if let Some(table) = self.table.load_full() {
                return Ok(table);
            }
        }

        let mut state = self.state.lock().await;

        let mut changes = Vec::new();
        while let Ok(change) = state.receiver.try_recv() {
            changes.push(change);
        }
        self.pending.fetch_sub(changes.len(), Ordering::AcqRel);

        match state.index.take() {
            None => {
                // Changes made before the first scan are already on disk.
                for change in &changes {
                    self.invalidate(change);
                }
                let index = self.full_scan().await?;
                self.publish(&index);
                state.index = Some(index);
            }
            Some(index) if changes.is_empty() => {
                if self.table.load().is_none() {
                    self.publish(&index);
                }
                state.index = Some(index);
            }
            Some(index) => {
                let index = self.reconcile(index, changes).await;
                self.publish(&index);
                state.index = Some(index);
            }
        }

        self.table
            .load_full()
            .ok_or_else(|| RouteError::Task("route table missing after publish".into()))
    }

    /// Render `pathname`. `Ok(None)` means no route matched.
    pub async fn render(
        &self,
        pathname: &str,
        options: &RenderOptions,
    ) -> Result<Option<RenderedOutput>, RenderError> {
        let table = self.routes().await?;
        let path = normalize_path(pathname);

        let Some(route) = table.get(&path).cloned() else {
            tracing::debug!(%path, "No route matched");
            return Ok(None);
        };
        let previous = options
            .current_route_path
            .as_deref()
            .map(normalize_path)
            .and_then(|hint| table.get(&hint).cloned());

        self.pipeline
            .render(&route, previous.as_deref(), options)
            .await
            .map(Some)
    }

    async fn full_scan(&self) -> RouteResult<RouteIndex> {
        let start = Instant::now();
        let configured = self.routes_root.clone();

        let index = tokio::task::spawn_blocking(move || {
            let root = canonical_root(&configured)?;
            RouteIndex::scan(&root)
        })
        .await
        .map_err(|e| RouteError::Task(e.to_string()))??;

        tracing::info!(
            root = %index.root().display(),
            routes = index.table().len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            mode = %self.mode,
            "Route manifest scanned"
        );
        Ok(index)
    }

    async fn reconcile(&self, index: RouteIndex, changes: Vec<PendingChange>) -> RouteIndex {
        let start = Instant::now();
        let count = changes.len();
        let root = index.root().to_path_buf();

        let changes: Vec<PendingChange> = changes
            .into_iter()
            .map(|change| PendingChange::new(rebase(&change.location, &self.routes_root, &root), change.kind))
            .collect();
        for change in &changes {
            self.invalidate(change);
        }

        let fallback = index.clone();
        let task = tokio::task::spawn_blocking(move || {
            let mut index = index;
            for change in &changes {
                if let Err(e) = index.apply(change) {
                    tracing::warn!(
                        location = %change.location.display(),
                        kind = %change.kind,
                        error = %e,
                        "Failed to reconcile change"
                    );
                }
                metrics::record_reconciled_change(change.kind.as_str());
            }
            index
        })
        .await;

        match task {
            Ok(index) => {
                tracing::info!(
                    changes = count,
                    routes = index.table().len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Route manifest reconciled"
                );
                index
            }
            Err(e) => {
                tracing::error!(error = %e, "Reconciliation task failed; keeping previous routes");
                fallback
            }
        }
    }

    fn invalidate(&self, change: &PendingChange) {
        if matches!(change.kind, ChangeKind::AddDir | ChangeKind::UnlinkDir) {
            return;
        }
        let location = resolve_location(&change.location);
        self.registry().invalidate(&location);
    }

    fn publish(&self, index: &RouteIndex) {
        self.table.store(Some(Arc::new(index.table().clone())));
    }
}

/// Canonical form of a location whose file may no longer exist.
fn resolve_location(location: &Path) -> PathBuf {
    if let Ok(path) = std::fs::canonicalize(location) {
        return path;
    }
    match (location.parent(), location.file_name()) {
        (Some(parent), Some(name)) => std::fs::canonicalize(parent)
            .map(|parent| parent.join(name))
            .unwrap_or_else(|_| location.to_path_buf()),
        _ => location.to_path_buf(),
    }
}

/// Express a notified location under the canonical routes root.
fn rebase(location: &Path, configured: &Path, canonical: &Path) -> PathBuf {
    if location.starts_with(canonical) {
        return location.to_path_buf();
    }
    if let Ok(rest) = location.strip_prefix(configured) {
        return canonical.join(rest);
    }
    resolve_location(location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::TemplateLoader;
    use std::fs;

    fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn manifest(dir: &Path, mode: RuntimeMode) -> RouteManifest {
        write(dir, "root.html", "<html><body>{{ children }}</body></html>");
        write(dir, "routes/(marketing)/_layout.html", "<nav></nav>{{ children }}");
        write(dir, "routes/(marketing)/index.html", "<h1>home</h1>");
        write(dir, "routes/(marketing)/about.html", "<h1>about</h1>");
        write(dir, "routes/shop/index.html", "<h1>shop</h1>");

        RouteManifest::new(
            ManifestSettings {
                routes_root: dir.join("routes"),
                root_template: dir.join("root.html"),
                mode,
                shell_timeout: Duration::from_secs(10),
            },
            Arc::new(TemplateLoader::new()),
        )
    }

    #[tokio::test]
    async fn test_initial_scan() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = manifest(dir.path(), RuntimeMode::Prod);
        assert_eq!(manifest.initialize().await.unwrap(), 3);
        let routes = manifest.routes().await.unwrap();
        assert_eq!(routes.paths(), vec!["/", "/about", "/shop"]);
    }

    #[tokio::test]
    async fn test_missing_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = RouteManifest::new(
            ManifestSettings {
                routes_root: dir.path().join("nope"),
                root_template: dir.path().join("root.html"),
                mode: RuntimeMode::Dev,
                shell_timeout: Duration::from_secs(10),
            },
            Arc::new(TemplateLoader::new()),
        );
        assert!(matches!(
            manifest.initialize().await,
            Err(RouteError::RoutesRootMissing(_))
        ));
        assert!(matches!(
            manifest.render("/", &RenderOptions::document()).await,
            Err(RenderError::Route(RouteError::RoutesRootMissing(_)))
        ));
    }

    #[tokio::test]
    async fn test_unknown_path_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = manifest(dir.path(), RuntimeMode::Prod);
        let output = manifest.render("/missing", &RenderOptions::document()).await.unwrap();
        assert!(output.is_none());
    }

    #[tokio::test]
    async fn test_normalized_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = manifest(dir.path(), RuntimeMode::Prod);
        for pathname in ["/about", "/about/", "/about/?x=1", "/about#top"] {
            let output = manifest.render(pathname, &RenderOptions::document()).await.unwrap();
            assert!(matches!(output, Some(RenderedOutput::Document(_))), "{pathname}");
        }
    }

    #[tokio::test]
    async fn test_notifications_are_lazy_and_applied_once() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = manifest(dir.path(), RuntimeMode::Dev);
        manifest.initialize().await.unwrap();

        let cart = write(dir.path(), "routes/shop/cart.html", "<h1>cart</h1>");
        manifest.notify_file_change(&cart, ChangeKind::Add);
        assert_eq!(manifest.pending.load(Ordering::Acquire), 1);

        let routes = manifest.routes().await.unwrap();
        assert!(routes.get("/shop/cart").is_some());
        assert_eq!(manifest.pending.load(Ordering::Acquire), 0);
        assert_eq!(manifest.registry().current_version(&resolve_location(&cart)), 1);

        // Drained: a second consultation does not bump again.
        manifest.routes().await.unwrap();
        assert_eq!(manifest.registry().current_version(&resolve_location(&cart)), 1);
    }

    #[tokio::test]
    async fn test_production_ignores_notifications() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = manifest(dir.path(), RuntimeMode::Prod);
        manifest.initialize().await.unwrap();

        let cart = write(dir.path(), "routes/shop/cart.html", "<h1>cart</h1>");
        manifest.notify_file_change(&cart, ChangeKind::Add);
        assert!(manifest.routes().await.unwrap().get("/shop/cart").is_none());
    }

    #[tokio::test]
    async fn test_readers_keep_their_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = manifest(dir.path(), RuntimeMode::Dev);
        let before = manifest.routes().await.unwrap();

        let about = dir.path().join("routes/(marketing)/about.html");
        fs::remove_file(&about).unwrap();
        manifest.notify_file_change(&about, ChangeKind::Unlink);

        let after = manifest.routes().await.unwrap();
        assert!(before.get("/about").is_some());
        assert!(after.get("/about").is_none());
    }
}
