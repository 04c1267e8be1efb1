//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use stack_router::config::RuntimeMode;
use stack_router::modules::TemplateLoader;
use stack_router::routing::{ManifestSettings, RouteManifest};
use stack_router::{HttpServer, Shutdown};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const ROOT_TEMPLATE: &str = "<html><body>{{ children }}</body></html>";
pub const MARKETING_LAYOUT: &str = "<nav>marketing</nav><main>{{ children }}</main>";

/// An application tree on disk:
///
/// ```text
/// root.html
/// routes/(marketing)/_layout.html
/// routes/(marketing)/index.html
/// routes/(marketing)/about.html
/// routes/shop/index.html
/// ```
pub struct AppFixture {
    pub dir: TempDir,
}

impl AppFixture {
    pub fn new() -> Self {
        let fixture = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        fixture.write("root.html", ROOT_TEMPLATE);
        fixture.write("routes/(marketing)/_layout.html", MARKETING_LAYOUT);
        fixture.write("routes/(marketing)/index.html", "<h1>home</h1>");
        fixture.write("routes/(marketing)/about.html", "<h1>about {{ path }}</h1>");
        fixture.write("routes/shop/index.html", "<h1>shop</h1>");
        fixture
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn remove(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        fs::remove_file(&path).unwrap();
        path
    }

    pub fn manifest(&self, mode: RuntimeMode) -> Arc<RouteManifest> {
        Arc::new(RouteManifest::new(
            ManifestSettings {
                routes_root: self.path("routes"),
                root_template: self.path("root.html"),
                mode,
                shell_timeout: Duration::from_secs(5),
            },
            Arc::new(TemplateLoader::new()),
        ))
    }
}

/// A server bound to an ephemeral port, stopped when dropped.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestServer {
    pub async fn start(manifest: Arc<RouteManifest>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Shutdown::new();
        let receiver = shutdown.subscribe();

        tokio::spawn(async move {
            let _ = HttpServer::new(manifest).run(listener, receiver).await;
        });

        Self { addr, shutdown }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}
