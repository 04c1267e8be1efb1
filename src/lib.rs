//! Server-rendering router library.
//!
//! Maps a file-based route tree onto nested layout boundaries, renders full
//! documents or JSON stack payloads, and drives in-place client navigation.

pub mod client;
pub mod config;
pub mod dev;
pub mod http;
pub mod lifecycle;
pub mod modules;
pub mod observability;
pub mod protocol;
pub mod render;
pub mod routing;

use std::sync::Arc;
use std::time::Duration;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::RouteManifest;

use crate::modules::TemplateLoader;
use crate::routing::ManifestSettings;

/// Build a manifest over the application described by `config`, loading
/// components from html templates.
pub fn manifest_from_config(config: &AppConfig) -> RouteManifest {
    let settings = ManifestSettings {
        routes_root: config.app.routes_root(),
        root_template: config.app.root_template_path(),
        mode: config.app.mode,
        shell_timeout: Duration::from_secs(config.render.shell_timeout_secs),
    };
    RouteManifest::new(settings, Arc::new(TemplateLoader::new()))
}
