//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the server-rendering router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Application layout on disk and runtime mode.
    pub app: AppSection,

    /// Render pipeline bounds.
    pub render: RenderConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Whether the manifest reconciles file changes or scans once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    /// Lazy reconciliation of watcher events, versioned module cache.
    Dev,
    /// One-time scan, modules cached for the process lifetime.
    #[default]
    Prod,
}

impl RuntimeMode {
    pub fn is_dev(self) -> bool {
        matches!(self, RuntimeMode::Dev)
    }
}

impl std::fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeMode::Dev => write!(f, "dev"),
            RuntimeMode::Prod => write!(f, "prod"),
        }
    }
}

/// Application directory layout.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppSection {
    /// Application root; the other paths are relative to it.
    pub root: PathBuf,

    /// Routes directory, relative to `root`.
    pub routes_dir: PathBuf,

    /// Page root template, relative to `root`.
    pub root_template: PathBuf,

    /// Runtime mode.
    pub mode: RuntimeMode,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            routes_dir: PathBuf::from("src/routes"),
            root_template: PathBuf::from("src/root.html"),
            mode: RuntimeMode::Prod,
        }
    }
}

impl AppSection {
    /// Absolute-or-relative location of the routes root.
    pub fn routes_root(&self) -> PathBuf {
        self.root.join(&self.routes_dir)
    }

    /// Location of the root template file.
    pub fn root_template_path(&self) -> PathBuf {
        self.root.join(&self.root_template)
    }
}

/// Render pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Hard bound for the shell to become ready, in seconds. The same
    /// deadline ends streaming of deferred content.
    pub shell_timeout_secs: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            shell_timeout_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9464".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.listener.bind_address, "127.0.0.1:3000");
        assert_eq!(config.render.shell_timeout_secs, 10);
        assert_eq!(config.app.mode, RuntimeMode::Prod);
        assert_eq!(config.app.routes_root(), PathBuf::from("./src/routes"));
    }

    #[test]
    fn test_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [app]
            root = "demo"
            mode = "dev"

            [render]
            shell_timeout_secs = 3
            "#,
        )
        .unwrap();

        assert!(config.app.mode.is_dev());
        assert_eq!(config.app.root_template_path(), PathBuf::from("demo/src/root.html"));
        assert_eq!(config.render.shell_timeout_secs, 3);
        assert_eq!(config.listener.bind_address, "127.0.0.1:3000");
    }
}
