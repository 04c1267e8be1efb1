//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + CLI overrides
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → handed to the manifest, render pipeline and HTTP server at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only route files hot-reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AppConfig;
pub use schema::AppSection;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::RenderConfig;
pub use schema::RuntimeMode;
