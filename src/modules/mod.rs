//! Module loading subsystem.
//!
//! # Data Flow
//! ```text
//! render needs component at location L
//!     → registry.rs (key = (L, versions[L]))
//!         hit  → cached ComponentModule
//!         miss → loader.rs (ModuleLoader: template files or static table)
//!              → cache under (L, version)
//!
//! file change on L (dev)
//!     → registry.invalidate(L): versions[L] += 1, evict (L, *)
//! ```
//!
//! # Design Decisions
//! - Versions double as boundary versions sent to the client
//! - The loader is a trait seam; the manifest never reads component code

pub mod loader;
pub mod registry;
pub mod template;
pub mod versions;

pub use loader::{ComponentModule, LoadError, ModuleLoader, StaticLoader};
pub use registry::{LoadedModule, ModuleRegistry};
pub use template::{TemplateComponent, TemplateLoader};
pub use versions::ModuleVersions;
