//! Route Manifest: file-system-declared routes with layout inheritance.
//!
//! # Data Flow
//! ```text
//! Startup / first lookup:
//!     routes root → scanner.rs (sorted walk, layout chain per directory)
//!     → reconcile.rs RouteIndex (table + file → path owners)
//!     → manifest.rs publishes Arc<RouteTable>
//!
//! Dev change notification:
//!     notify_file_change(location, kind) → queue (no work)
//!     next lookup → drain queue → bump module versions
//!     → reconcile on a copy → publish new table
//!
//! Lookup:
//!     pathname → path.rs normalize → RouteTable → render pipeline
//! ```
//!
//! # Design Decisions
//! - Group directories `(name)` add no path segment but still scope layouts
//! - Duplicate paths: last discovered file wins, logged as a warning
//! - Readers never observe a table mid-rebuild

pub mod changes;
pub mod definition;
pub mod error;
pub mod manifest;
pub mod path;
pub mod reconcile;
pub mod scanner;

pub use changes::{ChangeKind, PendingChange};
pub use definition::{LayoutRef, RouteDefinition, RouteTable};
pub use error::{RouteError, RouteResult};
pub use manifest::{ManifestSettings, RouteManifest};
pub use path::normalize_path;
pub use reconcile::RouteIndex;
