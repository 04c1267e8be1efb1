//! Development-mode support.
//!
//! # Data Flow
//! ```text
//! notify event (create / modify / rename / remove)
//!     → watcher.rs classify → (location, ChangeKind)
//!     → relevance filter (routes root, root template)
//!     → RouteManifest::notify_file_change (queued, applied on next lookup)
//! ```

pub mod watcher;

pub use watcher::{RouteWatcher, WatchError};
