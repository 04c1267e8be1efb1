//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Init logging/metrics → Scan routes → Watcher (dev) → Listener
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → Shutdown::trigger → server stops accepting → drain → exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: a missing routes root aborts startup
//! - Listener binds last (traffic only when routes are known)

pub mod shutdown;

pub use shutdown::Shutdown;
