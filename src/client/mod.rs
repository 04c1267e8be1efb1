//! Client Navigation Protocol.
//!
//! # Data Flow
//! ```text
//! click on a[data-stack-link]
//!     → intercept.rs (left button, unmodified, same origin, no target)
//!     → navigator.rs navigate(url)
//!         → persist scroll into the current history entry
//!         → abort the in-flight request, fetch.rs StackRequest
//!         → apply.rs (check every retain, truncate, replace/append)
//!         → snapshot.rs capture → push/replace history, scroll to top
//!
//! popstate(state)
//!     → snapshot.rs parse → apply.rs apply_snapshot → restore scroll
//!     → unusable state: refetch the current location in place
//! ```
//!
//! # Design Decisions
//! - The browser is reached only through `BrowserHost` and `StackFetcher`
//! - Single-threaded: state lives in `RefCell`, futures are `!Send`
//! - Any protocol failure ends in a native navigation, never an error

pub mod apply;
pub mod fetch;
pub mod host;
pub mod intercept;
pub mod memory;
pub mod navigator;
pub mod runtime;
pub mod snapshot;

pub use apply::ApplyError;
pub use fetch::{FetchError, StackFetcher, StackRequest};
pub use host::{BrowserHost, LiveBoundary, ScrollPosition};
pub use intercept::{intercept, AnchorInfo, ClickEvent};
pub use memory::{HistoryEntry, MemoryHost};
pub use navigator::{ClientRouter, FallbackReason, NavigateOptions, NavigationOutcome};
pub use runtime::ClientRuntime;
pub use snapshot::ClientSnapshot;
