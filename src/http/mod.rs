//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request id, trace span)
//!     → request.rs (document vs stack-only, current route hint)
//!     → RouteManifest::render
//!     → server.rs (stream html | JSON stack payload | 404 | 500)
//! ```

pub mod request;
pub mod server;

pub use request::{PartialRequest, SequentialRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
