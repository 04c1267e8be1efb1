//! Wire protocol shared by the render pipeline and the client router.
//!
//! # Data Flow
//! ```text
//! client navigate(url)
//!     → GET url?_stack=1&_stack_current=/prev&_stack_versions=0.3
//!       (x-stack-router: navigate, Accept: application/json)
//!     → server stack diff → StackPayload { frames, routePath }
//!     → client applies frames position by position
//! ```
//!
//! # Design Decisions
//! - Frame ids are strings on the wire (`layout:/dir`, `route:/path`)
//! - A retained frame carries no html; a fresh one always does
//! - The same descriptors are persisted in history snapshots

pub mod frame;
pub mod payload;

pub use frame::{FrameDescriptor, FrameId, FrameIdError, FrameKind};
pub use payload::{decode_versions, encode_versions, PayloadError, StackPayload};

/// Query parameter flagging a partial (stack-only) request.
pub const STACK_PARAM: &str = "_stack";

/// Query parameter carrying the client's current route path.
pub const CURRENT_PARAM: &str = "_stack_current";

/// Query parameter carrying the client's live frame versions.
pub const VERSIONS_PARAM: &str = "_stack_versions";

/// Header identifying requests issued by the client router.
pub const ROUTER_HEADER: &str = "x-stack-router";

/// Header alternative to [`CURRENT_PARAM`].
pub const CURRENT_HEADER: &str = "x-stack-current";

/// Attribute on anchors opting into in-place navigation.
pub const LINK_ATTR: &str = "data-stack-link";

/// Attribute on anchors asking for a history replace instead of a push.
pub const REPLACE_ATTR: &str = "data-stack-replace";

/// Boundary identity attribute.
pub const BOUNDARY_ID_ATTR: &str = "data-stack-id";

/// Boundary version attribute.
pub const BOUNDARY_VERSION_ATTR: &str = "data-stack-version";

/// Empty element marking where a frame's child boundary belongs.
pub const OUTLET_ATTR: &str = "data-stack-outlet";

/// Path the browser router script is served from.
pub const CLIENT_SCRIPT_PATH: &str = "/_stack/router.js";
