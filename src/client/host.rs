//! The browser surface the client router drives.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::protocol::FrameId;

/// A rendered boundary element: identity, version and its own markup
/// (with an outlet where the next boundary sits).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveBoundary {
    pub id: FrameId,
    pub version: u64,
    pub html: String,
}

impl LiveBoundary {
    pub fn new(id: FrameId, version: u64, html: impl Into<String>) -> Self {
        Self {
            id,
            version,
            html: html.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollPosition {
    pub x: f64,
    pub y: f64,
}

impl ScrollPosition {
    pub const TOP: ScrollPosition = ScrollPosition { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Document, history and window operations.
///
/// Boundaries are addressed by stack position, outermost first. Replacing
/// a boundary keeps the boundary nested inside it (moved into the new
/// outlet); truncating removes the surplus innermost boundaries.
pub trait BrowserHost {
    fn location(&self) -> Url;

    fn boundaries(&self) -> Vec<LiveBoundary>;
    fn truncate_boundaries(&self, len: usize);
    fn replace_boundary(&self, index: usize, boundary: LiveBoundary);
    fn append_boundary(&self, boundary: LiveBoundary);

    fn scroll(&self) -> ScrollPosition;
    fn scroll_to(&self, position: ScrollPosition);

    fn history_state(&self) -> Option<serde_json::Value>;
    fn push_state(&self, state: serde_json::Value, url: &Url);
    fn replace_state(&self, state: serde_json::Value, url: &Url);

    /// Native, full-page navigation.
    fn assign_location(&self, url: &Url);
}
