//! Stack-diff payload exchanged for partial navigations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::frame::{FrameDescriptor, FrameKind};

/// Ordered frame descriptors, outermost first, ending at the route frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackPayload {
    pub frames: Vec<FrameDescriptor>,
    pub route_path: String,
}

/// Ways a payload can fail the structural checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("stack is empty")]
    Empty,

    #[error("frame {index} is a route frame before the end of the stack")]
    RouteBeforeEnd { index: usize },

    #[error("stack does not end in a route frame")]
    MissingRouteFrame,

    #[error("route frame scope '{scope}' does not match route path '{route_path}'")]
    RoutePathMismatch { scope: String, route_path: String },

    #[error("frame {index} neither retains nor carries html")]
    MissingHtml { index: usize },
}

impl StackPayload {
    /// Check the ordering invariant: layouts first, exactly one route frame
    /// last, and every non-retained frame carrying html.
    pub fn validate(&self) -> Result<(), PayloadError> {
        let last = self.frames.len().checked_sub(1).ok_or(PayloadError::Empty)?;

        for (index, frame) in self.frames.iter().enumerate() {
            if frame.id.kind == FrameKind::Route && index != last {
                return Err(PayloadError::RouteBeforeEnd { index });
            }
            if !frame.retain && frame.html.is_none() {
                return Err(PayloadError::MissingHtml { index });
            }
        }

        let route = &self.frames[last];
        if route.id.kind != FrameKind::Route {
            return Err(PayloadError::MissingRouteFrame);
        }
        if route.id.scope != self.route_path {
            return Err(PayloadError::RoutePathMismatch {
                scope: route.id.scope.clone(),
                route_path: self.route_path.clone(),
            });
        }
        Ok(())
    }
}

/// Encode frame versions for the `_stack_versions` query parameter.
pub fn encode_versions(versions: &[u64]) -> String {
    versions
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// Decode the `_stack_versions` query parameter. Any unparsable entry
/// discards the whole list.
pub fn decode_versions(raw: &str) -> Option<Vec<u64>> {
    if raw.is_empty() {
        return Some(Vec::new());
    }
    raw.split('.').map(|v| v.parse().ok()).collect()
}
