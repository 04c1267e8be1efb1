//! Stack frame identity and descriptors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a boundary wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    Layout,
    Route,
}

impl FrameKind {
    fn prefix(self) -> &'static str {
        match self {
            FrameKind::Layout => "layout",
            FrameKind::Route => "route",
        }
    }
}

/// Identity of a boundary: `(kind, scope)`.
///
/// Layout scopes are the layout's directory relative to the routes root,
/// written with a leading `/` (`/` is the routes root itself). Route scopes
/// are canonical route paths. Rendered as `layout:/(marketing)` or
/// `route:/about`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FrameId {
    pub kind: FrameKind,
    pub scope: String,
}

impl FrameId {
    pub fn layout(scope: impl Into<String>) -> Self {
        Self {
            kind: FrameKind::Layout,
            scope: scope.into(),
        }
    }

    pub fn route(path: impl Into<String>) -> Self {
        Self {
            kind: FrameKind::Route,
            scope: path.into(),
        }
    }

    pub fn is_route(&self) -> bool {
        self.kind == FrameKind::Route
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.prefix(), self.scope)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed frame id '{0}'")]
pub struct FrameIdError(pub String);

impl FromStr for FrameId {
    type Err = FrameIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, scope) = s.split_once(':').ok_or_else(|| FrameIdError(s.to_string()))?;
        if !scope.starts_with('/') {
            return Err(FrameIdError(s.to_string()));
        }
        match prefix {
            "layout" => Ok(FrameId::layout(scope)),
            "route" => Ok(FrameId::route(scope)),
            _ => Err(FrameIdError(s.to_string())),
        }
    }
}

impl TryFrom<String> for FrameId {
    type Error = FrameIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FrameId> for String {
    fn from(id: FrameId) -> Self {
        id.to_string()
    }
}

/// One position of a rendered stack.
///
/// `html` is present when the client must (re)build the boundary and absent
/// when `retain` tells it to keep the live one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDescriptor {
    pub id: FrameId,
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default)]
    pub retain: bool,
}

impl FrameDescriptor {
    pub fn retained(id: FrameId, version: u64) -> Self {
        Self {
            id,
            version,
            html: None,
            retain: true,
        }
    }

    pub fn fresh(id: FrameId, version: u64, html: String) -> Self {
        Self {
            id,
            version,
            html: Some(html),
            retain: false,
        }
    }
}
