//! History-state snapshots of the rendered stack.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::client::host::{BrowserHost, ScrollPosition};
use crate::protocol::{FrameDescriptor, StackPayload};

/// State stored in each history entry the router owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSnapshot {
    /// Path, query and fragment of the entry.
    pub url: String,
    /// Frames outermost first, each with the markup it had when captured.
    pub frames: Vec<FrameDescriptor>,
    pub scroll: ScrollPosition,
    pub route_path: String,
}

impl ClientSnapshot {
    /// Capture the live stack. `None` when the page has no route boundary.
    pub fn capture(host: &dyn BrowserHost, url: &Url, scroll: ScrollPosition) -> Option<Self> {
        let frames: Vec<FrameDescriptor> = host
            .boundaries()
            .into_iter()
            .map(|b| FrameDescriptor::fresh(b.id, b.version, b.html))
            .collect();
        let route = frames.last().filter(|f| f.id.is_route())?;

        Some(Self {
            url: relative_url(url),
            route_path: route.id.scope.clone(),
            frames,
            scroll,
        })
    }

    /// Parse stored history state; anything malformed is `None`.
    pub fn from_state(state: &serde_json::Value) -> Option<Self> {
        let snapshot: Self = serde_json::from_value(state.clone()).ok()?;
        let payload = StackPayload {
            frames: snapshot.frames.clone(),
            route_path: snapshot.route_path.clone(),
        };
        payload.validate().ok()?;
        Some(snapshot)
    }

    pub fn to_state(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// `path?query#fragment` of a URL.
pub fn relative_url(url: &Url) -> String {
    let mut out = url.path().to_string();
    if let Some(query) = url.query() {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = url.fragment() {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::FrameId;
    use serde_json::json;

    #[test]
    fn test_state_shape() {
        let snapshot = ClientSnapshot {
            url: "/about#team".into(),
            frames: vec![
                FrameDescriptor::fresh(FrameId::layout("/(marketing)"), 0, "<nav></nav><div data-stack-outlet></div>".into()),
                FrameDescriptor::fresh(FrameId::route("/about"), 2, "<h1>about</h1>".into()),
            ],
            scroll: ScrollPosition::new(0.0, 120.0),
            route_path: "/about".into(),
        };
        let state = snapshot.to_state();
        assert_eq!(state["routePath"], "/about");
        assert_eq!(state["frames"][1]["id"], "route:/about");
        assert_eq!(state["scroll"]["y"], 120.0);
        assert_eq!(ClientSnapshot::from_state(&state), Some(snapshot));
    }

    #[test]
    fn test_malformed_state() {
        assert!(ClientSnapshot::from_state(&json!(null)).is_none());
        assert!(ClientSnapshot::from_state(&json!({ "url": "/" })).is_none());
        let no_route = json!({
            "url": "/",
            "frames": [{ "id": "layout:/", "version": 0, "html": "x", "retain": false }],
            "scroll": { "x": 0.0, "y": 0.0 },
            "routePath": "/"
        });
        assert!(ClientSnapshot::from_state(&no_route).is_none());
    }

    #[test]
    fn test_relative_url() {
        let url = Url::parse("http://h/a/b?x=1#top").unwrap();
        assert_eq!(relative_url(&url), "/a/b?x=1#top");
    }
}
