//! Stack payload requests.

use futures_util::future::LocalBoxFuture;
use thiserror::Error;
use url::Url;

use crate::protocol::{
    encode_versions, StackPayload, CURRENT_HEADER, CURRENT_PARAM, ROUTER_HEADER, STACK_PARAM,
    VERSIONS_PARAM,
};

/// Value of the router header on client requests.
pub const ROUTER_HEADER_VALUE: &str = "navigate";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("server responded with status {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed stack payload: {0}")]
    Decode(String),
}

/// A partial-navigation request ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackRequest {
    pub url: Url,
    pub headers: Vec<(&'static str, String)>,
}

impl StackRequest {
    /// Request for `target`'s stack diff against `current_route_path`.
    pub fn new(target: &Url, current_route_path: Option<&str>, live_versions: &[u64]) -> Self {
        let mut url = target.clone();
        url.set_fragment(None);

        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !matches!(key.as_ref(), STACK_PARAM | CURRENT_PARAM | VERSIONS_PARAM))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        {
            let mut query = url.query_pairs_mut();
            query.clear();
            query.extend_pairs(kept);
            query.append_pair(STACK_PARAM, "1");
            if let Some(current) = current_route_path {
                query.append_pair(CURRENT_PARAM, current);
            }
            if !live_versions.is_empty() {
                query.append_pair(VERSIONS_PARAM, &encode_versions(live_versions));
            }
        }

        let mut headers = vec![
            ("accept", "application/json".to_string()),
            (ROUTER_HEADER, ROUTER_HEADER_VALUE.to_string()),
        ];
        if let Some(current) = current_route_path {
            headers.push((CURRENT_HEADER, current.to_string()));
        }

        Self { url, headers }
    }
}

/// Transport for stack requests. Futures are dropped when a newer
/// navigation supersedes them.
pub trait StackFetcher {
    fn fetch(&self, request: StackRequest) -> LocalBoxFuture<'static, Result<StackPayload, FetchError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_markers() {
        let target = Url::parse("http://localhost:3000/about?tab=2&_stack=0#team").unwrap();
        let request = StackRequest::new(&target, Some("/"), &[1, 0]);

        assert_eq!(
            request.url.as_str(),
            "http://localhost:3000/about?tab=2&_stack=1&_stack_current=%2F&_stack_versions=1.0"
        );
        assert!(request.headers.contains(&("x-stack-router", "navigate".to_string())));
        assert!(request.headers.contains(&("x-stack-current", "/".to_string())));
    }

    #[test]
    fn test_request_without_hint() {
        let target = Url::parse("http://localhost:3000/shop").unwrap();
        let request = StackRequest::new(&target, None, &[]);
        assert_eq!(request.url.as_str(), "http://localhost:3000/shop?_stack=1");
        assert_eq!(request.headers.len(), 2);
    }
}
