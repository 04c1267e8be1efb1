//! Request parsing: partial-navigation markers and request ids.
//!
//! # Responsibilities
//! - Tell a stack-only request from a document request
//! - Extract the client's current route hint (query first, then header)
//! - Number requests for correlation in logs

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};

use crate::protocol::{decode_versions, CURRENT_HEADER, CURRENT_PARAM, STACK_PARAM, VERSIONS_PARAM};
use crate::render::RenderOptions;

/// Header carrying the request id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Render-relevant view of an incoming request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialRequest {
    pub stack_only: bool,
    pub current_route_path: Option<String>,
    pub client_versions: Option<Vec<u64>>,
}

impl PartialRequest {
    pub fn from_parts(uri: &Uri, headers: &HeaderMap) -> Self {
        let mut request = Self::default();
        let mut current_from_query = None;

        if let Some(query) = uri.query() {
            for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
                match key.as_ref() {
                    STACK_PARAM => request.stack_only = is_truthy(&value),
                    CURRENT_PARAM if !value.is_empty() => current_from_query = Some(value.into_owned()),
                    VERSIONS_PARAM => request.client_versions = decode_versions(&value),
                    _ => {}
                }
            }
        }

        if !request.stack_only {
            request.client_versions = None;
            return request;
        }

        request.current_route_path = current_from_query.or_else(|| {
            headers
                .get(CURRENT_HEADER)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        });
        request
    }

    pub fn into_options(self) -> RenderOptions {
        RenderOptions {
            stack_only: self.stack_only,
            current_route_path: self.current_route_path,
            client_versions: self.client_versions,
        }
    }
}

fn is_truthy(value: &str) -> bool {
    !matches!(value, "0" | "false")
}

/// Sequential request ids.
#[derive(Debug, Clone, Default)]
pub struct SequentialRequestId {
    counter: Arc<AtomicU64>,
}

impl MakeRequestId for SequentialRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        HeaderValue::from_str(&id.to_string()).ok().map(RequestId::new)
    }
}
