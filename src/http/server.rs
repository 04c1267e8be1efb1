//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the render handler and the router script
//! - Wire up middleware (request id, tracing)
//! - Decode the request path; undecodable paths are 400
//! - Map render results to responses: stream, JSON, 404, 500
//! - Serve until the shutdown coordinator fires

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures_util::StreamExt;
use percent_encoding::percent_decode_str;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::http::request::{PartialRequest, SequentialRequestId};
use crate::observability::metrics;
use crate::protocol::CLIENT_SCRIPT_PATH;
use crate::render::script::CLIENT_SCRIPT;
use crate::render::RenderedOutput;
use crate::routing::RouteManifest;

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
const SCRIPT_CONTENT_TYPE: &str = "text/javascript; charset=utf-8";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub manifest: Arc<RouteManifest>,
}

/// HTTP front end for the route manifest.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(manifest: Arc<RouteManifest>) -> Self {
        let router = Self::build_router(AppState { manifest });
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(state: AppState) -> Router {
        Router::new()
            .route(CLIENT_SCRIPT_PATH, get(script_handler))
            .route("/", get(render_handler))
            .route("/{*path}", get(render_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(SequentialRequestId::default()))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown signal arrives on `shutdown`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn script_handler() -> Response {
    (
        [
            (header::CONTENT_TYPE, SCRIPT_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        CLIENT_SCRIPT,
    )
        .into_response()
}

async fn render_handler(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Response {
    let start = Instant::now();
    let request = PartialRequest::from_parts(&uri, &headers);
    let kind = if request.stack_only { "stack" } else { "document" };
    let path = match percent_decode_str(uri.path()).decode_utf8() {
        Ok(path) => path.into_owned(),
        Err(_) => {
            tracing::debug!(path = uri.path(), "Request path is not valid UTF-8");
            metrics::record_render(kind, 400, start);
            return (StatusCode::BAD_REQUEST, "Bad Request").into_response();
        }
    };

    tracing::debug!(
        %path,
        kind,
        current = request.current_route_path.as_deref().unwrap_or(""),
        "Rendering"
    );

    let options = request.into_options();
    match state.manifest.render(&path, &options).await {
        Ok(Some(RenderedOutput::Document(document))) => {
            metrics::record_render(kind, 200, start);
            let body = Body::from_stream(document.into_stream().map(Ok::<_, Infallible>));
            (
                [(header::CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE))],
                body,
            )
                .into_response()
        }
        Ok(Some(RenderedOutput::Stack(payload))) => {
            metrics::record_render(kind, 200, start);
            (
                [(header::CACHE_CONTROL, HeaderValue::from_static("no-store"))],
                Json(payload),
            )
                .into_response()
        }
        Ok(None) => {
            metrics::record_render(kind, 404, start);
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
        Err(e) => {
            tracing::error!(%path, kind, error = %e, "Render failed");
            metrics::record_render(kind, 500, start);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeMode;
    use crate::modules::TemplateLoader;
    use crate::routing::ManifestSettings;
    use axum::http::Request;
    use std::fs;
    use std::path::Path;
    use std::time::Duration;
    use tower::ServiceExt;

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn router(dir: &Path) -> Router {
        write(dir, "root.html", "<body>{{ children }}</body>");
        write(dir, "routes/(site)/_layout.html", "<nav></nav>{{ children }}");
        write(dir, "routes/(site)/index.html", "<h1>home</h1>");
        write(dir, "routes/(site)/about.html", "<h1>about</h1>");

        let manifest = RouteManifest::new(
            ManifestSettings {
                routes_root: dir.join("routes"),
                root_template: dir.join("root.html"),
                mode: RuntimeMode::Prod,
                shell_timeout: Duration::from_secs(5),
            },
            Arc::new(TemplateLoader::new()),
        );
        HttpServer::new(Arc::new(manifest)).router()
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, HeaderMap, String) {
        let res = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let headers = res.headers().clone();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_document_response() {
        let dir = tempfile::tempdir().unwrap();
        let (status, headers, body) = get(router(dir.path()), "/about").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], HTML_CONTENT_TYPE);
        assert!(headers.contains_key(crate::http::X_REQUEST_ID));
        assert!(body.starts_with("<!DOCTYPE html><body>"));
        assert!(body.contains("data-stack-id=\"route:/about\""));
        assert!(!body.contains("data-stack-id=\"route:/\""));
        assert!(body.ends_with("<script src=\"/_stack/router.js\" defer></script></body>"));
    }

    #[tokio::test]
    async fn test_router_script_is_served() {
        let dir = tempfile::tempdir().unwrap();
        let (status, headers, body) = get(router(dir.path()), CLIENT_SCRIPT_PATH).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], SCRIPT_CONTENT_TYPE);
        assert_eq!(body, CLIENT_SCRIPT);
    }

    #[tokio::test]
    async fn test_stack_response() {
        let dir = tempfile::tempdir().unwrap();
        let (status, headers, body) =
            get(router(dir.path()), "/about?_stack=1&_stack_current=/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["routePath"], "/about");
        assert_eq!(json["frames"][0]["retain"], true);
        assert_eq!(json["frames"][1]["html"], "<h1>about</h1>");
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let router = router(dir.path());

        let (status, _, body) = get(router.clone(), "/nowhere").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Not Found");

        fs::remove_file(dir.path().join("root.html")).unwrap();
        let (status, _, body) = get(router, "/").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Internal Server Error");
    }
}
