//! Main HTTP server: route wiring and startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::pipeline::ReportPipeline;
use crate::reports::MAX_IMAGE_BYTES;
use crate::{control_ui, health_api, reports};

/// Largest accepted request body: one maximum-size image plus the text fields.
/// Replaces axum's 2 MB default, which is smaller than most phone photos.
pub const MAX_UPLOAD_BYTES: usize = MAX_IMAGE_BYTES + 1024 * 1024;

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub pipeline: Arc<ReportPipeline>,
    pub static_dir: Arc<PathBuf>,
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(pipeline: ReportPipeline, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            static_dir: Arc::new(static_dir.into()),
            started_at: Instant::now(),
        }
    }
}

/// Build the router with all report, page, and health routes.
pub fn build_router(state: GatewayState) -> Router {
    let static_files = control_ui::static_service(&state.static_dir);
    Router::new()
        .route("/", get(control_ui::index_page))
        .route("/map", get(control_ui::map_page))
        .route(
            "/reports",
            get(reports::list_reports).post(reports::create_report),
        )
        .route("/reports/:id", get(reports::get_report))
        .route("/api/health", get(health_api::get_health))
        .nest_service("/static", static_files)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the Axum HTTP server and runs until ctrl-c.
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, state: GatewayState) -> Result<()> {
    let app = build_router(state);

    info!("AccessPlus HTTP server listening on {}", addr);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tests::{harness, GOOD_REPLY};
    use accessplus_core::ObjectStorage;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const BOUNDARY: &str = "accessplus-test-boundary";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a [u8]),
    }

    fn multipart(parts: &[Part]) -> Request<Body> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                            .as_bytes(),
                    );
                }
                Part::File(filename, content_type, data) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/reports")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn static_dir() -> PathBuf {
        PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../static"))
    }

    #[tokio::test]
    async fn upload_returns_persisted_report() {
        let h = harness(GOOD_REPLY);
        let storage = h.storage.clone();
        let app = build_router(GatewayState::new(h.pipeline, static_dir()));

        let response = app
            .clone()
            .oneshot(multipart(&[
                Part::File("ramp.png", "image/png", b"image-bytes"),
                Part::Text("description", "ramp with tactile paving"),
                Part::Text("latitude", "40.712800"),
                Part::Text("longitude", "-74.006000"),
            ]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let report = json_body(response).await;
        assert_eq!(
            report["ai_verdict"],
            json!({"match_summary": "Good match", "mismatches": [], "confidence": 92})
        );
        assert_eq!(report["labels"], json!(["Ramp", "Sidewalk", "Pavement"]));
        assert_eq!(report["latitude"], 40.7128);
        let id = report["id"].as_str().unwrap().to_string();
        assert_eq!(report["image"]["key"], format!("reports/{id}/photo.png"));

        let stored = storage
            .get_object(&format!("reports/{id}/photo.png"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.as_ref(), b"image-bytes");

        let feed = json_body(app.clone().oneshot(get("/reports")).await.unwrap()).await;
        assert_eq!(feed.as_array().unwrap().len(), 1);

        let one = app.oneshot(get(&format!("/reports/{id}"))).await.unwrap();
        assert_eq!(one.status(), StatusCode::OK);
        assert_eq!(json_body(one).await["id"], id.as_str());
    }

    #[tokio::test]
    async fn missing_file_is_bad_request() {
        let h = harness(GOOD_REPLY);
        let app = build_router(GatewayState::new(h.pipeline, static_dir()));
        let response = app
            .oneshot(multipart(&[Part::Text("description", "ramp")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["detail"],
            "invalid upload: file is required"
        );
    }

    #[tokio::test]
    async fn missing_description_is_bad_request() {
        let h = harness(GOOD_REPLY);
        let app = build_router(GatewayState::new(h.pipeline, static_dir()));
        let response = app
            .oneshot(multipart(&[Part::File("ramp.jpg", "image/jpeg", b"x")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_image_is_rejected_before_detection() {
        let h = harness(GOOD_REPLY);
        let storage = h.storage.clone();
        let app = build_router(GatewayState::new(h.pipeline, static_dir()));
        let image = vec![0u8; MAX_IMAGE_BYTES + 1];
        let response = app
            .oneshot(multipart(&[
                Part::File("ramp.jpg", "image/jpeg", &image),
                Part::Text("description", "ramp"),
            ]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let detail = json_body(response).await["detail"].as_str().unwrap().to_string();
        assert!(detail.contains("images must be at most 5242880 bytes"));
        assert!(storage.list_keys(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_feed_when_manifest_missing() {
        let h = harness(GOOD_REPLY);
        let app = build_router(GatewayState::new(h.pipeline, static_dir()));
        let response = app.oneshot(get("/reports")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!([]));
    }

    #[tokio::test]
    async fn unknown_report_is_not_found() {
        let h = harness(GOOD_REPLY);
        let app = build_router(GatewayState::new(h.pipeline, static_dir()));
        let response = app.oneshot(get("/reports/does-not-exist")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn serves_index_page() {
        let h = harness(GOOD_REPLY);
        let app = build_router(GatewayState::new(h.pipeline, static_dir()));
        let response = app.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_page_is_server_error() {
        let h = harness(GOOD_REPLY);
        let app = build_router(GatewayState::new(h.pipeline, "/nonexistent/static"));
        let response = app.oneshot(get("/map")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await["detail"],
            "Missing static asset: map.html"
        );
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let h = harness(GOOD_REPLY);
        let app = build_router(GatewayState::new(h.pipeline, static_dir()));
        let body = json_body(app.oneshot(get("/api/health")).await.unwrap()).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["manifest_key"], "reports/index.json");
    }
}
