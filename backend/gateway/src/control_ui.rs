//! Front-end pages and static assets.

use std::path::Path;

use accessplus_core::ReportError;
use axum::{extract::State, response::Html};
use tower_http::services::ServeDir;

use crate::error::ApiError;
use crate::server::GatewayState;

/// Serves `/static/*` from the configured directory.
pub fn static_service(static_dir: &Path) -> ServeDir {
    ServeDir::new(static_dir)
}

async fn read_page(static_dir: &Path, filename: &str) -> Result<Html<String>, ApiError> {
    tokio::fs::read_to_string(static_dir.join(filename))
        .await
        .map(Html)
        .map_err(|_| ReportError::MissingAsset(filename.to_string()).into())
}

/// Handler for `GET /`, the report submission form.
pub async fn index_page(State(state): State<GatewayState>) -> Result<Html<String>, ApiError> {
    read_page(&state.static_dir, "index.html").await
}

/// Handler for `GET /map`, the live report map.
pub async fn map_page(State(state): State<GatewayState>) -> Result<Html<String>, ApiError> {
    read_page(&state.static_dir, "map.html").await
}
