//! HTTP mapping for report errors. Every failure body is `{"detail": "..."}`.

use accessplus_core::ReportError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

pub struct ApiError(pub ReportError);

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ReportError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            ReportError::NotFound(_) | ReportError::MissingObject(_) => StatusCode::NOT_FOUND,
            ReportError::Vision { .. } | ReportError::Llm { .. } => StatusCode::BAD_GATEWAY,
            ReportError::Storage(_)
            | ReportError::ManifestUnavailable(_)
            | ReportError::MissingAsset(_)
            | ReportError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, %status, "Request failed");
        } else {
            warn!(error = %self.0, %status, "Request rejected");
        }
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}
