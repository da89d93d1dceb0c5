//! Report endpoints: multipart submission and the map feed.

use accessplus_core::{Report, ReportError};
use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use bytes::Bytes;
use tracing::info;

use crate::error::ApiError;
use crate::pipeline::Submission;
use crate::server::GatewayState;

/// Rekognition rejects inline image bytes above 5 MB.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

fn bad_request(message: impl Into<String>) -> ReportError {
    ReportError::InvalidUpload(message.into())
}

/// Optional coordinate field. Blank means "not provided".
fn parse_coordinate(name: &str, raw: &str, limit: f64) -> Result<Option<f64>, ReportError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value: f64 = raw
        .parse()
        .map_err(|_| bad_request(format!("{name} must be a number")))?;
    if !value.is_finite() || value.abs() > limit {
        return Err(bad_request(format!("{name} must be between -{limit} and {limit}")));
    }
    Ok(Some(value))
}

/// Pull the upload fields out of the form.
///
/// Expects `file` and `description`; `latitude` and `longitude` are optional.
/// Unknown fields are ignored.
pub async fn read_submission(mut multipart: Multipart) -> Result<Submission, ReportError> {
    let mut file: Option<(Option<String>, Option<String>, Bytes)> = None;
    let mut description = None;
    let mut latitude = None;
    let mut longitude = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(|e| bad_request(e.body_text()))?;
                file = Some((filename, content_type, data));
            }
            Some("description") => {
                description = Some(field.text().await.map_err(|e| bad_request(e.body_text()))?);
            }
            Some("latitude") => {
                let raw = field.text().await.map_err(|e| bad_request(e.body_text()))?;
                latitude = parse_coordinate("latitude", &raw, 90.0)?;
            }
            Some("longitude") => {
                let raw = field.text().await.map_err(|e| bad_request(e.body_text()))?;
                longitude = parse_coordinate("longitude", &raw, 180.0)?;
            }
            _ => {}
        }
    }

    let (filename, content_type, data) = file.ok_or_else(|| bad_request("file is required"))?;
    if data.is_empty() {
        return Err(bad_request("file is empty"));
    }
    if data.len() > MAX_IMAGE_BYTES {
        return Err(bad_request(format!(
            "file is {} bytes; images must be at most {MAX_IMAGE_BYTES} bytes",
            data.len()
        )));
    }
    let description = description
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| bad_request("description is required"))?;

    Ok(Submission {
        description,
        filename,
        content_type,
        data,
        latitude,
        longitude,
    })
}

/// Handler for `POST /reports`.
pub async fn create_report(
    State(state): State<GatewayState>,
    multipart: Multipart,
) -> Result<Json<Report>, ApiError> {
    let submission = read_submission(multipart).await?;
    info!(
        bytes = submission.data.len(),
        filename = submission.filename.as_deref().unwrap_or("-"),
        has_location = submission.latitude.is_some() && submission.longitude.is_some(),
        "Received report upload"
    );
    let report = state.pipeline.submit(submission).await?;
    Ok(Json(report))
}

/// Handler for `GET /reports`: the whole manifest, for the map feed.
pub async fn list_reports(State(state): State<GatewayState>) -> Result<Json<Vec<Report>>, ApiError> {
    Ok(Json(state.pipeline.index().load().await?))
}

/// Handler for `GET /reports/:id`.
pub async fn get_report(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<Report>, ApiError> {
    Ok(Json(state.pipeline.index().find(&id).await?))
}
