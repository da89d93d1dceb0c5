//! Object key naming for report photos.

use std::path::Path;

/// Content type recorded when an upload does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

const DEFAULT_EXTENSION: &str = ".jpg";

/// Extension of the uploaded filename, including the dot, or `.jpg`.
///
/// Case is preserved. Dotfiles and trailing dots count as "no extension".
pub fn photo_extension(filename: Option<&str>) -> String {
    filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// `reports/<report_id>/photo<ext>`
pub fn photo_key(report_id: &str, filename: Option<&str>) -> String {
    format!("reports/{report_id}/photo{}", photo_extension(filename))
}

/// Whether a MIME type is for an image.
pub fn is_image(mime: &str) -> bool {
    mime.starts_with("image/")
}
