//! Object storage for report photos and the report manifest.

pub mod backend;
pub mod credentials;
pub mod images;
pub mod keys;
pub mod manifest;

pub use backend::{MemoryStorage, S3Storage};
pub use credentials::{sdk_credentials, SdkCredentials};
pub use images::{ImageStore, SIGNED_URL_TTL};
pub use keys::{photo_extension, photo_key, DEFAULT_CONTENT_TYPE};
pub use manifest::ReportIndex;
