pub mod error;
pub mod traits;
pub mod types;

pub use error::ReportError;
pub use traits::{LlmProvider, LlmRequest, LlmResponse, ObjectStorage, VisionProvider};
pub use types::{DetectedLabel, Evaluation, ImageRef, Report, Verdict, UNPARSABLE_SUMMARY};
