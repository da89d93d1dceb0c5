//! Image understanding for reports: label detection and description comparison.

pub mod compare;
pub mod mock;
pub mod openai;
pub mod vision;

pub use compare::{build_prompt, parse_reply, Comparator, SYSTEM_PROMPT};
pub use mock::{MockProvider, MockVision};
pub use openai::OpenAiProvider;
pub use vision::{filter_labels, LabelDetector, RekognitionProvider};
