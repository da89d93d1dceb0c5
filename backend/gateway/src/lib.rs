//! AccessPlus HTTP gateway.
//!
//! Accepts report uploads, runs them through the label/compare/store pipeline,
//! and serves the report feed and front-end pages.

pub mod control_ui;
pub mod error;
pub mod health_api;
pub mod pipeline;
pub mod reports;
pub mod server;

pub use pipeline::{ReportPipeline, Submission};
pub use server::{build_router, start_server, GatewayState};
