//! Client for the vedit processing backend.
//!
//! This crate wraps the backend's HTTP surface: health probe, artifact
//! upload, job submission, status query and result download. Every call is
//! bounded by an explicit per-endpoint timeout; nothing blocks indefinitely.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::BackendClient;
pub use config::BackendConfig;
pub use error::{ClientError, ClientResult};
pub use types::{HealthReport, SubmitAck, UploadResponse};
