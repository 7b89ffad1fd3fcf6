//! Shared data models for the vedit processing orchestrator.
//!
//! This crate provides Serde-serializable types for:
//! - Operations and their per-operation settings
//! - Job stages and the canonical status record
//! - Wire-level request/response shapes for the processing backend

pub mod operation;
pub mod stage;
pub mod status;

// Re-export common types
pub use operation::{
    BackgroundMode, BackgroundSettings, BackgroundTarget, GazeSettings, Operation, ProcessRequest,
    ScaleFactor, SilenceSettings, SubtitleSettings, UpscaleQuality, UpscaleSettings,
};
pub use stage::{Stage, StageParseError};
pub use status::{JobStatus, JobUpdate, StatusResponse};
