//! Job stage definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Processing stage of a job.
///
/// Stages advance in order while a job is healthy:
/// `Idle -> Analyzing -> Processing -> Encoding -> Completed`.
/// `Error` is a parallel terminal reachable from any non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// No job submitted yet
    #[default]
    Idle,
    /// Backend is inspecting the input
    Analyzing,
    /// Main transformation is running
    Processing,
    /// Output is being encoded
    Encoding,
    /// Job finished successfully
    Completed,
    /// Job failed
    Error,
}

impl Stage {
    /// Get string representation of the stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Analyzing => "analyzing",
            Stage::Processing => "processing",
            Stage::Encoding => "encoding",
            Stage::Completed => "completed",
            Stage::Error => "error",
        }
    }

    /// Check if this is a terminal stage (no more polling expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Completed | Stage::Error)
    }

    /// Decode a backend-reported stage string for a still-running job.
    ///
    /// The backend's status object is ad-hoc; a missing or unrecognized
    /// stage is treated as `Processing`. A terminal stage string on a
    /// running update contradicts the outer status and is clamped to
    /// `Processing` as well, so only the status field decides termination.
    pub fn from_wire(s: Option<&str>) -> Stage {
        match s.and_then(|s| s.parse::<Stage>().ok()) {
            Some(stage) if !stage.is_terminal() => stage,
            _ => Stage::Processing,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Stage {
    type Err = StageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "idle" => Ok(Stage::Idle),
            "analyzing" => Ok(Stage::Analyzing),
            "processing" => Ok(Stage::Processing),
            "encoding" => Ok(Stage::Encoding),
            "completed" => Ok(Stage::Completed),
            "error" => Ok(Stage::Error),
            _ => Err(StageParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown stage: {0}")]
pub struct StageParseError(String);
