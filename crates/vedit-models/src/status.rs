//! Canonical job status and the backend status decode.
//!
//! The backend reports status as a single ad-hoc object with every field
//! optional. [`StatusResponse`] mirrors that shape on the wire and is
//! immediately decoded into the tagged [`JobUpdate`], which is what the
//! poller consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// Snapshot of a job as tracked by the client.
///
/// Progress is backend-authoritative and never interpolated. It is clamped
/// to [0, 100] and, while the job is non-terminal, never decreases even if
/// the backend reports out-of-order values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    /// Current stage
    pub stage: Stage,
    /// Progress percentage (0-100)
    pub progress: f32,
    /// Human-readable current-activity description
    pub message: String,
    /// When the status was last updated
    pub updated_at: DateTime<Utc>,
}

impl JobStatus {
    /// Status before any job has been submitted.
    pub fn idle() -> Self {
        Self {
            stage: Stage::Idle,
            progress: 0.0,
            message: "Waiting".to_string(),
            updated_at: Utc::now(),
        }
    }

    /// Status right after a successful submission.
    ///
    /// An optimistic floor of 10% so callers never observe 0% during the
    /// submission round-trip.
    pub fn submitted() -> Self {
        Self {
            stage: Stage::Analyzing,
            progress: 10.0,
            message: "Starting processing".to_string(),
            updated_at: Utc::now(),
        }
    }

    /// Check if the job is in a terminal stage.
    pub fn is_terminal(&self) -> bool {
        self.stage.is_terminal()
    }

    /// Apply a backend-reported update.
    pub fn apply(&mut self, update: &JobUpdate) {
        match update {
            JobUpdate::Running {
                stage,
                progress,
                message,
            } => {
                self.stage = *stage;
                self.set_progress(*progress);
                self.message = message.clone();
            }
            JobUpdate::Completed => {
                self.stage = Stage::Completed;
                self.progress = 100.0;
                self.message = "Completed".to_string();
            }
            JobUpdate::Failed { reason } => {
                self.stage = Stage::Error;
                self.message = reason.clone();
            }
        }
        self.updated_at = Utc::now();
    }

    /// Mark the job failed with the given reason.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.stage = Stage::Error;
        self.message = reason.into();
        self.updated_at = Utc::now();
    }

    fn set_progress(&mut self, reported: f32) {
        let clamped = reported.clamp(0.0, 100.0);
        // Monotonic while non-terminal: a late lower report never
        // walks the displayed value backwards.
        if clamped > self.progress {
            self.progress = clamped;
        }
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        Self::idle()
    }
}

/// Raw body of `GET /status/{session_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Coarse state: "processing" | "completed" | "error" (free-form)
    pub status: String,
    /// Current stage name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    /// Progress percentage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f32>,
    /// Activity description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error description, present on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Decoded status update.
#[derive(Debug, Clone, PartialEq)]
pub enum JobUpdate {
    /// Job is still advancing
    Running {
        stage: Stage,
        progress: f32,
        message: String,
    },
    /// Job finished successfully
    Completed,
    /// Job failed with a reason
    Failed { reason: String },
}

impl JobUpdate {
    /// Fallback reason when the backend omits the error message.
    pub const GENERIC_FAILURE: &'static str = "Processing failed";

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobUpdate::Running { .. })
    }
}

impl From<StatusResponse> for JobUpdate {
    fn from(raw: StatusResponse) -> Self {
        match raw.status.as_str() {
            "completed" => JobUpdate::Completed,
            "error" => JobUpdate::Failed {
                reason: raw
                    .error
                    .or(raw.message)
                    .unwrap_or_else(|| JobUpdate::GENERIC_FAILURE.to_string()),
            },
            _ => JobUpdate::Running {
                stage: Stage::from_wire(raw.stage.as_deref()),
                progress: raw.progress.unwrap_or(0.0),
                message: raw.message.unwrap_or_else(|| "Processing".to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(stage: Stage, progress: f32) -> JobUpdate {
        JobUpdate::Running {
            stage,
            progress,
            message: "working".to_string(),
        }
    }

    #[test]
    fn test_progress_clamped() {
        let mut status = JobStatus::submitted();
        status.apply(&running(Stage::Processing, 250.0));
        assert_eq!(status.progress, 100.0);

        let mut status = JobStatus::submitted();
        status.apply(&running(Stage::Processing, -5.0));
        assert_eq!(status.progress, 10.0);
    }

    #[test]
    fn test_progress_monotonic_while_running() {
        let mut status = JobStatus::submitted();
        status.apply(&running(Stage::Processing, 70.0));
        assert_eq!(status.progress, 70.0);
        // Out-of-order lower report must not walk progress backwards.
        status.apply(&running(Stage::Processing, 30.0));
        assert_eq!(status.progress, 70.0);
    }

    #[test]
    fn test_completed_forces_full_progress() {
        let mut status = JobStatus::submitted();
        status.apply(&running(Stage::Encoding, 90.0));
        status.apply(&JobUpdate::Completed);
        assert_eq!(status.stage, Stage::Completed);
        assert_eq!(status.progress, 100.0);
        assert!(status.is_terminal());
    }

    #[test]
    fn test_decode_running() {
        let raw = StatusResponse {
            status: "processing".to_string(),
            stage: Some("encoding".to_string()),
            progress: Some(90.0),
            message: Some("Encoding output".to_string()),
            error: None,
        };
        assert_eq!(
            JobUpdate::from(raw),
            JobUpdate::Running {
                stage: Stage::Encoding,
                progress: 90.0,
                message: "Encoding output".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_running_with_missing_fields() {
        let raw = StatusResponse {
            status: "processing".to_string(),
            stage: None,
            progress: None,
            message: None,
            error: None,
        };
        match JobUpdate::from(raw) {
            JobUpdate::Running {
                stage, progress, ..
            } => {
                assert_eq!(stage, Stage::Processing);
                assert_eq!(progress, 0.0);
            }
            other => panic!("expected Running, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_running_with_terminal_stage_stays_running() {
        // Only the status field decides termination; a stray terminal
        // stage name on a running update is clamped.
        let raw = StatusResponse {
            status: "processing".to_string(),
            stage: Some("completed".to_string()),
            progress: Some(80.0),
            message: None,
            error: None,
        };
        match JobUpdate::from(raw) {
            JobUpdate::Running { stage, .. } => assert_eq!(stage, Stage::Processing),
            other => panic!("expected Running, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_failure_with_fallback_reason() {
        let raw = StatusResponse {
            status: "error".to_string(),
            stage: None,
            progress: None,
            message: None,
            error: None,
        };
        assert_eq!(
            JobUpdate::from(raw),
            JobUpdate::Failed {
                reason: JobUpdate::GENERIC_FAILURE.to_string(),
            }
        );
    }

    #[test]
    fn test_failure_reason_applied() {
        let mut status = JobStatus::submitted();
        status.apply(&JobUpdate::Failed {
            reason: "model crashed".to_string(),
        });
        assert_eq!(status.stage, Stage::Error);
        assert_eq!(status.message, "model crashed");
        assert!(status.is_terminal());
    }
}
