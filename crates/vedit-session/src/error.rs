//! Orchestrator error types.

use thiserror::Error;

use vedit_client::ClientError;

/// Errors from session creation (upload).
#[derive(Debug, Error)]
pub enum SessionError {
    /// Availability was known-false; no network call was made.
    #[error("Backend is not available")]
    Unavailable,

    /// Empty artifacts are rejected before any network call.
    #[error("Artifact is empty")]
    EmptyArtifact,

    /// Transport or backend failure during upload.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Errors from job submission.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// No session has been created yet.
    #[error("No session; upload an artifact first")]
    NoSession,

    /// A job is already in flight for this session.
    #[error("A job is already active for this session")]
    JobActive,

    /// Availability gate failed before or at submission time.
    #[error("Backend is not available")]
    Unavailable,

    /// Transport or backend failure during submission.
    #[error(transparent)]
    Client(#[from] ClientError),
}
