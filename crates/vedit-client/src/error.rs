//! Backend client error types.

use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failed before any response arrived.
    #[error("Backend unreachable: {0}")]
    Connectivity(#[source] reqwest::Error),

    /// The per-endpoint bound was exceeded.
    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    /// Upload reached the backend but was refused.
    #[error("Upload rejected ({status}): {reason}")]
    UploadRejected { status: u16, reason: String },

    /// Submission reached the backend but was refused.
    #[error("Submission rejected ({status}): {reason}")]
    SubmissionRejected { status: u16, reason: String },

    /// Status query returned a non-success code.
    #[error("Status check failed ({status})")]
    StatusRejected { status: u16 },

    /// Response body did not match the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Local filesystem error while saving a download.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Whether the poller should swallow this error and retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ClientError::Connectivity(_)
                | ClientError::Timeout(_)
                | ClientError::StatusRejected { .. }
        )
    }

    /// Whether this error indicates the backend may be down, as opposed to
    /// a single flaky request.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout(_))
    }
}
