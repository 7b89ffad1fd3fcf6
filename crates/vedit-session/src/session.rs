//! Session identity and creation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use vedit_client::{BackendClient, ClientError};

use crate::availability::Availability;
use crate::error::SessionError;

/// Server-side binding between an uploaded artifact and an opaque id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Backend-issued identifier
    pub id: String,
    /// Name of the uploaded artifact
    pub artifact_name: String,
    /// When the upload succeeded
    pub created_at: DateTime<Utc>,
}

/// Owns the one live session.
///
/// A successful upload replaces any existing session; callers must stop
/// polling a superseded session (the orchestrator drops the old job handle,
/// which stops its poller).
pub struct SessionManager {
    client: Arc<BackendClient>,
    availability: Availability,
    current: Option<Session>,
}

impl SessionManager {
    pub fn new(client: Arc<BackendClient>, availability: Availability) -> Self {
        Self {
            client,
            availability,
            current: None,
        }
    }

    /// The live session, if any.
    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Upload an artifact and bind the returned session id.
    ///
    /// A known-false availability flag short-circuits without touching the
    /// network; a stale positive is acceptable and the upload itself will
    /// correct the flag on transport failure.
    pub async fn create_session(
        &mut self,
        artifact_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Session, SessionError> {
        if !self.availability.get() {
            return Err(SessionError::Unavailable);
        }
        if bytes.is_empty() {
            return Err(SessionError::EmptyArtifact);
        }

        let response = match self.client.upload(artifact_name, bytes).await {
            Ok(response) => response,
            Err(e) => {
                if matches!(e, ClientError::Connectivity(_) | ClientError::Timeout(_)) {
                    self.availability.set(false);
                }
                return Err(e.into());
            }
        };

        info!(session_id = %response.session_id, artifact_name, "Session created");
        self.availability.set(true);
        let session = Session {
            id: response.session_id,
            artifact_name: artifact_name.to_string(),
            created_at: Utc::now(),
        };
        self.current = Some(session.clone());
        Ok(session)
    }
}
