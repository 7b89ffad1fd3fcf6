//! Session orchestrator facade.

use std::sync::Arc;

use tracing::{debug, info};

use vedit_client::{BackendClient, ClientError};
use vedit_models::{JobStatus, Operation};

use crate::availability::{Availability, HealthMonitor};
use crate::error::{SessionError, SubmitError};
use crate::poller::{JobHandle, JobResult, PollerConfig};
use crate::session::{Session, SessionManager};

/// Orchestrates one processing session end to end.
///
/// Drives the health gate, upload, submission and polling in order, and
/// enforces the single-active-job rule as an explicit guard so the core is
/// safe to drive from any caller, not just a UI.
pub struct ProcessingSession {
    client: Arc<BackendClient>,
    availability: Availability,
    monitor: HealthMonitor,
    sessions: SessionManager,
    poller_config: PollerConfig,
    job: Option<JobHandle>,
    last_status: JobStatus,
}

impl ProcessingSession {
    /// Create an orchestrator over the given backend client.
    pub fn new(client: BackendClient, poller_config: PollerConfig) -> Self {
        let client = Arc::new(client);
        let availability = Availability::new();
        Self {
            monitor: HealthMonitor::new(Arc::clone(&client), availability.clone()),
            sessions: SessionManager::new(Arc::clone(&client), availability.clone()),
            client,
            availability,
            poller_config,
            job: None,
            last_status: JobStatus::idle(),
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        Self::new(BackendClient::from_env(), PollerConfig::from_env())
    }

    /// Backend client shared with the poller.
    pub fn client(&self) -> Arc<BackendClient> {
        Arc::clone(&self.client)
    }

    /// Shared availability flag.
    pub fn availability(&self) -> Availability {
        self.availability.clone()
    }

    /// Refresh the availability flag with a live probe.
    pub async fn check_backend(&self) -> bool {
        self.monitor.check().await
    }

    /// The live session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.sessions.current()
    }

    /// Upload an artifact and start a fresh session.
    ///
    /// Only a successful upload replaces the existing session; on failure
    /// the previous session and any in-flight job are left untouched. On
    /// success the superseded job is cancelled and its state discarded.
    pub async fn create_session(
        &mut self,
        artifact_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Session, SessionError> {
        let session = self.sessions.create_session(artifact_name, bytes).await?;
        if let Some(old) = self.job.take() {
            debug!(session_id = %old.session_id(), "Discarding job of superseded session");
            old.cancel();
        }
        self.last_status = JobStatus::idle();
        Ok(session)
    }

    /// Submit an operation against the live session.
    ///
    /// Preconditions are checked before any network call: a session exists,
    /// no job is active, and availability is not known-false. Availability
    /// is then re-probed at submission time rather than reused from upload
    /// time.
    pub async fn submit(&mut self, operation: Operation) -> Result<JobHandle, SubmitError> {
        let session_id = self
            .sessions
            .current()
            .map(|s| s.id.clone())
            .ok_or(SubmitError::NoSession)?;

        if let Some(job) = &self.job {
            if !job.status().is_terminal() {
                return Err(SubmitError::JobActive);
            }
        }

        if !self.availability.get() {
            return Err(SubmitError::Unavailable);
        }
        if !self.monitor.check().await {
            return Err(SubmitError::Unavailable);
        }

        let request = operation.to_request();
        match self.client.submit(&session_id, &request).await {
            Ok(ack) => {
                debug!(
                    session_id = %session_id,
                    ack_operation = ack.operation.as_deref().unwrap_or(""),
                    "Submission acknowledged"
                );
            }
            Err(e) => {
                if matches!(e, ClientError::Connectivity(_) | ClientError::Timeout(_)) {
                    self.availability.set(false);
                }
                self.last_status.fail(e.to_string());
                return Err(e.into());
            }
        }

        info!(session_id = %session_id, operation = %operation, "Job submitted");
        let handle = JobHandle::spawn(
            Arc::clone(&self.client),
            session_id,
            operation.produces_subtitles(),
            self.availability.clone(),
            self.poller_config.clone(),
        );
        self.job = Some(handle.clone());
        Ok(handle)
    }

    /// Handle to the current job, if one has been submitted.
    pub fn job(&self) -> Option<&JobHandle> {
        self.job.as_ref()
    }

    /// Current status snapshot.
    pub fn status(&self) -> JobStatus {
        match &self.job {
            Some(job) => job.status(),
            None => self.last_status.clone(),
        }
    }

    /// Cancel the current job and discard its local state.
    ///
    /// Fire-and-forget: the backend is not told to abort the work.
    pub fn cancel(&mut self) {
        if let Some(job) = self.job.take() {
            info!(session_id = %job.session_id(), "Job cancelled");
            job.cancel();
        }
        self.last_status = JobStatus::idle();
    }

    /// Download handles, available only after completion.
    pub fn result(&self) -> Option<JobResult> {
        self.job.as_ref().and_then(|job| job.result())
    }
}

impl Drop for ProcessingSession {
    fn drop(&mut self) {
        // Stop polling when the orchestrator goes away.
        if let Some(job) = self.job.take() {
            job.cancel();
        }
    }
}
