//! Status polling loop and job handles.
//!
//! The poller is a cooperative, timer-driven loop: each poll either
//! reschedules itself (non-terminal outcome, at the baseline interval on
//! success or the backoff interval on transport failure) or terminates
//! (terminal stage or cancellation). Transport failures never transition
//! the stage; a timeout additionally marks the backend unavailable.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use vedit_client::BackendClient;
use vedit_models::{JobStatus, JobUpdate, Stage};

use crate::availability::Availability;

/// Polling cadence configuration.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Baseline interval between successful polls
    pub interval: Duration,
    /// Interval after a transport failure
    pub backoff: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            backoff: Duration::from_secs(2),
        }
    }
}

impl PollerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            interval: env_millis("VEDIT_POLL_INTERVAL_MS", 1000),
            backoff: env_millis("VEDIT_POLL_BACKOFF_MS", 2000),
        }
    }
}

fn env_millis(key: &str, default: u64) -> Duration {
    Duration::from_millis(
        std::env::var(key)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(default),
    )
}

/// Download handles for a completed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    /// Primary artifact location
    pub video_url: String,
    /// Subtitle artifact location, only for subtitle generation
    pub subtitles_url: Option<String>,
}

/// Handle to an in-flight job.
///
/// Cheap to clone; every clone observes the same poller. Cancellation is
/// client-local: it stops the polling loop but the backend job keeps
/// running server-side.
#[derive(Clone, Debug)]
pub struct JobHandle {
    session_id: String,
    video_url: String,
    subtitles_url: Option<String>,
    status_rx: watch::Receiver<JobStatus>,
    shutdown_tx: watch::Sender<bool>,
}

impl JobHandle {
    /// Spawn the poller for a freshly submitted job.
    ///
    /// Status starts at the optimistic post-submission floor
    /// ([`JobStatus::submitted`]) so observers never see 0% after a
    /// successful submission.
    pub(crate) fn spawn(
        client: Arc<BackendClient>,
        session_id: String,
        produces_subtitles: bool,
        availability: Availability,
        config: PollerConfig,
    ) -> Self {
        let (status_tx, status_rx) = watch::channel(JobStatus::submitted());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let video_url = client.download_url(&session_id);
        let subtitles_url = produces_subtitles.then(|| client.subtitles_url(&session_id));

        tokio::spawn(poll_loop(
            client,
            session_id.clone(),
            availability,
            config,
            status_tx,
            shutdown_rx,
        ));

        Self {
            session_id,
            video_url,
            subtitles_url,
            status_rx,
            shutdown_tx,
        }
    }

    /// Id of the session this job runs against.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Current status snapshot.
    pub fn status(&self) -> JobStatus {
        self.status_rx.borrow().clone()
    }

    /// Subscribe to status snapshots.
    pub fn subscribe(&self) -> watch::Receiver<JobStatus> {
        self.status_rx.clone()
    }

    /// Wait until the job reaches a terminal stage.
    pub async fn wait(&self) -> JobStatus {
        let mut rx = self.status_rx.clone();
        loop {
            let current = rx.borrow_and_update().clone();
            if current.is_terminal() {
                return current;
            }
            if rx.changed().await.is_err() {
                // Poller gone; report whatever we last saw.
                return self.status_rx.borrow().clone();
            }
        }
    }

    /// Stop scheduling further polls.
    pub fn cancel(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Download handles, exposed only once the job has completed.
    pub fn result(&self) -> Option<JobResult> {
        if self.status_rx.borrow().stage != Stage::Completed {
            return None;
        }
        Some(JobResult {
            video_url: self.video_url.clone(),
            subtitles_url: self.subtitles_url.clone(),
        })
    }
}

async fn poll_loop(
    client: Arc<BackendClient>,
    session_id: String,
    availability: Availability,
    config: PollerConfig,
    status_tx: watch::Sender<JobStatus>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut status = status_tx.borrow().clone();
    let mut delay = config.interval;

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    debug!(session_id = %session_id, "Polling cancelled");
                    break;
                }
            }
            _ = tokio::time::sleep(delay) => {
                match client.status(&session_id).await {
                    Ok(update) => {
                        if matches!(update, JobUpdate::Completed) {
                            availability.set(true);
                        }
                        status.apply(&update);
                        let _ = status_tx.send(status.clone());

                        match &update {
                            JobUpdate::Completed => {
                                info!(session_id = %session_id, "Job completed");
                                break;
                            }
                            JobUpdate::Failed { reason } => {
                                warn!(session_id = %session_id, "Job failed: {}", reason);
                                break;
                            }
                            JobUpdate::Running { stage, progress, .. } => {
                                debug!(
                                    session_id = %session_id,
                                    stage = %stage,
                                    progress,
                                    "Job advancing"
                                );
                                delay = config.interval;
                            }
                        }
                    }
                    Err(e) => {
                        // Transient: keep the current stage and retry on the
                        // backoff cadence. No retry cap; polling runs until a
                        // terminal stage or explicit cancellation.
                        if e.is_timeout() {
                            warn!(
                                session_id = %session_id,
                                "Status poll timed out; marking backend unavailable"
                            );
                            availability.set(false);
                        } else {
                            warn!(session_id = %session_id, "Status poll failed: {}", e);
                        }
                        delay = config.backoff;
                    }
                }
            }
        }
    }
}
