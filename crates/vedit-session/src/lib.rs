//! Processing-session orchestrator.
//!
//! Manages the lifecycle of exactly one job per session: the health gate,
//! artifact upload, job submission with a single-active-job guard, the
//! status polling loop with transient-failure backoff, cancellation, and
//! result handles.
//!
//! Control flow: [`HealthMonitor`] gates upload and submission, the
//! [`SessionManager`] binds an uploaded artifact to a backend-issued session
//! id, [`ProcessingSession::submit`] starts exactly one job against it, the
//! poller drives progress until a terminal stage, and [`JobHandle::result`]
//! exposes download handles on completion.

pub mod availability;
pub mod error;
pub mod orchestrator;
pub mod poller;
pub mod session;

pub use availability::{Availability, HealthMonitor};
pub use error::{SessionError, SubmitError};
pub use orchestrator::ProcessingSession;
pub use poller::{JobHandle, JobResult, PollerConfig};
pub use session::{Session, SessionManager};
