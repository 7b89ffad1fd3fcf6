//! Backend availability flag and health monitor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use vedit_client::BackendClient;

/// Shared "backend is available" flag.
///
/// Initialized optimistic and corrected on the first check. Writers race
/// with last-write-wins semantics; that is acceptable because the flag only
/// gates subsequent actions, it never affects an in-flight job. Readers must
/// fetch it at the point of use rather than caching it across an await.
#[derive(Debug, Clone)]
pub struct Availability(Arc<AtomicBool>);

impl Availability {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn set(&self, available: bool) {
        self.0.store(available, Ordering::SeqCst);
    }
}

impl Default for Availability {
    fn default() -> Self {
        Self::new()
    }
}

/// Probes backend reachability and capability readiness.
///
/// The sole owner of [`Availability`] corrections from health probes; the
/// uploader and poller additionally flip the flag false on transport
/// failures.
pub struct HealthMonitor {
    client: Arc<BackendClient>,
    availability: Availability,
}

impl HealthMonitor {
    pub fn new(client: Arc<BackendClient>, availability: Availability) -> Self {
        Self {
            client,
            availability,
        }
    }

    /// Run the liveness + capability probe and overwrite the flag.
    ///
    /// A reachable backend missing its capability and an unreachable backend
    /// both report unavailable; callers never need to distinguish them.
    pub async fn check(&self) -> bool {
        let available = match self.client.health().await {
            Ok(report) => {
                if report.ok && !report.capability_ready {
                    warn!("Backend reachable but required capability is not ready");
                }
                report.available()
            }
            Err(e) => {
                warn!("Health check failed: {}", e);
                false
            }
        };
        debug!(available, "Health probe finished");
        self.availability.set(available);
        available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_optimistic() {
        let availability = Availability::new();
        assert!(availability.get());
    }

    #[test]
    fn test_last_write_wins() {
        let availability = Availability::new();
        let other = availability.clone();
        availability.set(false);
        assert!(!other.get());
        other.set(true);
        assert!(availability.get());
    }
}
