//! Backend client configuration.

use std::time::Duration;

/// Configuration for the backend client.
///
/// Each endpoint carries its own bound: uploads move the whole artifact and
/// get the longest one, submission only enqueues, health and status are
/// lightweight probes.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the processing backend
    pub base_url: String,
    /// Health probe timeout
    pub health_timeout: Duration,
    /// Artifact upload timeout
    pub upload_timeout: Duration,
    /// Job submission timeout
    pub submit_timeout: Duration,
    /// Status query timeout
    pub status_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            health_timeout: Duration::from_secs(5),
            upload_timeout: Duration::from_secs(60),
            submit_timeout: Duration::from_secs(10),
            status_timeout: Duration::from_secs(5),
        }
    }
}

impl BackendConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("VEDIT_BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            health_timeout: env_secs("VEDIT_HEALTH_TIMEOUT_SECS", 5),
            upload_timeout: env_secs("VEDIT_UPLOAD_TIMEOUT_SECS", 60),
            submit_timeout: env_secs("VEDIT_SUBMIT_TIMEOUT_SECS", 10),
            status_timeout: env_secs("VEDIT_STATUS_TIMEOUT_SECS", 5),
        }
    }
}

fn env_secs(key: &str, default: u64) -> Duration {
    Duration::from_secs(
        std::env::var(key)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(default),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = BackendConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.health_timeout, Duration::from_secs(5));
        assert_eq!(config.upload_timeout, Duration::from_secs(60));
        assert_eq!(config.submit_timeout, Duration::from_secs(10));
        assert_eq!(config.status_timeout, Duration::from_secs(5));
    }
}
