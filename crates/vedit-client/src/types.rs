//! Backend request/response types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Backend process is up
    pub ok: bool,
    /// Required AI capability is authenticated and loaded
    pub capability_ready: bool,
    /// Optional per-feature readiness map
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<HashMap<String, bool>>,
}

impl HealthReport {
    /// A reachable backend missing its capability is still unavailable.
    pub fn available(&self) -> bool {
        self.ok && self.capability_ready
    }
}

/// Body of `POST /upload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Backend-issued opaque session identifier
    pub session_id: String,
}

/// Body of `POST /process/{session_id}`. Informational only; the 2xx code
/// is the enqueue contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitAck {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub operation: Option<String>,
}
