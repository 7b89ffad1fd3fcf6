//! Processing backend HTTP client.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, warn};

use vedit_models::{JobUpdate, ProcessRequest, StatusResponse};

use crate::config::BackendConfig;
use crate::error::{ClientError, ClientResult};
use crate::types::{HealthReport, SubmitAck, UploadResponse};

/// Client for the processing backend.
///
/// Timeouts are applied per request rather than on the client, since the
/// endpoints have very different bounds (see [`BackendConfig`]).
pub struct BackendClient {
    http: Client,
    config: BackendConfig,
}

impl BackendClient {
    /// Create a new backend client.
    pub fn new(config: BackendConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        Self::new(BackendConfig::from_env())
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Probe backend liveness and capability readiness.
    pub async fn health(&self) -> ClientResult<HealthReport> {
        let url = format!("{}/health", self.config.base_url);

        let response = self
            .http
            .get(&url)
            .timeout(self.config.health_timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, self.config.health_timeout))?;

        if !response.status().is_success() {
            return Err(ClientError::StatusRejected {
                status: response.status().as_u16(),
            });
        }

        decode_json(response).await
    }

    /// Upload an artifact, creating a backend session.
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> ClientResult<UploadResponse> {
        let url = format!("{}/upload", self.config.base_url);
        debug!(file_name, size = bytes.len(), "Uploading artifact to {}", url);

        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .timeout(self.config.upload_timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, self.config.upload_timeout))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let reason = response.text().await.unwrap_or_default();
            warn!(status, "Upload rejected: {}", reason);
            return Err(ClientError::UploadRejected { status, reason });
        }

        decode_json(response).await
    }

    /// Submit an operation against a session. 2xx only acknowledges the
    /// enqueue; progress comes from the status endpoint.
    pub async fn submit(
        &self,
        session_id: &str,
        request: &ProcessRequest,
    ) -> ClientResult<SubmitAck> {
        let url = format!("{}/process/{}", self.config.base_url, session_id);
        debug!(session_id, operation = request.operation, "Submitting job to {}", url);

        let response = self
            .http
            .post(&url)
            .json(request)
            .timeout(self.config.submit_timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, self.config.submit_timeout))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let reason = response.text().await.unwrap_or_default();
            warn!(status, "Submission rejected: {}", reason);
            return Err(ClientError::SubmissionRejected { status, reason });
        }

        // Ack body is informational; tolerate anything the backend sends.
        Ok(response.json::<SubmitAck>().await.unwrap_or_default())
    }

    /// Query job status for a session.
    pub async fn status(&self, session_id: &str) -> ClientResult<JobUpdate> {
        let url = format!("{}/status/{}", self.config.base_url, session_id);

        let response = self
            .http
            .get(&url)
            .timeout(self.config.status_timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, self.config.status_timeout))?;

        if !response.status().is_success() {
            return Err(ClientError::StatusRejected {
                status: response.status().as_u16(),
            });
        }

        let raw: StatusResponse = decode_json(response).await?;
        Ok(raw.into())
    }

    /// Download location of the primary artifact.
    pub fn download_url(&self, session_id: &str) -> String {
        format!("{}/download/{}", self.config.base_url, session_id)
    }

    /// Download location of the subtitle artifact.
    pub fn subtitles_url(&self, session_id: &str) -> String {
        format!("{}/download/{}/subtitles", self.config.base_url, session_id)
    }

    /// Fetch an artifact and save it to `path`. Returns the byte count.
    pub async fn download_to(&self, url: &str, path: &Path) -> ClientResult<u64> {
        let response = self
            .http
            .get(url)
            .timeout(self.config.upload_timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, self.config.upload_timeout))?;

        if !response.status().is_success() {
            return Err(ClientError::StatusRejected {
                status: response.status().as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(e, self.config.upload_timeout))?;
        tokio::fs::write(path, &bytes).await?;
        debug!(url, path = %path.display(), size = bytes.len(), "Saved artifact");
        Ok(bytes.len() as u64)
    }
}

fn transport_error(e: reqwest::Error, bound: Duration) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout(bound.as_secs())
    } else {
        ClientError::Connectivity(e)
    }
}

async fn decode_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vedit_models::{Operation, SilenceSettings, Stage};
    use wiremock::matchers::{body_json_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> BackendClient {
        BackendClient::new(BackendConfig {
            base_url: server.uri(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_health_decodes_report() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "capabilityReady": false,
            })))
            .mount(&server)
            .await;

        let report = client_for(&server).health().await.unwrap();
        assert!(report.ok);
        assert!(!report.available());
    }

    #[tokio::test]
    async fn test_upload_rejection_carries_reason() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(400).set_body_string("file too large"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .upload("clip.mp4", vec![0u8; 16])
            .await
            .unwrap_err();
        match err {
            ClientError::UploadRejected { status, reason } => {
                assert_eq!(status, 400);
                assert_eq!(reason, "file too large");
            }
            other => panic!("expected UploadRejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_sends_operation_payload() {
        let server = MockServer::start().await;
        let expected = serde_json::json!({
            "operation": "remove_silence",
            "settings": { "silenceThresholdDb": -30.0, "frameMargin": 6 },
        });
        Mock::given(method("POST"))
            .and(path("/process/session_1"))
            .and(body_json_string(expected.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "session_id": "session_1",
                "operation": "remove_silence",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = Operation::RemoveSilence(SilenceSettings::default()).to_request();
        let ack = client_for(&server)
            .submit("session_1", &request)
            .await
            .unwrap();
        assert_eq!(ack.session_id.as_deref(), Some("session_1"));
    }

    #[tokio::test]
    async fn test_status_decodes_running_update() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status/session_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "processing",
                "stage": "encoding",
                "progress": 90,
                "message": "Encoding output",
            })))
            .mount(&server)
            .await;

        let update = client_for(&server).status("session_1").await.unwrap();
        assert_eq!(
            update,
            JobUpdate::Running {
                stage: Stage::Encoding,
                progress: 90.0,
                message: "Encoding output".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_status_timeout_maps_to_timeout_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status/session_1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(500))
                    .set_body_json(serde_json::json!({ "status": "processing" })),
            )
            .mount(&server)
            .await;

        let client = BackendClient::new(BackendConfig {
            base_url: server.uri(),
            status_timeout: Duration::from_millis(50),
            ..Default::default()
        });
        let err = client.status("session_1").await.unwrap_err();
        assert!(err.is_timeout());
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_connectivity_error_when_backend_down() {
        // Port 9 is discard; nothing is listening there.
        let client = BackendClient::new(BackendConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        });
        let err = client.status("session_1").await.unwrap_err();
        assert!(matches!(err, ClientError::Connectivity(_)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_download_to_saves_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/download/session_1"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"video-bytes".to_vec()))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("processed.mp4");
        let written = client
            .download_to(&client.download_url("session_1"), &out)
            .await
            .unwrap();
        assert_eq!(written, 11);
        assert_eq!(std::fs::read(&out).unwrap(), b"video-bytes");
    }
}
