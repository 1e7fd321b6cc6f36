//! Provider HTTP client.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::types::{
    CreateTaskRequest, CreateTaskResponse, GetTaskResponse, TaskData, TaskInput, TaskOutput,
    TaskType, IMAGE_EDIT_MODEL, VIDEO_CLIP_MODEL,
};

/// Fixed interval between polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Fixed poll budget per task (~3 minutes at [`POLL_INTERVAL`]).
pub const MAX_POLL_ATTEMPTS: u32 = 90;

/// Configuration for the provider client.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the provider API
    pub base_url: String,
    /// Bearer token
    pub api_key: String,
    /// Per-request HTTP timeout
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Create config from environment variables.
    pub fn from_env() -> ProviderResult<Self> {
        Ok(Self {
            base_url: std::env::var("PROVIDER_BASE_URL")
                .unwrap_or_else(|_| "https://api.provider.example/api/v1".to_string()),
            api_key: std::env::var("PROVIDER_API_KEY")
                .map_err(|_| ProviderError::request("PROVIDER_API_KEY not set"))?,
            timeout: Duration::from_secs(
                std::env::var("PROVIDER_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        })
    }
}

/// Client for the external generation provider.
///
/// Explicitly constructed and passed to callers; holds no global state
/// beyond the reqwest connection pool.
#[derive(Clone)]
pub struct ProviderClient {
    http: Client,
    config: ProviderConfig,
}

impl ProviderClient {
    /// Create a new provider client.
    pub fn new(config: ProviderConfig) -> ProviderResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ProviderError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ProviderResult<Self> {
        Self::new(ProviderConfig::from_env()?)
    }

    /// Submit a task and return the provider's task id.
    pub async fn submit(&self, request: &CreateTaskRequest) -> ProviderResult<String> {
        let url = format!("{}/jobs/createTask", self.config.base_url);

        debug!(model = %request.model, "Submitting provider task to {}", url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::request(format!(
                "createTask returned {}: {}",
                status, body
            )));
        }

        let result: CreateTaskResponse = response.json().await?;

        if result.code != 0 && result.code != 200 {
            return Err(ProviderError::request(format!(
                "task creation rejected: {}",
                result.message
            )));
        }

        let task_id = result
            .data
            .map(|d| d.task_id)
            .ok_or_else(|| ProviderError::request("createTask returned no task_id"))?;

        debug!(task_id = %task_id, "Provider accepted task");
        Ok(task_id)
    }

    /// Poll until the task reaches a terminal state or the budget runs out.
    ///
    /// Polls every [`POLL_INTERVAL`] for up to [`MAX_POLL_ATTEMPTS`]
    /// attempts. A completed task must carry at least one output media
    /// reference.
    pub async fn await_result(&self, task_id: &str) -> ProviderResult<TaskOutput> {
        for attempt in 0..MAX_POLL_ATTEMPTS {
            let data = self.poll(task_id).await?;

            match data.status.as_str() {
                "completed" => {
                    let output = data.output.ok_or(ProviderError::EmptyResult)?;
                    if output.images.is_empty() {
                        return Err(ProviderError::EmptyResult);
                    }
                    debug!(task_id = %task_id, attempt, "Provider task completed");
                    return Ok(output);
                }
                "failed" => {
                    let reason = data.error.unwrap_or_else(|| "Unknown error".to_string());
                    warn!(task_id = %task_id, "Provider task failed: {}", reason);
                    return Err(ProviderError::TaskFailed(reason));
                }
                "pending" | "processing" => {
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                other => return Err(ProviderError::UnknownStatus(other.to_string())),
            }
        }

        Err(ProviderError::Timeout {
            attempts: MAX_POLL_ATTEMPTS,
            seconds: MAX_POLL_ATTEMPTS as u64 * POLL_INTERVAL.as_secs(),
        })
    }

    /// One poll of the task endpoint.
    async fn poll(&self, task_id: &str) -> ProviderResult<TaskData> {
        let url = format!("{}/jobs/getTask", self.config.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("task_id", task_id)])
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::request(format!(
                "getTask returned {}",
                response.status()
            )));
        }

        let result: GetTaskResponse = response.json().await?;

        result
            .data
            .ok_or_else(|| ProviderError::request("getTask returned no data"))
    }

    /// Submit an image edit and wait for the result.
    pub async fn edit_image(&self, input: TaskInput) -> ProviderResult<TaskOutput> {
        let task_id = self
            .submit(&CreateTaskRequest {
                model: IMAGE_EDIT_MODEL.to_string(),
                task_type: TaskType::Img2img,
                input,
            })
            .await?;
        self.await_result(&task_id).await
    }

    /// Submit a motion clip generation and wait for the result.
    pub async fn generate_clip(&self, input: TaskInput) -> ProviderResult<TaskOutput> {
        let task_id = self
            .submit(&CreateTaskRequest {
                model: VIDEO_CLIP_MODEL.to_string(),
                task_type: TaskType::Img2img,
                input,
            })
            .await?;
        self.await_result(&task_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> ProviderClient {
        ProviderClient::new(ProviderConfig {
            base_url: base_url.to_string(),
            api_key: "test-key".to_string(),
            timeout: Duration::from_secs(3600),
        })
        .unwrap()
    }

    fn task_body(status: &str) -> serde_json::Value {
        json!({
            "code": 0,
            "message": "ok",
            "data": { "task_id": "t-1", "status": status }
        })
    }

    #[tokio::test]
    async fn test_submit_returns_task_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/jobs/createTask"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "message": "ok",
                "data": { "task_id": "t-42" }
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let task_id = client
            .submit(&CreateTaskRequest {
                model: IMAGE_EDIT_MODEL.to_string(),
                task_type: TaskType::Img2img,
                input: TaskInput::img2img("remove the bins", "https://example.com/a.jpg"),
            })
            .await
            .unwrap();

        assert_eq!(task_id, "t-42");
    }

    #[tokio::test]
    async fn test_submit_rejects_error_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/jobs/createTask"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 402,
                "message": "insufficient credits"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .submit(&CreateTaskRequest {
                model: IMAGE_EDIT_MODEL.to_string(),
                task_type: TaskType::Img2img,
                input: TaskInput::img2img("p", "https://example.com/a.jpg"),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Request(msg) if msg.contains("insufficient credits")));
    }

    #[tokio::test]
    async fn test_await_result_completed_with_output() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs/getTask"))
            .and(query_param("task_id", "t-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "message": "ok",
                "data": {
                    "task_id": "t-1",
                    "status": "completed",
                    "output": { "images": [{ "url": "https://cdn.example.com/out.jpg" }] }
                }
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let output = client.await_result("t-1").await.unwrap();
        assert_eq!(output.images[0].url, "https://cdn.example.com/out.jpg");
    }

    #[tokio::test]
    async fn test_await_result_completed_without_media_is_empty_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs/getTask"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "message": "ok",
                "data": {
                    "task_id": "t-1",
                    "status": "completed",
                    "output": { "images": [] }
                }
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.await_result("t-1").await.unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResult));
    }

    #[tokio::test]
    async fn test_await_result_failed_carries_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs/getTask"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "message": "ok",
                "data": {
                    "task_id": "t-1",
                    "status": "failed",
                    "error": "content policy violation"
                }
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.await_result("t-1").await.unwrap_err();
        assert!(matches!(err, ProviderError::TaskFailed(msg) if msg == "content policy violation"));
    }

    #[tokio::test]
    async fn test_await_result_unknown_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs/getTask"))
            .respond_with(ResponseTemplate::new(200).set_body_json(task_body("paused")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.await_result("t-1").await.unwrap_err();
        assert!(matches!(err, ProviderError::UnknownStatus(s) if s == "paused"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_result_times_out_after_exact_poll_budget() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs/getTask"))
            .respond_with(ResponseTemplate::new(200).set_body_json(task_body("processing")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let started = tokio::time::Instant::now();
        let err = client.await_result("t-1").await.unwrap_err();

        assert!(matches!(
            err,
            ProviderError::Timeout {
                attempts: MAX_POLL_ATTEMPTS,
                seconds: 180
            }
        ));
        // 90 polls, one sleep after each: ~180 virtual seconds.
        assert_eq!(started.elapsed().as_secs(), 180);
        assert_eq!(
            server.received_requests().await.unwrap().len(),
            MAX_POLL_ATTEMPTS as usize
        );
    }
}
