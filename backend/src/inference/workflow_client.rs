use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client as HttpClient;
use serde_json::Value;
use shared::{WorkflowRequest, WorkflowResponse};
use std::path::Path;
use url::Url;

use super::InferenceError;
use super::interpreter::interpret;
use crate::config::InferenceConfig;

/// Client for a hosted inference workflow, addressed by workspace and
/// workflow id.
#[derive(Clone, Debug)]
pub struct WorkflowClient {
    http_client: HttpClient,
    endpoint: Url,
    api_key: String,
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, InferenceError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| InferenceError::Unavailable(format!("{} is not set", name)))
}

impl WorkflowClient {
    pub fn new(config: &InferenceConfig) -> Result<Self, InferenceError> {
        let api_key = required(&config.api_key, "ROBOFLOW_API_KEY")?;
        let workspace_id = required(&config.workspace_id, "ROBOFLOW_WORKSPACE_ID")?;
        let workflow_id = required(&config.workflow_id, "ROBOFLOW_WORKFLOW_ID")?;

        let mut base = config.api_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let endpoint = Url::parse(&base)
            .and_then(|url| url.join(&format!("{}/workflows/{}", workspace_id, workflow_id)))
            .map_err(|e| {
                InferenceError::Unavailable(format!("invalid API URL {}: {}", config.api_url, e))
            })?;

        Ok(Self {
            http_client: HttpClient::new(),
            endpoint,
            api_key: api_key.to_string(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends one base64 image through the workflow and returns its raw
    /// `outputs` value.
    pub async fn run_workflow(&self, image_b64: String) -> Result<Value, InferenceError> {
        let request = WorkflowRequest::with_base64_image(self.api_key.clone(), image_b64);

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let envelope: WorkflowResponse = serde_json::from_str(&body)
            .map_err(|e| InferenceError::MalformedResponse(e.to_string()))?;
        envelope
            .outputs
            .ok_or_else(|| InferenceError::MalformedResponse("missing outputs".to_string()))
    }

    pub async fn classify_file(&self, image_path: &Path) -> Result<String, InferenceError> {
        let image = tokio::fs::read(image_path)
            .await
            .map_err(InferenceError::ReadImage)?;
        let image_b64 = STANDARD.encode(&image);

        let outputs = self.run_workflow(image_b64).await?;
        log::debug!(
            "Workflow raw response: {}",
            serde_json::to_string_pretty(&outputs).unwrap_or_else(|_| outputs.to_string())
        );

        interpret(&outputs).ok_or(InferenceError::NoLabel)
    }
}
