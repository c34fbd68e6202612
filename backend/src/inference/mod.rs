pub mod interpreter;
pub mod workflow_client;

use futures::future::BoxFuture;
use std::path::Path;

use crate::config::InferenceConfig;
use workflow_client::WorkflowClient;

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Inference client unavailable: {0}")]
    Unavailable(String),
    #[error("Failed to read image: {0}")]
    ReadImage(#[source] std::io::Error),
    #[error("Inference request timed out")]
    Timeout,
    #[error("HTTP request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Inference service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Malformed inference response: {0}")]
    MalformedResponse(String),
    #[error("Inference response contained no class label")]
    NoLabel,
}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            InferenceError::Timeout
        } else if err.is_decode() {
            InferenceError::MalformedResponse(err.to_string())
        } else {
            InferenceError::Transport(err)
        }
    }
}

/// Anything that can turn a stored image into a class label.
pub trait Classify: Send + Sync {
    fn classify<'a>(&'a self, image_path: &'a Path) -> BoxFuture<'a, Result<String, InferenceError>>;
}

/// The workflow client as built at startup. A client that could not be
/// built stays around as `Unavailable` so every request can report why.
#[derive(Clone, Debug)]
pub enum InferenceGateway {
    Ready(WorkflowClient),
    Unavailable(String),
}

impl InferenceGateway {
    pub fn from_config(config: &InferenceConfig) -> Self {
        match WorkflowClient::new(config) {
            Ok(client) => {
                log::info!("Inference client initialized for {}", client.endpoint());
                InferenceGateway::Ready(client)
            }
            Err(e) => {
                log::error!("Failed to initialize inference client: {}", e);
                InferenceGateway::Unavailable(e.to_string())
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, InferenceGateway::Ready(_))
    }
}

impl Classify for InferenceGateway {
    fn classify<'a>(&'a self, image_path: &'a Path) -> BoxFuture<'a, Result<String, InferenceError>> {
        Box::pin(async move {
            match self {
                InferenceGateway::Ready(client) => client.classify_file(image_path).await,
                InferenceGateway::Unavailable(reason) => {
                    Err(InferenceError::Unavailable(reason.clone()))
                }
            }
        })
    }
}
