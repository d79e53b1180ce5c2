use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use unprepared_chatgpt::{ChatCompletionRequest, ImageGenerationRequest, OpenAiClient, OpenAiError};
use unprepared_common::ChatMessage;

/// A rejection from an upstream generation service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct UpstreamError {
    pub status: Option<u16>,
    pub message: String,
}

impl UpstreamError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }
}

impl From<OpenAiError> for UpstreamError {
    fn from(err: OpenAiError) -> Self {
        Self::new(err.status(), err.message())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub model: String,
    pub temperature: f64,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    pub count: u32,
    pub size: String,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the model's reply as free text.
    async fn generate_text(&self, request: &TextRequest) -> Result<String, UpstreamError>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Returns the URL of the generated image.
    async fn generate_image(&self, request: &ImageRequest) -> Result<String, UpstreamError>;
}

/// Awaits `call`, failing with a status-less [`UpstreamError`] once `limit` elapses.
pub(crate) async fn within<T, F>(limit: Option<Duration>, call: F) -> Result<T, UpstreamError>
where
    F: Future<Output = Result<T, UpstreamError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, call).await.unwrap_or_else(|_| {
            Err(UpstreamError::new(None, format!("timed out after {limit:?}")))
        }),
        None => call.await,
    }
}

/// Adapter exposing [`OpenAiClient`] through both generator traits.
pub struct OpenAiGenerator {
    inner: OpenAiClient,
}

impl OpenAiGenerator {
    pub fn new(inner: OpenAiClient) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate_text(&self, request: &TextRequest) -> Result<String, UpstreamError> {
        let body = ChatCompletionRequest {
            model: request.model.clone(),
            temperature: request.temperature,
            messages: request.messages.clone(),
        };
        Ok(self.inner.chat_completion(&body).await?)
    }
}

#[async_trait]
impl ImageGenerator for OpenAiGenerator {
    async fn generate_image(&self, request: &ImageRequest) -> Result<String, UpstreamError> {
        let body = ImageGenerationRequest {
            prompt: request.prompt.clone(),
            n: request.count,
            size: request.size.clone(),
        };
        Ok(self.inner.create_image(&body).await?)
    }
}
