use serde::{Deserialize, Serialize};
use unprepared_common::ChatMessage;

use crate::error::{parse_error_body, OpenAiError};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub temperature: f64,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub n: u32,
    pub size: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}

/// OpenAI client for the two calls the generator needs.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    organization: Option<String>,
    project: Option<String>,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            organization: None,
            project: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_organization(mut self, organization: Option<String>) -> Self {
        self.organization = organization.filter(|o| !o.is_empty());
        self
    }

    pub fn with_project(mut self, project: Option<String>) -> Self {
        self.project = project.filter(|p| !p.is_empty());
        self
    }

    /// Sends a non-streaming chat completion and returns the first choice's text.
    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<String, OpenAiError> {
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "sending chat completion"
        );
        let response: ChatCompletionResponse = self.post_json("chat/completions", request).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| OpenAiError::InvalidResponse("completion has no message content".into()))
    }

    /// Requests image generation and returns the first image's URL.
    pub async fn create_image(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<String, OpenAiError> {
        tracing::debug!(size = %request.size, n = request.n, "sending image generation");
        let response: ImagesResponse = self.post_json("images/generations", request).await?;
        response
            .data
            .into_iter()
            .next()
            .and_then(|image| image.url)
            .ok_or_else(|| OpenAiError::InvalidResponse("image response has no url".into()))
    }

    async fn post_json<B, T>(&self, endpoint: &str, body: &B) -> Result<T, OpenAiError>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/{endpoint}", self.base_url);
        let mut req = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json");
        if let Some(org) = &self.organization {
            req = req.header("OpenAI-Organization", org);
        }
        if let Some(project) = &self.project {
            req = req.header("OpenAI-Project", project);
        }

        let resp = req.json(body).send().await?;
        let status = resp.status();
        tracing::debug!(%status, %url, "openai response");

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(OpenAiError::Api {
                status: status.as_u16(),
                message: parse_error_body(&text),
            });
        }

        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| OpenAiError::InvalidResponse(e.to_string()))
    }
}
