//! Minimal OpenAI REST client: chat completions and image generations.

mod client;
mod error;

pub use client::{
    ChatCompletionRequest, ImageGenerationRequest, OpenAiClient, DEFAULT_BASE_URL,
};
pub use error::OpenAiError;
