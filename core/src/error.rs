use thiserror::Error;

/// Terminal failures of a generation run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("malformed model response: {reason}")]
    MalformedResponse { reason: String },

    #[error("text generation failed: {}", describe(.status, .message))]
    TextGeneration { status: Option<u16>, message: String },

    #[error("image generation failed for slide {}: {}", .slide + 1, describe(.status, .message))]
    ImageGeneration {
        slide: usize,
        status: Option<u16>,
        message: String,
    },
}

impl GenerationError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse { reason: reason.into() }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::MalformedResponse { .. } => None,
            Self::TextGeneration { status, .. } | Self::ImageGeneration { status, .. } => *status,
        }
    }
}

fn describe(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("status {status}: {message}"),
        None => message.to_string(),
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;
