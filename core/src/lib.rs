//! Generation pipeline: prompt, text call, extraction, slide assembly.

pub mod assemble;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod image;
pub mod presentation;
pub mod prompt;

pub use assemble::SlideAssembler;
pub use client::{ImageGenerator, OpenAiGenerator, TextGenerator, UpstreamError};
pub use config::{Config, ImageFailurePolicy};
pub use error::{GenerationError, Result};
pub use presentation::PresentationBuilder;
