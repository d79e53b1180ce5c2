use std::time::Duration;

use crate::client::{within, ImageGenerator, ImageRequest};
use crate::error::{GenerationError, Result};

pub const IMAGE_COUNT: u32 = 1;
pub const IMAGE_SIZE: &str = "512x512";

/// `"{description} in the style of {style}"`, or just the description when
/// the style is blank.
pub fn compose_image_prompt(description: &str, style: &str) -> String {
    if style.trim().is_empty() {
        description.to_string()
    } else {
        format!("{description} in the style of {style}")
    }
}

/// Issues one image request per call.
pub struct ImageRequester<'a> {
    generator: &'a dyn ImageGenerator,
    timeout: Option<Duration>,
}

impl<'a> ImageRequester<'a> {
    pub fn new(generator: &'a dyn ImageGenerator) -> Self {
        Self { generator, timeout: None }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Requests the image for the slide at `slide` and returns its URL.
    pub async fn request(&self, slide: usize, description: &str, style: &str) -> Result<String> {
        if description.trim().is_empty() {
            return Err(GenerationError::ImageGeneration {
                slide,
                status: None,
                message: "slide has no image description".into(),
            });
        }

        let request = ImageRequest {
            prompt: compose_image_prompt(description, style),
            count: IMAGE_COUNT,
            size: IMAGE_SIZE.to_string(),
        };
        tracing::debug!(slide, prompt = %request.prompt, "requesting image");

        within(self.timeout, self.generator.generate_image(&request))
            .await
            .map_err(|e| GenerationError::ImageGeneration {
                slide,
                status: e.status,
                message: e.message,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::UpstreamError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingGenerator {
        seen: Mutex<Vec<ImageRequest>>,
    }

    #[async_trait]
    impl ImageGenerator for RecordingGenerator {
        async fn generate_image(
            &self,
            request: &ImageRequest,
        ) -> std::result::Result<String, UpstreamError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(format!("https://img.test/{}", request.prompt.len()))
        }
    }

    struct RejectingGenerator;

    #[async_trait]
    impl ImageGenerator for RejectingGenerator {
        async fn generate_image(
            &self,
            _request: &ImageRequest,
        ) -> std::result::Result<String, UpstreamError> {
            Err(UpstreamError::new(Some(400), "content policy violation"))
        }
    }

    #[test]
    fn composes_style_clause() {
        assert_eq!(
            compose_image_prompt("a cat", "watercolor"),
            "a cat in the style of watercolor"
        );
    }

    #[test]
    fn empty_style_omits_clause() {
        assert_eq!(compose_image_prompt("a cat", ""), "a cat");
        assert_eq!(compose_image_prompt("a cat", "  "), "a cat");
    }

    #[tokio::test]
    async fn sends_fixed_count_and_size() {
        let generator = RecordingGenerator::default();
        let url = ImageRequester::new(&generator)
            .request(0, "a cat", "watercolor")
            .await
            .unwrap();
        assert_eq!(url, "https://img.test/32");

        let seen = generator.seen.lock().unwrap();
        assert_eq!(
            seen.as_slice(),
            &[ImageRequest {
                prompt: "a cat in the style of watercolor".into(),
                count: 1,
                size: "512x512".into(),
            }]
        );
    }

    #[tokio::test]
    async fn rejection_carries_slide_and_status() {
        let err = ImageRequester::new(&RejectingGenerator)
            .request(4, "a cat", "")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GenerationError::ImageGeneration {
                slide: 4,
                status: Some(400),
                message: "content policy violation".into(),
            }
        );
    }

    #[tokio::test]
    async fn blank_description_fails_without_calling_upstream() {
        let generator = RecordingGenerator::default();
        let err = ImageRequester::new(&generator)
            .request(1, " ", "watercolor")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::ImageGeneration { slide: 1, .. }));
        assert!(generator.seen.lock().unwrap().is_empty());
    }
}
