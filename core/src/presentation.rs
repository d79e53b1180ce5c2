use std::sync::Arc;

use unprepared_common::{GenerationRequest, Presentation};

use crate::assemble::SlideAssembler;
use crate::client::{within, ImageGenerator, TextGenerator, TextRequest};
use crate::config::Config;
use crate::error::{GenerationError, Result};
use crate::extract::extract_draft;
use crate::image::ImageRequester;
use crate::prompt::Prompt;

pub const TEXT_TEMPERATURE: f64 = 0.2;

/// Runs one generation: prompt, text call, extraction, slide assembly.
pub struct PresentationBuilder {
    config: Config,
    text: Arc<dyn TextGenerator>,
    images: Arc<dyn ImageGenerator>,
}

impl PresentationBuilder {
    pub fn new(
        config: Config,
        text: Arc<dyn TextGenerator>,
        images: Arc<dyn ImageGenerator>,
    ) -> Self {
        Self { config, text, images }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Any failure ends the run; no partial presentation is returned.
    pub async fn build(&self, request: &GenerationRequest) -> Result<Presentation> {
        let prompt = Prompt::for_request(request);
        let text_request = TextRequest {
            model: request.model.clone(),
            temperature: TEXT_TEMPERATURE,
            messages: prompt.messages(),
        };

        tracing::info!(model = %request.model, "generating content");
        let timeout = self.config.request_timeout();
        let response = within(timeout, self.text.generate_text(&text_request))
            .await
            .map_err(|e| GenerationError::TextGeneration {
                status: e.status,
                message: e.message,
            })?;
        tracing::debug!(bytes = response.len(), "received model response");

        let draft = extract_draft(&response)?;
        tracing::info!(title = %draft.title, slides = draft.slides.len(), "extracted draft");

        let requester = ImageRequester::new(self.images.as_ref()).with_timeout(timeout);
        let slides = SlideAssembler::new(requester)
            .with_max_concurrent(self.config.max_concurrent_images)
            .with_failure_policy(self.config.on_image_failure, &self.config.placeholder_image_url)
            .assemble(&draft, request.want_images)
            .await?;

        Ok(Presentation::from_parts(&draft, request.want_images, slides))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ImageRequest, UpstreamError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use unprepared_common::Role;

    const REPLY: &str = r##"Sure, here's a JSON response for a slide deck on tides:
{
  "presentationTitle": "Tides",
  "backgroundColor": "#0b3d91",
  "linearGradient": "#1e90ff",
  "textColor": "#ffffff",
  "fontFamily": "Merriweather",
  "imageStyle": "ukiyo-e woodblock",
  "slides": [
    {
      "title": "The Moon",
      "content": "Gravity pulls the ocean.",
      "imageDescription": "the moon over waves"
    },
    {"title": "Spring Tides", "content": "Sun and moon align.", "imageDescription": "a high tide"}
  ]
}"##;

    struct ScriptedText {
        reply: std::result::Result<String, UpstreamError>,
        delay: Duration,
        seen: Mutex<Vec<TextRequest>>,
    }

    impl ScriptedText {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                delay: Duration::ZERO,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing(status: Option<u16>, message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(UpstreamError::new(status, message)),
                delay: Duration::ZERO,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedText {
        async fn generate_text(
            &self,
            request: &TextRequest,
        ) -> std::result::Result<String, UpstreamError> {
            self.seen.lock().unwrap().push(request.clone());
            tokio::time::sleep(self.delay).await;
            self.reply.clone()
        }
    }

    #[derive(Default)]
    struct CountingImages {
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
        reject: bool,
    }

    #[async_trait]
    impl ImageGenerator for CountingImages {
        async fn generate_image(
            &self,
            request: &ImageRequest,
        ) -> std::result::Result<String, UpstreamError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(request.prompt.clone());
            if self.reject {
                return Err(UpstreamError::new(Some(429), "Rate limit reached"));
            }
            Ok(format!("https://img.test/{n}.png"))
        }
    }

    fn builder(text: Arc<ScriptedText>, images: Arc<CountingImages>) -> PresentationBuilder {
        PresentationBuilder::new(Config::default(), text, images)
    }

    #[tokio::test]
    async fn builds_presentation_without_images() {
        let text = ScriptedText::replying(REPLY);
        let images = Arc::new(CountingImages::default());
        let request = GenerationRequest::new("tides", "gpt-4", false);

        let presentation = builder(text.clone(), images.clone()).build(&request).await.unwrap();

        assert_eq!(presentation.title, "Tides");
        assert!(!presentation.want_images);
        assert_eq!(presentation.gradient_color.as_deref(), Some("#1e90ff"));
        assert_eq!(presentation.font_family, "Merriweather");
        assert_eq!(presentation.slides.len(), 2);
        assert!(presentation.slides[1].is_last_slide);
        assert!(presentation.slides.iter().all(|s| s.image_url.is_none()));
        assert_eq!(images.calls.load(Ordering::SeqCst), 0);

        let seen = text.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "gpt-4");
        assert_eq!(seen[0].temperature, 0.2);
        assert_eq!(seen[0].messages[0].role, Role::System);
        assert_eq!(
            seen[0].messages[1].content,
            "generate an informative presentation about tides."
        );
    }

    #[tokio::test]
    async fn builds_presentation_with_styled_images() {
        let images = Arc::new(CountingImages::default());
        let request = GenerationRequest::new("tides", "gpt-4", true);

        let presentation = builder(ScriptedText::replying(REPLY), images.clone())
            .build(&request)
            .await
            .unwrap();

        assert!(presentation.want_images);
        assert!(presentation.slides.iter().all(|s| s.image_url.is_some()));
        assert_eq!(images.calls.load(Ordering::SeqCst), 2);
        let mut prompts = images.prompts.lock().unwrap().clone();
        prompts.sort();
        assert_eq!(
            prompts,
            [
                "a high tide in the style of ukiyo-e woodblock",
                "the moon over waves in the style of ukiyo-e woodblock",
            ]
        );
    }

    #[tokio::test]
    async fn text_rejection_is_terminal() {
        let request = GenerationRequest::new("tides", "gpt-4", true);
        let images = Arc::new(CountingImages::default());
        let text = ScriptedText::failing(Some(401), "Incorrect API key provided");
        let err = builder(text, images.clone()).build(&request).await.unwrap_err();

        assert_eq!(
            err,
            GenerationError::TextGeneration {
                status: Some(401),
                message: "Incorrect API key provided".into(),
            }
        );
        assert_eq!(images.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_reply_is_terminal() {
        let request = GenerationRequest::new("tides", "gpt-4", false);
        let err = builder(
            ScriptedText::replying("I'm sorry, I can't do that."),
            Arc::new(CountingImages::default()),
        )
        .build(&request)
        .await
        .unwrap_err();

        assert!(matches!(err, GenerationError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn image_rejection_aborts_whole_build() {
        let images = Arc::new(CountingImages {
            reject: true,
            ..Default::default()
        });
        let request = GenerationRequest::new("tides", "gpt-4", true);

        let err = builder(ScriptedText::replying(REPLY), images)
            .build(&request)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(429));
        assert!(matches!(err, GenerationError::ImageGeneration { .. }));
    }

    #[tokio::test]
    async fn text_call_honours_configured_timeout() {
        let text = Arc::new(ScriptedText {
            reply: Ok(REPLY.to_string()),
            delay: Duration::from_secs(5),
            seen: Mutex::new(Vec::new()),
        });
        let config = Config {
            request_timeout_secs: Some(0),
            ..Config::default()
        };
        let request = GenerationRequest::new("tides", "gpt-4", false);

        let err = PresentationBuilder::new(config, text, Arc::new(CountingImages::default()))
            .build(&request)
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::TextGeneration { status: None, .. }));
    }
}
