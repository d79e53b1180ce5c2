use futures::stream::{self, StreamExt};
use unprepared_common::{PresentationDraft, Slide};

use crate::config::{ImageFailurePolicy, DEFAULT_PLACEHOLDER_IMAGE_URL};
use crate::error::Result;
use crate::image::ImageRequester;

/// Turns draft slides into rendering-ready slides, fetching images on request.
///
/// Output order is the draft's order. Image requests run concurrently and are
/// joined by slide index, so completion order never leaks into the result.
pub struct SlideAssembler<'a> {
    requester: ImageRequester<'a>,
    max_concurrent: Option<usize>,
    on_failure: ImageFailurePolicy,
    placeholder_url: &'a str,
}

impl<'a> SlideAssembler<'a> {
    pub fn new(requester: ImageRequester<'a>) -> Self {
        Self {
            requester,
            max_concurrent: None,
            on_failure: ImageFailurePolicy::Abort,
            placeholder_url: DEFAULT_PLACEHOLDER_IMAGE_URL,
        }
    }

    /// Caps in-flight image requests. `None` or `Some(0)` means no cap.
    pub fn with_max_concurrent(mut self, max_concurrent: Option<usize>) -> Self {
        self.max_concurrent = max_concurrent.filter(|n| *n > 0);
        self
    }

    pub fn with_failure_policy(
        mut self,
        policy: ImageFailurePolicy,
        placeholder_url: &'a str,
    ) -> Self {
        self.on_failure = policy;
        self.placeholder_url = placeholder_url;
        self
    }

    /// Slides without images. No network calls.
    pub fn assemble_plain(draft: &PresentationDraft) -> Vec<Slide> {
        let total = draft.slides.len();
        draft
            .slides
            .iter()
            .enumerate()
            .map(|(index, slide)| Slide::from_draft(slide, index, total))
            .collect()
    }

    pub async fn assemble(
        &self,
        draft: &PresentationDraft,
        want_images: bool,
    ) -> Result<Vec<Slide>> {
        if want_images {
            self.assemble_with_images(draft).await
        } else {
            Ok(Self::assemble_plain(draft))
        }
    }

    async fn assemble_with_images(&self, draft: &PresentationDraft) -> Result<Vec<Slide>> {
        let total = draft.slides.len();
        if total == 0 {
            return Ok(Vec::new());
        }
        let limit = self.max_concurrent.unwrap_or(total);
        tracing::info!(slides = total, limit, "generating images");

        let mut pending = stream::iter(draft.slides.iter().enumerate())
            .map(|(index, slide)| async move {
                let outcome = self
                    .requester
                    .request(index, &slide.image_description, &draft.image_style)
                    .await;
                (index, outcome)
            })
            .buffer_unordered(limit);

        let mut slots: Vec<Option<Slide>> = vec![None; total];
        // Returning early drops `pending`, which cancels requests still in flight.
        while let Some((index, outcome)) = pending.next().await {
            let source = &draft.slides[index];
            let image_url = match outcome {
                Ok(url) => {
                    tracing::debug!(slide = index, "image ready");
                    Some(url)
                }
                Err(err) => self.on_failure.resolve(err, self.placeholder_url)?,
            };
            let slide = Slide::from_draft(source, index, total);
            slots[index] = Some(match image_url {
                Some(url) => slide.with_image(url, &source.image_description),
                None => slide,
            });
        }

        Ok(slots.into_iter().flatten().collect())
    }
}
