//! Recovers a [`PresentationDraft`] from the model's raw reply.
//!
//! Models sometimes open with chit-chat before the JSON. Everything before
//! the first `{` is discarded; the rest must be exactly one JSON object.

use unprepared_common::PresentationDraft;

use crate::error::{GenerationError, Result};

/// Byte offset of the first `{`, if any.
pub fn locate_document_start(response: &str) -> Option<usize> {
    response.find('{')
}

/// Parses `document` as a draft. Missing `title`/`slides` are reported
/// as malformed.
pub fn parse_draft(document: &str) -> Result<PresentationDraft> {
    serde_json::from_str(document).map_err(|e| GenerationError::malformed(e.to_string()))
}

pub fn extract_draft(response: &str) -> Result<PresentationDraft> {
    let start = locate_document_start(response)
        .ok_or_else(|| GenerationError::malformed("no JSON object in response"))?;
    if start > 0 {
        tracing::debug!(skipped = start, "discarding text before JSON object");
    }
    parse_draft(&response[start..])
}
