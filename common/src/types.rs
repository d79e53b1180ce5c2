use serde::{Deserialize, Deserializer, Serialize};

/// One run's worth of input, fixed before the pipeline starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: String,
    pub model: String,
    pub want_images: bool,
}

impl GenerationRequest {
    pub fn new(topic: impl Into<String>, model: impl Into<String>, want_images: bool) -> Self {
        Self {
            topic: topic.into(),
            model: model.into(),
            want_images,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// The document recovered from the model's reply, before normalization.
///
/// Serializes with the JSON contract given to the model (`presentationTitle`,
/// `linearGradient`). Deserialization also accepts the data-model names
/// `title` and `gradientColor`, alone or next to the contract keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawDraft")]
pub struct PresentationDraft {
    #[serde(rename = "presentationTitle")]
    pub title: String,
    pub background_color: String,
    #[serde(rename = "linearGradient", skip_serializing_if = "Option::is_none")]
    pub gradient_color: Option<String>,
    pub text_color: String,
    pub font_family: String,
    pub image_style: String,
    pub slides: Vec<SlideDraft>,
}

/// Wire shape of [`PresentationDraft`]. Both spellings of the renamed keys
/// are separate fields here so a reply carrying both is not a duplicate.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDraft {
    #[serde(default)]
    presentation_title: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    background_color: String,
    #[serde(default)]
    linear_gradient: Option<String>,
    #[serde(default)]
    gradient_color: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    text_color: String,
    #[serde(default, deserialize_with = "null_as_default")]
    font_family: String,
    #[serde(default, deserialize_with = "null_as_default")]
    image_style: String,
    slides: Vec<SlideDraft>,
}

impl TryFrom<RawDraft> for PresentationDraft {
    type Error = String;

    fn try_from(raw: RawDraft) -> Result<Self, Self::Error> {
        let title = raw
            .presentation_title
            .or(raw.title)
            .ok_or_else(|| "missing field `presentationTitle` (or `title`)".to_string())?;
        Ok(Self {
            title,
            background_color: raw.background_color,
            gradient_color: raw.linear_gradient.or(raw.gradient_color),
            text_color: raw.text_color,
            font_family: raw.font_family,
            image_style: raw.image_style,
            slides: raw.slides,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideDraft {
    pub title: String,
    /// Markdown.
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_description: String,
}

/// Models write `null` for fields they have nothing to say about.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A rendering-ready slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub image_description: Option<String>,
    pub is_last_slide: bool,
}

impl Slide {
    /// Builds the slide for `draft` at `index` of a `total`-slide deck,
    /// without an image.
    pub fn from_draft(draft: &SlideDraft, index: usize, total: usize) -> Self {
        Self {
            title: draft.title.clone(),
            content: draft.content.clone(),
            image_url: None,
            image_description: None,
            is_last_slide: total > 0 && index == total - 1,
        }
    }

    pub fn with_image(mut self, url: String, description: &str) -> Self {
        self.image_url = Some(url);
        self.image_description = Some(description.to_string());
        self
    }
}

/// The final document model handed to rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub title: String,
    pub want_images: bool,
    pub text_color: String,
    pub background_color: String,
    pub gradient_color: Option<String>,
    pub font_family: String,
    pub image_style: String,
    pub slides: Vec<Slide>,
}

impl Presentation {
    pub fn from_parts(draft: &PresentationDraft, want_images: bool, slides: Vec<Slide>) -> Self {
        Self {
            title: draft.title.clone(),
            want_images,
            text_color: draft.text_color.clone(),
            background_color: draft.background_color.clone(),
            gradient_color: draft.gradient_color.clone(),
            font_family: draft.font_family.clone(),
            image_style: draft.image_style.clone(),
            slides,
        }
    }
}
