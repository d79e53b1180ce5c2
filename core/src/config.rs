use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::error::GenerationError;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Transparent 512x512 SVG.
pub const DEFAULT_PLACEHOLDER_IMAGE_URL: &str = concat!(
    "data:image/svg+xml;utf8,",
    "%3Csvg xmlns='http://www.w3.org/2000/svg' width='512' height='512'%2F%3E"
);

/// Searched in order by [`Config::load_from_dir`].
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
    ".unprepared/config.toml",
    ".unprepared/config.json",
    "unprepared.toml",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    IoError {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {source}")]
    ParseError { source: serde_json::Error },
    #[error("Failed to parse TOML config: {source}")]
    TomlParseError { source: toml::de::Error },
    #[error("No API key configured. Set OPENAI_API_KEY or api_key in the config file")]
    MissingApiKey,
    #[error("max_concurrent_images must be at least 1")]
    ZeroConcurrency,
}

/// What to do when one slide's image request fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFailurePolicy {
    /// Fail the whole run.
    #[default]
    Abort,
    /// Keep the slide without an image.
    Omit,
    /// Keep the slide with `placeholder_image_url`.
    Placeholder,
}

impl ImageFailurePolicy {
    /// Decides the outcome of a failed image request: `Ok(Some(url))` keeps the
    /// slide with that image, `Ok(None)` keeps it bare, `Err` ends the run.
    pub fn resolve(
        self,
        error: GenerationError,
        placeholder_url: &str,
    ) -> Result<Option<String>, GenerationError> {
        match self {
            Self::Abort => Err(error),
            Self::Omit => {
                tracing::warn!("{error}; continuing without image");
                Ok(None)
            }
            Self::Placeholder => {
                tracing::warn!("{error}; using placeholder image");
                Ok(Some(placeholder_url.to_string()))
            }
        }
    }
}

/// Run configuration, passed explicitly into the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    /// Sent as `OpenAI-Organization` when set.
    pub organization: Option<String>,
    /// Sent as `OpenAI-Project` when set.
    pub project: Option<String>,
    /// Text model identifier.
    pub model: String,
    /// Upper bound on in-flight image requests; `None` is unbounded.
    pub max_concurrent_images: Option<usize>,
    /// Per-call timeout for text and image requests; `None` waits forever.
    pub request_timeout_secs: Option<u64>,
    pub on_image_failure: ImageFailurePolicy,
    pub placeholder_image_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: unprepared_chatgpt::DEFAULT_BASE_URL.to_string(),
            organization: None,
            project: None,
            model: DEFAULT_MODEL.to_string(),
            max_concurrent_images: None,
            request_timeout_secs: None,
            on_image_failure: ImageFailurePolicy::default(),
            placeholder_image_url: DEFAULT_PLACEHOLDER_IMAGE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML or JSON file, chosen by extension.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let config: Self = if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError { source: e })?
        } else {
            toml::from_str(&contents).map_err(|e| ConfigError::TomlParseError { source: e })?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load the first config file found in the working directory, or defaults.
    pub fn load_with_fallback() -> Result<Self, ConfigError> {
        Self::load_from_dir(Path::new("."))
    }

    /// Load the first of [`CONFIG_FILE_CANDIDATES`] under `dir`. A file that
    /// exists but does not load is an error, not a reason to use defaults.
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        for candidate in CONFIG_FILE_CANDIDATES {
            let path = dir.join(candidate);
            if path.exists() {
                let config = Self::load_from_file(&path)?;
                tracing::info!("Loaded configuration from {}", path.display());
                return Ok(config);
            }
        }

        tracing::debug!("Using default configuration");
        Ok(Self::default())
    }

    /// Overlay `OPENAI_API_KEY`, `OPENAI_BASE_URL`, `OPENAI_ORG`,
    /// `OPENAI_PROJECT` and `UNPREPARED_MODEL`.
    pub fn apply_env(self) -> Self {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    fn apply_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());
        if let Some(key) = var("OPENAI_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(url) = var("OPENAI_BASE_URL") {
            self.base_url = url;
        }
        if let Some(org) = var("OPENAI_ORG") {
            self.organization = Some(org);
        }
        if let Some(project) = var("OPENAI_PROJECT") {
            self.project = Some(project);
        }
        if let Some(model) = var("UNPREPARED_MODEL") {
            self.model = model;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_images == Some(0) {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
