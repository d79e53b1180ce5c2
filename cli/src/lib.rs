use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use unprepared_chatgpt::OpenAiClient;
use unprepared_common::{GenerationRequest, Presentation};
use unprepared_core::{Config, ImageFailurePolicy, OpenAiGenerator, PresentationBuilder};

pub mod render;

/// Generate a slide deck about a topic you were unprepared for.
#[derive(Debug, Parser)]
#[command(name = "unprepared", version)]
#[command(about = "AI-generated slide presentations from a topic")]
pub struct Cli {
    /// The presentation topic
    #[arg(required = true, value_name = "TOPIC")]
    pub topic: Vec<String>,

    /// Chat completion model (e.g., gpt-4, gpt-3.5-turbo)
    #[arg(long)]
    pub model: Option<String>,

    /// Include AI-generated images
    #[arg(long)]
    pub images: bool,

    /// Print the generated presentation as JSON and log verbosely
    #[arg(long)]
    pub debug: bool,

    /// Output directory
    #[arg(short, long, default_value = "presentation")]
    pub output: PathBuf,

    /// HTML template to render instead of the built-in one
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Maximum number of image requests in flight (default: unbounded)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_concurrent_images: Option<u64>,

    /// Per-request timeout in seconds (default: none)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// What to do when an image request fails
    #[arg(long, value_enum)]
    pub on_image_failure: Option<OnImageFailure>,

    /// Config file (TOML or JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Do not open the result in a browser
    #[arg(long)]
    pub no_open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnImageFailure {
    Abort,
    Omit,
    Placeholder,
}

impl From<OnImageFailure> for ImageFailurePolicy {
    fn from(value: OnImageFailure) -> Self {
        match value {
            OnImageFailure::Abort => ImageFailurePolicy::Abort,
            OnImageFailure::Omit => ImageFailurePolicy::Omit,
            OnImageFailure::Placeholder => ImageFailurePolicy::Placeholder,
        }
    }
}

impl Cli {
    pub fn topic(&self) -> String {
        self.topic.join(" ")
    }

    /// Flags win over environment, which wins over the config file.
    pub fn apply_overrides(&self, mut config: Config) -> Result<Config> {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(max) = self.max_concurrent_images {
            config.max_concurrent_images = Some(usize::try_from(max)?);
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout_secs = Some(secs);
        }
        if let Some(policy) = self.on_image_failure {
            config.on_image_failure = policy.into();
        }
        config.validate()?;
        Ok(config)
    }

    fn load_config(&self) -> Result<Config> {
        let base = match &self.config {
            Some(path) => Config::load_from_file(path)?,
            None => Config::load_with_fallback()?,
        };
        self.apply_overrides(base.apply_env())
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "warn,unprepared=debug" } else { "warn,unprepared=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = cli.load_config()?;
    let request = GenerationRequest::new(cli.topic(), config.model.clone(), cli.images);

    let client = OpenAiClient::new(config.api_key()?.to_string())
        .with_base_url(config.base_url.as_str())
        .with_organization(config.organization.clone())
        .with_project(config.project.clone());
    let generator = Arc::new(OpenAiGenerator::new(client));
    let builder = PresentationBuilder::new(config, generator.clone(), generator);

    let presentation = builder.build(&request).await?;

    if cli.debug {
        println!("{}", serde_json::to_string_pretty(&presentation)?);
    }

    let html_path =
        write_presentation(&presentation, cli.template.as_deref(), &cli.output).await?;
    println!("Presentation saved to: {}", html_path.display());

    if !cli.no_open {
        if let Err(e) = webbrowser::open(&html_path.to_string_lossy()) {
            tracing::warn!("Failed to open {}: {e}", html_path.display());
        }
    }

    Ok(())
}

/// Renders `presentation` into `output_dir/presentation.html`.
pub async fn write_presentation(
    presentation: &Presentation,
    template: Option<&Path>,
    output_dir: &Path,
) -> Result<PathBuf> {
    let template = match template {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading template {}", path.display()))?,
        None => render::DEFAULT_TEMPLATE.to_string(),
    };
    let html = render::render_html(presentation, &template);

    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("creating {}", output_dir.display()))?;
    let html_path = output_dir.join("presentation.html");
    tokio::fs::write(&html_path, html)
        .await
        .with_context(|| format!("writing {}", html_path.display()))?;
    tracing::info!(path = %html_path.display(), "wrote presentation");
    Ok(html_path)
}
