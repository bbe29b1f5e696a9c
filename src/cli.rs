use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use atty::Stream;
use clap::{Args, Parser, Subcommand};
use dermai_coach::{
    AnalysisInput, Analyzer, GeminiClient, GeminiConfig, ImageUpload, Page, SessionBoard,
    WellnessResponse,
    gemini::{DEFAULT_ENDPOINT, DEFAULT_MODEL},
};
use serde_json::json;
use termimad::{FmtText, MadSkin, terminal_size};
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "dermai_coach=info,tower_http=info";

#[derive(Parser, Debug)]
#[command(name = "dermai-coach", about = "DermAI Coach skin check-in service", version)]
pub struct Cli {
    /// Emit JSON instead of human-readable output.
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    model: ModelArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct ModelArgs {
    /// Gemini API key. Falls back to GEMINI_API_KEY when API_KEY is unset.
    #[arg(long, env = "API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Model used for the check-in analysis.
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL, global = true)]
    model: String,

    /// Base URL of the generative language API.
    #[arg(long, env = "GEMINI_ENDPOINT", default_value = DEFAULT_ENDPOINT, global = true)]
    endpoint: String,

    /// Give up on a model call after this many seconds. No limit when unset.
    #[arg(long, global = true)]
    request_timeout_secs: Option<u64>,
}

impl ModelArgs {
    fn into_config(self) -> GeminiConfig {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("GEMINI_API_KEY").ok());
        GeminiConfig {
            api_key,
            model: self.model,
            endpoint: self.endpoint,
            timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web site and check-in service.
    #[cfg(feature = "web")]
    Serve(ServeArgs),
    /// Run one check-in from the terminal and print the result.
    Analyze {
        /// Symptom description.
        #[arg(long, default_value = "")]
        text: String,
        /// Photo of the affected skin area.
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// List the site's pages and their paths.
    Pages,
}

#[cfg(feature = "web")]
#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind.
    #[arg(long, env = "DERMAI_ADDR", default_value = "127.0.0.1:8080")]
    addr: SocketAddr,
    /// Public base URL used for canonical links and the sitemap. Defaults to http://<addr>.
    #[arg(long, env = "DERMAI_BASE_URL")]
    base_url: Option<String>,
    /// Largest accepted upload, in bytes.
    #[arg(long, default_value_t = 10 * 1024 * 1024)]
    max_upload_bytes: usize,
    /// Number of browser sessions whose check-in state is remembered.
    #[arg(long, default_value_t = dermai_coach::analyzer::DEFAULT_SESSION_CAPACITY)]
    session_capacity: usize,
}

#[derive(Debug, Error)]
enum ConfigError {
    #[error("failed to read image {path:?}: {source}")]
    ImageRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path:?} does not look like a JPG or PNG image")]
    UnsupportedImage { path: PathBuf },
    #[error("provide --text, --image, or both")]
    NoInput,
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let config = cli.model.into_config();
    match cli.command {
        #[cfg(feature = "web")]
        Command::Serve(args) => runtime.block_on(handle_serve(args, config)),
        Command::Analyze { text, image } => {
            runtime.block_on(handle_analyze(text, image, config, cli.json))
        }
        Command::Pages => handle_pages(cli.json),
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    // Logs go to stderr so `analyze --json` output stays clean.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(feature = "web")]
async fn handle_serve(args: ServeArgs, config: GeminiConfig) -> Result<(), Box<dyn Error>> {
    let client = GeminiClient::new(config)?;
    tracing::info!(model = client.model(), "Model client ready");
    let web_config = dermai_coach::web::WebConfig {
        addr: args.addr,
        base_url: args
            .base_url
            .unwrap_or_else(|| format!("http://{}", args.addr)),
        max_upload_bytes: args.max_upload_bytes,
        session_capacity: args.session_capacity,
    };
    dermai_coach::web::serve(web_config, Arc::new(client)).await?;
    Ok(())
}

async fn handle_analyze(
    text: String,
    image: Option<PathBuf>,
    config: GeminiConfig,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let image = image.map(read_image).transpose()?;
    let input = AnalysisInput { text, image };
    if input.is_empty() {
        return Err(ConfigError::NoInput.into());
    }
    let client = GeminiClient::new(config)?;
    let analyzer = Analyzer::new(Arc::new(client), SessionBoard::new(1));
    let response = analyzer.analyze(&input).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response);
    }
    Ok(())
}

fn read_image(path: PathBuf) -> Result<ImageUpload, ConfigError> {
    let bytes = std::fs::read(&path).map_err(|source| ConfigError::ImageRead {
        path: path.clone(),
        source,
    })?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let mime_type = match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => return Err(ConfigError::UnsupportedImage { path }),
    };
    Ok(ImageUpload::new(Some(mime_type), bytes))
}

fn handle_pages(as_json: bool) -> Result<(), Box<dyn Error>> {
    if as_json {
        let payload: Vec<_> = Page::ALL
            .iter()
            .map(|page| json!({ "page": page, "path": page.path(), "title": page.title() }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }
    let width = Page::ALL
        .iter()
        .map(|page| page.path().len())
        .max()
        .unwrap_or(4)
        .max("PATH".len());
    println!("{:<width$}  {}", "PATH", "TITLE", width = width);
    println!("{:-<width$}  {}", "", "-----", width = width);
    for page in Page::ALL {
        println!("{:<width$}  {}", page.path(), page.title(), width = width);
    }
    Ok(())
}

fn print_response(response: &WellnessResponse) {
    render_markdown_block("Visual Observations", &response.visual_interpretation);
    render_markdown_block("Symptom Summary", &response.symptom_summary);
    let tips = response
        .wellness_suggestions
        .iter()
        .enumerate()
        .map(|(idx, tip)| format!("{}. {tip}", idx + 1))
        .collect::<Vec<_>>()
        .join("\n");
    render_markdown_block("Wellness Suggestions", &tips);
    let resources = response
        .resources()
        .iter()
        .map(|resource| format!("- {} ({})", resource.title, resource.url))
        .collect::<Vec<_>>()
        .join("\n");
    render_markdown_block("Trusted Resources", &resources);
    render_markdown_block("Daily Log Summary", &response.trackable_summary);
    render_markdown_block("Disclaimer", response.disclaimer_or_default());
}

fn stdout_is_tty() -> bool {
    atty::is(Stream::Stdout)
}

fn markdown_width() -> usize {
    let (width, _) = terminal_size();
    width.max(60) as usize
}

fn render_markdown_block(title: &str, body: &str) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return;
    }
    println!("\n{title}:");
    if stdout_is_tty() {
        let skin = MadSkin::default();
        let formatted = FmtText::from(&skin, trimmed, Some(markdown_width()));
        println!("{formatted}");
    } else {
        println!("{trimmed}");
    }
}
