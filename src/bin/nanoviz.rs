//! CLI for nanoviz - Gemini image generation.

use clap::{Parser, ValueEnum};
use nanoviz::{generate_image, GenerationMetadata, GenerationRequest, GenerationResult, Settings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nanoviz")]
#[command(about = "Generate images with Nano Banana (Gemini Image) API")]
#[command(version)]
struct Cli {
    /// Text prompt for image generation
    prompt: String,

    /// Output path
    #[arg(short, long, default_value = nanoviz::image::DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Model: 'pro' (high quality) or 'flash' (fast)
    #[arg(short, long, value_enum, default_value = "pro")]
    model: ModelArg,

    /// Aspect ratio
    #[arg(short, long, value_enum, default_value = "landscape")]
    aspect: AspectArg,

    /// Input image for editing/reference (can repeat)
    #[arg(short, long, value_name = "IMAGE")]
    input: Vec<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    Pro,
    Flash,
}

impl ModelArg {
    fn alias(self) -> &'static str {
        match self {
            Self::Pro => "pro",
            Self::Flash => "flash",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AspectArg {
    Landscape,
    Portrait,
    Square,
    Cinematic,
    Wide,
}

impl AspectArg {
    fn alias(self) -> &'static str {
        match self {
            Self::Landscape => "landscape",
            Self::Portrait => "portrait",
            Self::Square => "square",
            Self::Cinematic => "cinematic",
            Self::Wide => "wide",
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    // A missing .env is fine; the process environment may hold the key.
    dotenv::dotenv().ok();
    let settings = Settings::from_env();

    let request = cli
        .input
        .iter()
        .fold(GenerationRequest::new(&cli.prompt), |req, path| {
            req.with_input_image(path)
        })
        .with_output(&cli.output)
        .with_model(cli.model.alias())
        .with_aspect_ratio(cli.aspect.alias());

    let result = generate_image(&request, &settings).await?;
    println!("{}", render(&result, cli.json)?);

    Ok(())
}

/// Formats the success report printed on stdout.
fn render(result: &GenerationResult, json: bool) -> anyhow::Result<String> {
    if !json {
        return Ok(format!("Image saved: {}", result.path.display()));
    }

    // Non-UTF-8 paths cannot be represented in JSON.
    let result = serde_json::to_value(result)?;
    let output = serde_json::json!({
        "type": "image",
        "success": true,
        "result": result,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}
