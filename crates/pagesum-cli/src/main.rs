//! Pagesum CLI - summarize a web page in the terminal

use clap::Parser;
use pagesum::config::{MAX_BODY_CHARS, MODEL};
use pagesum::{present, Config, Summarizer, TerminalDisplay, DEFAULT_URL};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Pagesum - fetch a web page and summarize it with an LLM
#[derive(Parser, Debug)]
#[command(name = "pagesum")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// URL to summarize
    #[arg(default_value = DEFAULT_URL)]
    url: String,

    /// Env file holding OPENAI_API_KEY and other settings
    #[arg(long, default_value = pagesum::config::DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    /// Model identifier (overrides PAGESUM_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Truncate page text to this many characters (overrides PAGESUM_MAX_BODY_CHARS)
    #[arg(long)]
    max_body_chars: Option<usize>,

    /// Print without colors or emphasis (implied when stdout is not a terminal)
    #[arg(long)]
    plain: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), pagesum::Error> {
    let config = load_config(&cli)?;
    let summarizer = Summarizer::from_config(&config)?;

    tracing::info!(url = %cli.url, model = %summarizer.settings().model, "Summarizing");
    let summary = summarizer.summarize_url(&cli.url).await?;

    let styled = !cli.plain && std::io::stdout().is_terminal();
    let mut display = TerminalDisplay::stdout(styled);
    present(summary.as_deref(), &mut display);
    Ok(())
}

/// Env file plus command-line overrides
fn load_config(cli: &Cli) -> Result<Config, pagesum::ConfigError> {
    let mut config = Config::load(&cli.env_file)?;
    if let Some(ref model) = cli.model {
        config.set(MODEL, model.as_str());
    }
    if let Some(max) = cli.max_body_chars {
        config.set(MAX_BODY_CHARS, max.to_string());
    }
    Ok(config)
}

/// Log to stderr so stdout carries only the summary
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
