//! gridtalk - power system analysis chat assistant

mod config;
mod ui;

use std::sync::Arc;

use clap::Parser;
use gridtalk_ai::GroqOrchestrator;
use gridtalk_chat::{TurnLoop, TurnLoopConfig, one_shot};
use gridtalk_tui::Theme;

/// gridtalk - power system analysis chat assistant
#[derive(Parser, Debug)]
#[command(name = "gridtalk")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model for text-only requests
    #[arg(short, long)]
    model: Option<String>,

    /// Model for requests carrying an image
    #[arg(long)]
    vision_model: Option<String>,

    /// API base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Number of history turns sent to the backend
    #[arg(long)]
    history_limit: Option<usize>,

    /// Pending-image policy (retain, consume-once)
    #[arg(long)]
    image_retention: Option<String>,

    /// Run in non-interactive mode with a single prompt
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Use the light theme
    #[arg(long)]
    light: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("gridtalk=debug")
            .init();
    }

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    // Load config file; CLI args take precedence
    let cfg = config::Config::load();
    tracing::debug!(path = %config::Config::config_path().display(), "config loaded");

    let Some(api_key) = cfg.get_api_key() else {
        eprintln!("Error: no API key found.");
        eprintln!();
        eprintln!("Set GROQ_API_KEY, or add api_key to {}", config::Config::config_path().display());
        std::process::exit(1);
    };

    let mut orchestrator = GroqOrchestrator::new(api_key);
    if let Some(model) = args.model.or(cfg.model.clone()) {
        orchestrator = orchestrator.with_text_model(model);
    }
    if let Some(model) = args.vision_model.or(cfg.vision_model.clone()) {
        orchestrator = orchestrator.with_vision_model(model);
    }
    if let Some(base_url) = args.base_url.or(cfg.base_url.clone()) {
        orchestrator = orchestrator.with_base_url(base_url);
    }
    let orchestrator = Arc::new(orchestrator);

    // Non-interactive one-shot mode: a raw prompt in, the reply out
    if let Some(prompt) = args.command {
        let reply = one_shot(orchestrator, &prompt).await?;
        println!("{}", reply);
        return Ok(());
    }

    let loop_config = TurnLoopConfig {
        history_limit: args.history_limit.or(cfg.history_limit).unwrap_or(6),
        image_retention: args
            .image_retention
            .as_deref()
            .map(|s| config::parse_retention(Some(s)))
            .unwrap_or_else(|| cfg.image_retention()),
    };

    let theme = if args.light || cfg.theme.as_deref() == Some("light") {
        Theme::light()
    } else {
        Theme::dark()
    };

    let turns = TurnLoop::new(loop_config, orchestrator);
    ui::run(turns, theme).await
}
