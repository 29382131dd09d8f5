//! jqlive - live jq query previewer for the terminal

use anyhow::{Context, Result};
use clap::Parser;
use jqlive_core::{Config, ProcessEngine};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

mod input;
mod logging;
mod setup;

use input::load_document;
use logging::init_logging;
use setup::write_template;

#[derive(Parser)]
#[command(name = "jqlive")]
#[command(about = "Type a jq query, watch the output update live")]
#[command(after_help = "\
INPUT:
  jqlive data.json                # Query a file
  curl -s URL | jqlive            # Query piped stdin
  jqlive                          # Query a built-in sample

KEYS:
  Tab                             # Toggle compact output
  Ctrl+S                          # Save output to a file
  PageUp/PageDown, mouse wheel    # Scroll output
  Esc, Ctrl+C                     # Quit")]
struct Cli {
  /// JSON file to query (default: stdin if piped, else a sample document)
  file: Option<PathBuf>,

  /// Start in compact output mode
  #[arg(long)]
  compact: bool,

  /// Config file (default: ~/.config/jqlive/config.toml)
  #[arg(long, value_name = "PATH")]
  config: Option<PathBuf>,

  /// Print the effective config as TOML and exit
  #[arg(long)]
  print_config: bool,

  /// Write a commented config template to the config path and exit
  #[arg(long, conflicts_with = "print_config")]
  init_config: bool,

  /// Evaluate one query request from stdin (used internally)
  #[arg(long, hide = true)]
  eval_worker: bool,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.eval_worker {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    jqlive_core::worker::serve(stdin.lock(), stdout.lock())?;
    return Ok(());
  }

  let runtime = tokio::runtime::Builder::new_multi_thread()
    .enable_all()
    .build()
    .context("Failed to start async runtime")?;
  runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
  if cli.init_config {
    let path = cli
      .config
      .or_else(Config::user_config_path)
      .context("Could not determine config directory")?;
    write_template(&path)?;
    println!("Created config: {}", path.display());
    return Ok(());
  }

  let mut config = match &cli.config {
    Some(path) => Config::load_from(path)?,
    None => Config::load(),
  };
  if cli.compact {
    config.query.compact = true;
  }

  if cli.print_config {
    print!("{}", config.to_toml()?);
    return Ok(());
  }

  let _log_guard = init_logging(&config.log);
  info!(version = env!("CARGO_PKG_VERSION"), "jqlive starting");

  let document = load_document(cli.file.as_deref())?;
  let engine = Arc::new(ProcessEngine::current_exe()?);
  tui::run(document, &config, engine).await.context("Terminal error")?;

  info!("jqlive exiting");
  Ok(())
}
