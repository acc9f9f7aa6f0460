use anyhow::Result;
use clap::{CommandFactory, Parser};
use tokio::sync::mpsc;
use tracing::{info, warn};

use senseline::cli::Args;
use senseline::config::Config;
use senseline::display::{self, DisplayMode};
use senseline::ipc;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "senseline", &mut std::io::stdout());
        return Ok(());
    }

    if args.init_config {
        let path = Config::init_default_config()?;
        println!("Config written to {}", path.display());
        return Ok(());
    }

    if let Some(ref line) = args.send {
        let response = ipc::send_command(line).await?;
        println!("{}", response);
        if response.starts_with("err:") {
            std::process::exit(1);
        }
        return Ok(());
    }

    // Only a file we actually loaded is written back by "zero"
    let config_path = args
        .config
        .clone()
        .or_else(|| Config::default_path().filter(|p| p.exists()));

    let (mut config, load_error) = match config_path.as_deref().map(Config::load) {
        Some(Ok(config)) => (config, None),
        Some(Err(e)) if args.config.is_some() => return Err(e),
        Some(Err(e)) => (Config::default(), Some(e)),
        None => (Config::default(), None),
    };
    config.merge_args(&args);

    // Initialize logging; the simulator owns the terminal, so keep it quiet there
    let default_level = match config.display.mode {
        DisplayMode::Terminal => "senseline=warn",
        DisplayMode::Headless => "senseline=info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Some(e) = load_error {
        warn!("{:#}; using defaults", e);
    }

    info!("Starting senseline in {:?} mode", config.display.mode);

    let (ipc_tx, ipc_rx) = mpsc::channel(16);
    if config.display.ipc {
        tokio::spawn(async move {
            if let Err(e) = ipc::start_server(ipc_tx).await {
                warn!("IPC server stopped: {:#}", e);
            }
        });
    }

    match config.display.mode {
        DisplayMode::Terminal => {
            display::terminal::run(config, config_path, ipc_rx).await?;
        }
        DisplayMode::Headless => {
            let frames = args.frames;
            display::headless::run(config, config_path, ipc_rx, frames).await?;
        }
    }

    Ok(())
}
