//! Facebot application shell.
//!
//! Parses the command line, loads configuration, wires the HTTP adapters
//! into the pipeline and dispatches to a subcommand. Core logic lives in
//! the `crates/` directory.

pub mod admin;
pub mod cli;
pub mod commands;
pub mod error;
pub mod state;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use facebot_core::AppConfig;
use tracing::info;

/// Initialize tracing subscriber for logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = if verbose {
        "debug,sqlx=warn,hyper=info,reqwest=info"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

/// Load configuration with environment overrides.
pub fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let config =
        AppConfig::load_with_env(cli.config.as_deref()).context("failed to load configuration")?;
    Ok(config)
}

/// Entry point for the `facebot` binary.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    info!("Starting Facebot v{}", env!("CARGO_PKG_VERSION"));

    if let Some(Commands::InitConfig { force }) = cli.command {
        let path = commands::config::init(cli.config.as_deref(), force)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let config = load_config(&cli)?;
    let command = cli.command.unwrap_or(Commands::Run(cli::RunArgs::default()));

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        match command {
            Commands::Run(args) => commands::daemon::run(config, args).await,
            Commands::ResetStore => commands::store::reset(&config).await,
            Commands::Stats => commands::store::stats(&config).await,
            Commands::Show { id } => commands::store::show(&config, &id).await,
            Commands::TestImage { input, out } => {
                commands::render::test_image(&config, &input, out.as_deref()).await
            }
            Commands::TestDir { dir } => commands::render::test_dir(&config, &dir).await,
            Commands::Validate { check } => commands::config::validate(&config, check).await,
            // Written before the config is loaded.
            Commands::InitConfig { .. } => Ok(()),
        }
    })
}
