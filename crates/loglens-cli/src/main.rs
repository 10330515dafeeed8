//! CLI entry point and composition root.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use loglens_cli::error::exit_code_for;
use loglens_cli::{Cli, CliConfig, Commands, bootstrap, handlers};
use loglens_core::{AndroidOptions, IosOptions};
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so they never mix with streamed entries on stdout.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::from_cli(&cli);
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let ctx = bootstrap(config)?;

    match command {
        Commands::Android {
            device,
            level,
            buffer,
            grep,
        } => {
            let options = AndroidOptions::new(device.as_deref(), &level, &buffer);
            handlers::stream::execute(&ctx, options.into(), grep.as_deref()).await?;
        }
        Commands::Ios {
            device,
            process,
            grep,
        } => {
            let options = IosOptions::new(device.as_deref(), process.as_deref());
            handlers::stream::execute(&ctx, options.into(), grep.as_deref()).await?;
        }
        Commands::Devices { platform } => {
            handlers::devices::execute(&ctx, platform.map(Into::into)).await?;
        }
        Commands::Processes { device } => {
            handlers::devices::processes(&ctx, &device).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before anything reads the environment.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}
