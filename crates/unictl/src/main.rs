mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use unictl_config::Config;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // The config supplies the fallback log level, so load it first
    let loaded = config::load(&cli.global);
    let log_level = loaded.as_ref().map_or("warn", |cfg| cfg.log_level.as_str());
    init_tracing(cli.global.verbose, log_level);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli, loaded).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, configured: &str) {
    let filter = match verbosity {
        0 => configured,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli, loaded: Result<Config, CliError>) -> Result<(), CliError> {
    match cli.command {
        // Config commands work even when the file is missing or broken
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "unictl", &mut std::io::stdout());
            Ok(())
        }

        // All other commands require a controller session
        cmd => {
            let cfg = loaded?;
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &cli.global, &cfg).await
        }
    }
}
