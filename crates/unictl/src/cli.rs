//! Clap derive structures for the `unictl` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// unictl -- talk to a UniFi controller's management API
#[derive(Debug, Parser)]
#[command(
    name = "unictl",
    version,
    about = "Query a UniFi network controller from the command line",
    long_about = "Authenticate against a UniFi controller and issue raw API calls.\n\n\
        Responses are decoded losslessly: fields unictl does not know about\n\
        are printed back exactly as the controller sent them.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file to use instead of the platform default
    #[arg(long, env = "UNICTL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Controller profile to use
    #[arg(long, short = 'p', env = "UNICTL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller URL (overrides profile)
    #[arg(long, short = 'c', env = "UNICTL_CONTROLLER", global = true)]
    pub controller: Option<String>,

    /// Site name (overrides profile)
    #[arg(long, short = 's', env = "UNICTL_SITE", global = true)]
    pub site: Option<String>,

    /// Username for login (overrides profile)
    #[arg(long, short = 'u', env = "UNICTL_USERNAME", global = true)]
    pub username: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout, e.g. "10s" (overrides profile)
    #[arg(long, env = "UNICTL_TIMEOUT", global = true)]
    pub timeout: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "UNICTL_OUTPUT",
        default_value = "json",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the configured credentials are accepted
    Login,

    /// Send one API call and print the decoded response
    #[command(alias = "req", alias = "r")]
    Request(RequestArgs),

    /// Manage the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Request ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, DELETE, ...)
    #[arg(value_parser = parse_method)]
    pub method: unictl_api::Method,

    /// API path. A leading '/' addresses the controller root
    /// (`/api/self`); otherwise the path is scoped to the site
    /// (`stat/device` becomes `/api/s/<site>/stat/device`). Pass query
    /// parameters with --query, not inline after '?'.
    #[arg(value_parser = parse_path)]
    pub path: String,

    /// Query parameter, repeatable: --query KEY VALUE (the only way to
    /// send a query string)
    #[arg(long, short = 'q', num_args = 2, value_names = ["KEY", "VALUE"], action = clap::ArgAction::Append)]
    pub query: Vec<String>,

    /// JSON request body
    #[arg(long, short = 'd')]
    pub data: Option<String>,
}

fn parse_method(raw: &str) -> Result<unictl_api::Method, String> {
    unictl_api::Method::from_bytes(raw.to_ascii_uppercase().as_bytes())
        .map_err(|e| format!("invalid HTTP method {raw:?}: {e}"))
}

fn parse_path(raw: &str) -> Result<String, String> {
    if raw.contains('?') || raw.contains('#') {
        return Err(format!(
            "{raw:?} contains an inline query; pass parameters with --query KEY VALUE"
        ));
    }
    Ok(raw.to_owned())
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a commented starter config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print where the config file is read from
    Path,

    /// Print the resolved profile (password redacted)
    Show,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
