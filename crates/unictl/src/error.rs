//! CLI error types with miette diagnostics.
//!
//! Maps library errors into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use unictl_api::Error as ApiError;
use unictl_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const CONFIG: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to controller at {url}")]
    #[diagnostic(
        code(unictl::connection_failed),
        help(
            "Check that the controller is running and reachable.\n\
             Self-signed certificate? Try --insecure (-k) or set ca_cert in your profile."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: ApiError,
    },

    #[error("Request to {url} timed out")]
    #[diagnostic(
        code(unictl::timeout),
        help("Increase the timeout with --timeout or check controller responsiveness.")
    )]
    Timeout {
        url: String,
        #[source]
        source: ApiError,
    },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(unictl::tls),
        help("Check the ca_cert / certificates paths in your profile.")
    )]
    Tls { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(unictl::auth_failed),
        help(
            "Verify the username and password for profile '{profile}'.\n\
             The password is read from password_env, UNICTL_PASSWORD, or the profile."
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(unictl::no_credentials),
        help(
            "Set username in the profile (or pass --username) and export UNICTL_PASSWORD.\n\
             Create a profile with: unictl config init"
        )
    )]
    NoCredentials { profile: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Controller returned {code}: {message}")]
    #[diagnostic(code(unictl::api_error))]
    ApiStatus { code: String, message: String },

    #[error(transparent)]
    #[diagnostic(code(unictl::api))]
    Api(ApiError),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(unictl::validation))]
    Validation { field: String, reason: String },

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(unictl::json), help("Pass a single JSON document to --data."))]
    Json(#[from] serde_json::Error),

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(unictl::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: unictl config init, or pass --controller"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("{source}")]
    #[diagnostic(code(unictl::config), help("Config file: {path}"))]
    Config {
        path: String,
        #[source]
        source: ConfigError,
    },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Tls { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Validation { .. } | Self::Json(_) => exit_code::USAGE,
            Self::ProfileNotFound { .. } | Self::Config { .. } => exit_code::CONFIG,
            _ => exit_code::GENERAL,
        }
    }

    /// Wrap a library error raised while talking to `url`.
    pub fn from_api(err: ApiError, url: &str, profile: &str) -> Self {
        match err {
            ApiError::Transport(ref e) if e.is_timeout() => Self::Timeout {
                url: url.into(),
                source: err,
            },
            ApiError::Transport(_) => Self::ConnectionFailed {
                url: url.into(),
                source: err,
            },
            ApiError::Tls(message) => Self::Tls { message },
            ApiError::InvalidUrl(reason) => Self::Validation {
                field: "controller".into(),
                reason,
            },
            ApiError::Validation(reason) => Self::Validation {
                field: "request".into(),
                reason,
            },
            ApiError::Authentication { message } => Self::AuthFailed {
                profile: profile.into(),
                message,
            },
            ApiError::Status { code, message } if err_is_login(&message) => Self::AuthFailed {
                profile: profile.into(),
                message: format!("{message} ({code})"),
            },
            ApiError::Status { code, message } => Self::ApiStatus {
                code: code.to_string(),
                message,
            },
            other => Self::Api(other),
        }
    }

    /// Wrap a config error, keeping the file path for the help text.
    pub fn from_config(err: ConfigError, path: &std::path::Path) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            source => Self::Config {
                path: path.display().to_string(),
                source,
            },
        }
    }
}

fn err_is_login(message: &str) -> bool {
    message == unictl_api::error::MSG_LOGIN_REQUIRED
}
