//! Configuration for the unictl CLI.
//!
//! TOML profiles, credential resolution (env + plaintext + prompt), and
//! translation into the `unictl_api` transport settings. The CLI layers its
//! flag overrides on top of what this crate resolves.

use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use unictl_api::{TlsMode, TransportConfig};

/// Environment variable consulted for the password when a profile does not
/// name its own.
pub const PASSWORD_ENV: &str = "UNICTL_PASSWORD";

/// Prefix for environment overrides of config keys (`UNICTL_LOG_LEVEL`,
/// `UNICTL_DEFAULTS__TIMEOUT`, ...).
pub const ENV_PREFIX: &str = "UNICTL_";

const REDACTED: &str = "********";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("config file already exists: {}", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    /// Log filter used when neither `RUST_LOG` nor `-v` is given.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named controller profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            log_level: default_log_level(),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Defaults {
    /// Request timeout as a humantime duration (`"30s"`, `"1m 30s"`).
    #[serde(default = "default_timeout")]
    pub timeout: String,

    #[serde(default)]
    pub insecure: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            insecure: false,
        }
    }
}

fn default_log_level() -> String {
    "warn".into()
}
fn default_timeout() -> String {
    "30s".into()
}

/// A named controller profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Profile {
    /// Controller base URL (e.g., "https://192.168.1.1:8443").
    pub controller: String,

    /// Site name.
    #[serde(default = "default_site")]
    pub site: String,

    pub username: Option<String>,

    /// Password (plaintext; prefer `password_env`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable name containing the password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Ask the controller for a long-running session.
    #[serde(default)]
    pub remember: bool,

    /// Override the default insecure TLS setting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// PEM file whose certificates are the only trusted roots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// DER certificate files forming the trusted set.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub certificates: Vec<PathBuf>,

    /// Override the default timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

fn default_site() -> String {
    "default".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "unictl", "unictl").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("unictl");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` + environment. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Commented starter config written by `unictl config init`.
pub const TEMPLATE: &str = r#"# unictl configuration

# Profile used when --profile is not given.
default_profile = "default"

# Log filter when neither RUST_LOG nor -v is set.
log_level = "warn"

[defaults]
# Request timeout (humantime syntax: "30s", "1m 30s").
timeout = "30s"
# Accept any TLS certificate. Prefer ca_cert for self-signed controllers.
insecure = false

[profiles.default]
controller = "https://192.168.1.1:8443"
site = "default"
username = "admin"
# Read the password from this environment variable.
password_env = "UNICTL_PASSWORD"
# Ask for a long-running session (logged out explicitly afterwards).
remember = false
# ca_cert = "/etc/ssl/unifi.pem"
# certificates = ["/etc/ssl/unifi.der"]
"#;

/// Write [`TEMPLATE`] to `path`, refusing to overwrite unless `force`.
pub fn write_template(path: &Path, force: bool) -> Result<(), ConfigError> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, TEMPLATE)?;
    Ok(())
}

// ── Profile selection ───────────────────────────────────────────────

impl Config {
    /// Pick a profile: the named one, else `default_profile`, else
    /// `"default"`.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default")
            .to_owned();
        match self.profiles.get(&name) {
            Some(profile) => Ok((name, profile)),
            None => Err(ConfigError::UnknownProfile { name }),
        }
    }
}

impl Profile {
    /// A copy safe to print: the plaintext password is masked.
    pub fn redacted(&self) -> Self {
        Self {
            password: self.password.as_ref().map(|_| REDACTED.into()),
            ..self.clone()
        }
    }
}

// ── Connection settings ─────────────────────────────────────────────

/// Everything needed to build a client and log in.
#[derive(Debug, Clone)]
pub struct Connection {
    pub profile: String,
    pub controller: String,
    pub site: String,
    pub username: Option<String>,
    pub remember: bool,
    pub transport: TransportConfig,
}

/// Resolve a profile into connection settings (no CLI flag overrides).
pub fn connection(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<Connection, ConfigError> {
    let url: url::Url = profile
        .controller
        .parse()
        .map_err(|e| invalid("controller", format!("invalid URL {:?}: {e}", profile.controller)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            "controller",
            format!("expected an http(s) URL, got {:?}", profile.controller),
        ));
    }

    let timeout = parse_timeout(profile.timeout.as_deref().unwrap_or(&defaults.timeout))?;
    let tls = tls_mode(profile, defaults)?;

    Ok(Connection {
        profile: profile_name.into(),
        controller: profile.controller.clone(),
        site: profile.site.clone(),
        username: profile.username.clone(),
        remember: profile.remember,
        transport: TransportConfig::new(tls, timeout),
    })
}

/// Parse a humantime duration such as `"30s"`.
pub fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    let timeout = humantime::parse_duration(raw.trim())
        .map_err(|e| invalid("timeout", format!("{raw:?}: {e}")))?;
    if timeout.is_zero() {
        return Err(invalid("timeout", "must be greater than zero"));
    }
    Ok(timeout)
}

/// Resolve TLS trust. First match wins: insecure, then `ca_cert`, then
/// `certificates`, then the platform store.
pub fn tls_mode(profile: &Profile, defaults: &Defaults) -> Result<TlsMode, ConfigError> {
    if profile.insecure.unwrap_or(defaults.insecure) {
        return Ok(TlsMode::DangerAcceptInvalid);
    }
    if let Some(ref ca_path) = profile.ca_cert {
        return Ok(TlsMode::CustomCa(ca_path.clone()));
    }
    if !profile.certificates.is_empty() {
        let ders = profile
            .certificates
            .iter()
            .map(|path| {
                std::fs::read(path).map_err(|e| {
                    invalid("certificates", format!("cannot read {}: {e}", path.display()))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(TlsMode::Certificates(ders));
    }
    Ok(TlsMode::System)
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the password without prompting.
///
/// Order: the profile's `password_env` variable, then `UNICTL_PASSWORD`,
/// then the plaintext `password`. `lookup` reads environment variables.
pub fn resolve_password_with(
    profile: &Profile,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    // 1. Profile's password_env → env var lookup
    if let Some(pw) = profile.password_env.as_deref().and_then(&lookup) {
        return Some(SecretString::from(pw));
    }

    // 2. Global env var
    if let Some(pw) = lookup(PASSWORD_ENV) {
        return Some(SecretString::from(pw));
    }

    // 3. Plaintext in config
    profile.password.clone().map(SecretString::from)
}

/// Resolve the password, prompting on a terminal as a last resort.
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
    username: &str,
) -> Result<SecretString, ConfigError> {
    if let Some(pw) = resolve_password_with(profile, |name| std::env::var(name).ok()) {
        return Ok(pw);
    }

    if std::io::stdin().is_terminal() {
        let pw = rpassword::prompt_password(format!("Password for {username}: "))?;
        return Ok(SecretString::from(pw));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}
