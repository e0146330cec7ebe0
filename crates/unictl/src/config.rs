//! CLI configuration -- thin wrapper around `unictl_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--controller, --site, --username, --insecure, --timeout).

use std::path::PathBuf;

use unictl_api::TlsMode;
use unictl_config::{Config, Connection, Profile};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// The config file this invocation reads: `--config` or the platform path.
pub fn active_config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(unictl_config::config_path)
}

/// Load the config for this invocation.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let path = active_config_path(global);
    unictl_config::load_config_from(&path).map_err(|e| CliError::from_config(e, &path))
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// The profile to connect with, after flag overrides.
///
/// Without a matching profile, `--controller` alone is enough to build an
/// ad-hoc one.
pub fn effective_profile(
    global: &GlobalOpts,
    config: &Config,
) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, config);

    let mut profile = match (config.profiles.get(&name), global.controller.as_deref()) {
        (Some(profile), _) => profile.clone(),
        (None, Some(controller)) => Profile {
            controller: controller.into(),
            site: "default".into(),
            ..Profile::default()
        },
        (None, None) => {
            return Err(CliError::ProfileNotFound {
                name,
                available: available_profiles(config),
            });
        }
    };

    // Flag > env > profile
    if let Some(ref controller) = global.controller {
        profile.controller.clone_from(controller);
    }
    if let Some(ref site) = global.site {
        profile.site.clone_from(site);
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if let Some(ref timeout) = global.timeout {
        profile.timeout = Some(timeout.clone());
    }

    Ok((name, profile))
}

/// Resolve connection settings for this invocation.
pub fn resolve_connection(
    global: &GlobalOpts,
    config: &Config,
) -> Result<(Profile, Connection), CliError> {
    let path = active_config_path(global);
    let (name, profile) = effective_profile(global, config)?;

    let mut conn = unictl_config::connection(&profile, &name, &config.defaults)
        .map_err(|e| CliError::from_config(e, &path))?;
    if global.insecure {
        conn.transport.tls = TlsMode::DangerAcceptInvalid;
    }

    Ok((profile, conn))
}

fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
