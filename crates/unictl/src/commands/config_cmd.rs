//! Config subcommand handlers.

use serde::Serialize;

use unictl_config::Profile;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct ShownProfile<'a> {
    config_path: String,
    profile: &'a str,
    settings: Profile,
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::active_config_path(global);

    match args.command {
        ConfigCommand::Init { force } => {
            unictl_config::write_template(&path, force)
                .map_err(|e| CliError::from_config(e, &path))?;
            eprintln!("Wrote {}", path.display());
            eprintln!("Edit the [profiles.default] section, then run: unictl login");
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&path.display().to_string());
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let (name, profile) = config::effective_profile(global, &cfg)?;
            let shown = ShownProfile {
                config_path: path.display().to_string(),
                profile: &name,
                settings: profile.redacted(),
            };
            output::print_output(&output::render(global.output, &shown)?);
            Ok(())
        }
    }
}
