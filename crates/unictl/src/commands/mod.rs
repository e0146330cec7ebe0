//! Command dispatch: bridges CLI args -> controller session -> output.

pub mod config_cmd;
pub mod login;
pub mod request;

use tracing::{debug, warn};

use unictl_api::Client;
use unictl_config::{Config, Connection};

use crate::cli::{Command, GlobalOpts};
use crate::config;
use crate::error::CliError;

/// Dispatch a controller-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    let mut session = Session::open(global, cfg).await?;

    let result = match cmd {
        Command::Login => login::handle(&session, global),
        Command::Request(args) => request::handle(&session, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    };

    session.close().await;
    result
}

// ── Session ─────────────────────────────────────────────────────────

/// A logged-in client plus the settings it was built from.
pub struct Session {
    pub client: Client,
    pub conn: Connection,
    pub username: String,
}

impl Session {
    /// Build the client and log in.
    pub async fn open(global: &GlobalOpts, cfg: &Config) -> Result<Self, CliError> {
        let path = config::active_config_path(global);
        let (profile, conn) = config::resolve_connection(global, cfg)?;

        let username = conn.username.clone().ok_or_else(|| CliError::NoCredentials {
            profile: conn.profile.clone(),
        })?;
        let password = unictl_config::resolve_password(&profile, &conn.profile, &username)
            .map_err(|e| CliError::from_config(e, &path))?;

        let mut client = Client::new(&conn.controller, &conn.transport)
            .map_err(|e| CliError::from_api(e, &conn.controller, &conn.profile))?;

        debug!(profile = %conn.profile, controller = %conn.controller, "logging in");
        client
            .login(&username, &password, conn.remember)
            .await
            .map_err(|e| CliError::from_api(e, &conn.controller, &conn.profile))?;

        Ok(Self {
            client,
            conn,
            username,
        })
    }

    /// Map a library error raised during this session.
    pub fn api_err(&self, err: unictl_api::Error) -> CliError {
        CliError::from_api(err, &self.conn.controller, &self.conn.profile)
    }

    /// Log out. Failures are reported but never fail the command.
    pub async fn close(&mut self) {
        if let Err(e) = self.client.logout().await {
            warn!(error = %e, "logout failed");
        }
    }
}
