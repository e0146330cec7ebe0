//! Login check handler.

use serde::Serialize;

use crate::cli::GlobalOpts;
use crate::commands::Session;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct LoginReport<'a> {
    profile: &'a str,
    controller: &'a str,
    site: &'a str,
    username: &'a str,
    session: bool,
}

/// Report the session that [`Session::open`] established.
pub fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let report = LoginReport {
        profile: &session.conn.profile,
        controller: &session.conn.controller,
        site: &session.conn.site,
        username: &session.username,
        session: session.client.has_session(),
    };
    output::print_output(&output::render(global.output, &report)?);
    Ok(())
}
