//! Raw request handler.

use tracing::debug;

use unictl_api::envelope;
use unictl_api::{ApiResponse, Body};

use crate::cli::{GlobalOpts, RequestArgs};
use crate::commands::Session;
use crate::error::CliError;
use crate::output;

pub async fn handle(
    session: &Session,
    args: RequestArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let body = match args.data.as_deref() {
        Some(raw) => {
            let json: serde_json::Value = serde_json::from_str(raw)?;
            Some(Body::json(&json).map_err(|e| session.api_err(e))?)
        }
        None => None,
    };
    let query: Vec<&str> = args.query.iter().map(String::as_str).collect();

    let mut resp = ApiResponse::default();
    let result = if args.path.starts_with('/') {
        debug!(path = %args.path, "controller-level request");
        session
            .client
            .execute(args.method, &args.path, body, Some(&mut resp), &query)
            .await
    } else {
        debug!(site = %session.conn.site, path = %args.path, "site-scoped request");
        session
            .client
            .execute_for_site(
                args.method,
                &session.conn.site,
                &args.path,
                body,
                Some(&mut resp),
                &query,
            )
            .await
    };
    result.map_err(|e| session.api_err(e))?;

    output::print_output(&output::render(global.output, &envelope::to_value(&resp))?);
    Ok(())
}
