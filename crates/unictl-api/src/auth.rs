// Session authentication
//
// Cookie-based login/logout. A successful login stores the cookies the
// controller hands back; every later request carries them until logout
// or until the client is dropped.

use reqwest::Method;
use reqwest::header::SET_COOKIE;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::{Body, Client};
use crate::envelope;
use crate::error::Error;
use crate::models::ApiResponse;

/// Login endpoint. Takes `remember=<bool>` as a query parameter.
pub const LOGIN_PATH: &str = "/api/login";

/// Logout endpoint.
pub const LOGOUT_PATH: &str = "/api/logout";

impl Client {
    /// Authenticate with the controller using username/password.
    ///
    /// With `remember` the controller issues a long-running session, which
    /// [`logout`](Self::logout) later destroys server-side. The session
    /// cookies are only stored when the controller reports `rc == "ok"`.
    pub async fn login(
        &mut self,
        username: &str,
        password: &SecretString,
        remember: bool,
    ) -> Result<(), Error> {
        let remember_flag = if remember { "true" } else { "false" };
        let url = self.url_for(LOGIN_PATH, &["remember", remember_flag]);

        debug!("logging in at {}", url);

        let body = Body::json(&json!({
            "username": username,
            "password": password.expose_secret(),
        }))?;

        let resp = self.send(Method::POST, url, Some(body)).await?;
        let status = resp.status();
        let cookies = session_cookies(resp.headers());

        let bytes = resp.bytes().await.map_err(Error::BodyRead)?;
        let mut login = ApiResponse::default();
        if let Err(e) = envelope::decode(&bytes, &mut login) {
            if status.is_success() {
                return Err(e.into());
            }
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status})"),
            });
        }

        if !login.meta.rc.is_ok() {
            let message = login
                .meta
                .msg
                .filter(|msg| !msg.is_empty())
                .unwrap_or_else(|| format!("unable to login, response code: {}", login.meta.rc));
            return Err(Error::Authentication { message });
        }

        debug!(cookies = cookies.len(), remember, "login successful");
        self.cookies = cookies;
        self.long_running = remember;
        Ok(())
    }

    /// End the current session.
    ///
    /// Only a long-running (`remember`) session is destroyed server-side;
    /// otherwise no request is made. The stored cookies are dropped either
    /// way.
    pub async fn logout(&mut self) -> Result<(), Error> {
        if !self.long_running {
            debug!("no long-running session; dropping cookies");
            self.cookies.clear();
            return Ok(());
        }

        debug!("logging out");
        let mut resp = ApiResponse::default();
        let result = self
            .execute(Method::GET, LOGOUT_PATH, None, Some(&mut resp), &[])
            .await;

        self.cookies.clear();
        self.long_running = false;
        if result.is_ok() {
            debug!("logout complete");
        }
        result
    }
}

/// Extract `name=value` pairs from `Set-Cookie` headers, ignoring
/// attributes.
fn session_cookies(headers: &reqwest::header::HeaderMap) -> Vec<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|raw| raw.split(';').next())
        .map(str::trim)
        .filter(|pair| pair.contains('=') && !pair.starts_with('='))
        .map(str::to_owned)
        .collect()
}
