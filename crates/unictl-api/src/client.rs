// Controller HTTP client
//
// Every API call funnels through `execute`: build the URL, attach the
// standard headers and session cookies, send, decode the body into the
// caller's envelope, then let status interpretation decide the outcome.
// Endpoint wrappers live with the caller; this module only owns the
// transport mechanics.

use std::collections::BTreeMap;

use reqwest::Method;
use reqwest::header::{ACCEPT, ACCEPT_CHARSET, CACHE_CONTROL, CONTENT_TYPE, COOKIE, USER_AGENT};
use serde::Serialize;
use tracing::{debug, trace};
use url::Url;

use crate::envelope::{self, Envelope};
use crate::error::Error;
use crate::status;
use crate::transport::TransportConfig;

/// Media type sent as both `Content-Type` and `Accept`.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// `User-Agent` sent on every request.
pub const USER_AGENT_VALUE: &str = concat!("unictl/", env!("CARGO_PKG_VERSION"));

// ── Request body ─────────────────────────────────────────────────────

/// A pre-encoded JSON request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body(Vec<u8>);

impl Body {
    /// Encode any serde value.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, Error> {
        serde_json::to_vec(value).map(Self).map_err(Error::Encode)
    }

    /// Encode an envelope, flattening its overflow back into the object.
    pub fn envelope<T: Envelope + ?Sized>(value: &T) -> Result<Self, Error> {
        Self::json(&envelope::to_value(value))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// HTTP client for one controller session.
///
/// The session (cookies captured at login) is plain owned state. Calls
/// that change it take `&mut self`; sharing a client between tasks means
/// wrapping it yourself. Separate clients never share anything.
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    /// `name=value` pairs captured from a successful login.
    pub(crate) cookies: Vec<String>,
    pub(crate) long_running: bool,
}

impl Client {
    /// Create a client for the controller at `base_url`.
    ///
    /// Fails on an unusable URL or invalid TLS material; no request is
    /// made.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let base_url = parse_base_url(base_url)?;
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            cookies: Vec::new(),
            long_running: false,
        }
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Point the client at a different controller. The session is kept.
    pub fn set_base_url(&mut self, base_url: &str) -> Result<(), Error> {
        self.base_url = parse_base_url(base_url)?;
        Ok(())
    }

    /// Whether a login has captured session cookies.
    pub fn has_session(&self) -> bool {
        !self.cookies.is_empty()
    }

    /// The `Cookie` header value sent with each request, if any.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            None
        } else {
            Some(self.cookies.join("; "))
        }
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join `path` onto the base URL's path and apply query pairs.
    ///
    /// `query` alternates keys and values. An odd-length list applies no
    /// query at all. A repeated key keeps its last value; keys are emitted
    /// in sorted order.
    pub fn url_for(&self, path: &str, query: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&join_paths(self.base_url.path(), path));
        url.set_fragment(None);
        url.set_query(None);

        if query.len() % 2 != 0 {
            trace!(len = query.len(), "odd query pair list; no query applied");
            return url;
        }

        let pairs: BTreeMap<&str, &str> = query
            .chunks_exact(2)
            .filter_map(|pair| match pair {
                [key, value] => Some((*key, *value)),
                _ => None,
            })
            .collect();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        url
    }

    // ── Pipeline ─────────────────────────────────────────────────────

    /// Run one API call, decoding the response into `dest`.
    ///
    /// With `dest` present the body is read, decoded through the envelope
    /// codec, and its status envelope (if any) interpreted. Without one
    /// the response body is ignored.
    pub async fn execute<D: Envelope + Send>(
        &self,
        method: Method,
        path: &str,
        body: Option<Body>,
        dest: Option<&mut D>,
        query: &[&str],
    ) -> Result<(), Error> {
        let url = self.url_for(path, query);
        let resp = self.send(method, url, body).await?;

        let Some(dest) = dest else {
            return Ok(());
        };

        let bytes = resp.bytes().await.map_err(Error::BodyRead)?;
        envelope::decode(&bytes, dest)?;
        status::interpret(&*dest)
    }

    /// Run one API call whose response body is not needed.
    pub async fn execute_without_response(
        &self,
        method: Method,
        path: &str,
        body: Option<Body>,
        query: &[&str],
    ) -> Result<(), Error> {
        let url = self.url_for(path, query);
        self.send(method, url, body).await.map(drop)
    }

    /// Run one API call scoped to a site: `/api/s/{site}/{path}`.
    ///
    /// The site name is checked before any network I/O.
    pub async fn execute_for_site<D: Envelope + Send>(
        &self,
        method: Method,
        site: &str,
        path: &str,
        body: Option<Body>,
        dest: Option<&mut D>,
        query: &[&str],
    ) -> Result<(), Error> {
        validate_site(site)?;
        let path = format!("/api/s/{site}/{path}");
        self.execute(method, &path, body, dest, query).await
    }

    /// Send a request with the standard headers and session cookies.
    pub(crate) async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Body>,
    ) -> Result<reqwest::Response, Error> {
        debug!("{} {}", method, url);

        let mut builder = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .header(ACCEPT, CONTENT_TYPE_JSON)
            .header(CACHE_CONTROL, "no-cache")
            .header(ACCEPT_CHARSET, "utf-8")
            .header(USER_AGENT, USER_AGENT_VALUE);
        if let Some(cookies) = self.cookie_header() {
            builder = builder.header(COOKIE, cookies);
        }
        if let Some(body) = body {
            builder = builder.body(body.0);
        }

        let resp = builder.send().await.map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            debug!(%status, "controller answered with a non-success HTTP status");
        }
        Ok(resp)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, Error> {
    let url = Url::parse(raw).map_err(|e| Error::InvalidUrl(format!("{raw}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidUrl(format!(
            "{raw}: unsupported scheme {:?}",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::InvalidUrl(format!("{raw}: missing host")));
    }
    Ok(url)
}

fn validate_site(site: &str) -> Result<(), Error> {
    if site.is_empty() {
        return Err(Error::Validation("site name must not be empty".into()));
    }
    if site.contains('/') {
        return Err(Error::Validation(format!(
            "site name must not contain '/': {site:?}"
        )));
    }
    Ok(())
}

/// Join two URL paths and normalize the result: repeated separators
/// collapse, `.` segments vanish, `..` removes its parent, and a
/// trailing slash is dropped.
fn join_paths(base: &str, extra: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(extra.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}
