use thiserror::Error;

use crate::envelope::{CodecError, Value};
use crate::response_code::ResponseCode;

/// Controller message token returned when the session lacks a permission.
pub const MSG_NO_PERMISSION: &str = "api.err.NoPermission";

/// Controller message token returned when the session is missing or expired.
pub const MSG_LOGIN_REQUIRED: &str = "api.err.LoginRequired";

/// Top-level error type for the `unictl-api` crate.
///
/// Every public operation returns one of these; the variants follow the
/// life of a single call, from client construction through status
/// interpretation. `unictl` maps them into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Construction ────────────────────────────────────────────────
    /// The base URL could not be parsed or is not usable.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// TLS trust material could not be loaded.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Caller contract ─────────────────────────────────────────────
    /// An argument was rejected before any network I/O.
    #[error("Invalid argument: {0}")]
    Validation(String),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, TLS
    /// handshake, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response arrived but its body could not be fully read.
    #[error("invalid response body: {0}")]
    BodyRead(#[source] reqwest::Error),

    // ── Data ────────────────────────────────────────────────────────
    /// The response body is not a well-formed JSON object.
    #[error("unable to decode response: {0}")]
    Decode(#[from] CodecError),

    /// The request body could not be encoded.
    #[error("unable to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    // ── Status ──────────────────────────────────────────────────────
    /// The envelope reported a failure and the server explained why.
    /// The text of this error is exactly the server's message.
    #[error("{message}")]
    Status { code: ResponseCode, message: String },

    /// The envelope reported a failure without a message.
    #[error("non-ok status code: {code} - {payload}")]
    NonOkStatus { code: ResponseCode, payload: Value },

    // ── Authentication ──────────────────────────────────────────────
    /// Login was rejected by the controller.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Returns `true` if the controller answered with a non-ok status.
    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::NonOkStatus { .. })
    }

    /// The status code carried by a status error.
    pub fn response_code(&self) -> Option<&ResponseCode> {
        match self {
            Self::Status { code, .. } | Self::NonOkStatus { code, .. } => Some(code),
            _ => None,
        }
    }

    /// The server-supplied message, if the controller sent one.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Returns `true` if the controller reported a missing permission.
    pub fn is_no_permission(&self) -> bool {
        self.api_message() == Some(MSG_NO_PERMISSION)
    }

    /// Returns `true` if the controller wants a fresh login.
    pub fn is_login_required(&self) -> bool {
        self.api_message() == Some(MSG_LOGIN_REQUIRED)
            || matches!(self, Self::Authentication { .. })
    }
}
