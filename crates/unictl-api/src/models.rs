// Common response envelopes
//
// Most controller endpoints wrap their payload the same way:
// `{ "meta": { "rc": "ok", "msg": "optional" }, "data": ... }`.
// Callers with a richer payload declare their own envelope; these two
// cover login/logout and raw requests.

use crate::envelope::{Overflow, Value};
use crate::impl_envelope;
use crate::response_code::ResponseCode;
use crate::status::StatusCarrier;

// ── Meta ─────────────────────────────────────────────────────────────

/// The `meta` status envelope. `rc` == `"ok"` means success; anything
/// else, including a blank or missing `rc`, is a failure.
///
/// Controllers add other keys here over time (`count`, `server_version`,
/// `up`, `uuid`); they are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommonMeta {
    pub rc: ResponseCode,
    pub msg: Option<String>,
    pub extra: Overflow,
}

impl_envelope!(status CommonMeta { rc, msg } overflow extra);

impl StatusCarrier for CommonMeta {
    fn response_code(&self) -> Option<&ResponseCode> {
        Some(&self.rc)
    }

    fn response_message(&self) -> Option<&str> {
        self.msg.as_deref()
    }
}

// ── Response ─────────────────────────────────────────────────────────

/// Generic response envelope. `data` is usually an array but is kept as
/// whatever the controller sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiResponse {
    pub meta: CommonMeta,
    pub data: Value,
    pub extra: Overflow,
}

impl_envelope!(ApiResponse { meta, data } overflow extra);
