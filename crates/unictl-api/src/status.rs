// Status interpretation
//
// After a response is decoded the pipeline asks whether it carries a
// status envelope: either the destination itself reports one, or its
// declared `meta` field does. Any code other than ok, including a blank
// one left by a body without `meta`, turns the call into an error.

use crate::envelope::{self, Envelope};
use crate::error::Error;
use crate::response_code::ResponseCode;

/// Wire tag of the conventional status field.
pub const STATUS_FIELD: &str = "meta";

/// A decoded value that can report a [`ResponseCode`] and, optionally, a
/// human-readable message.
pub trait StatusCarrier {
    /// The reported code, or `None` when the server sent none.
    fn response_code(&self) -> Option<&ResponseCode>;

    fn response_message(&self) -> Option<&str> {
        None
    }
}

/// Find the status carrier of a decoded destination, if it has one.
pub fn locate(dest: &dyn Envelope) -> Option<&dyn StatusCarrier> {
    if let Some(carrier) = dest.status() {
        return Some(carrier);
    }
    dest.fields()
        .into_iter()
        .find(|(tag, _)| *tag == STATUS_FIELD)
        .and_then(|(_, slot)| slot.as_status())
}

/// Turn a decoded destination's status into a call result.
///
/// Destinations without a status envelope always pass.
pub fn interpret(dest: &dyn Envelope) -> Result<(), Error> {
    let Some(carrier) = locate(dest) else {
        return Ok(());
    };
    let Some(code) = carrier.response_code() else {
        return Ok(());
    };
    if code.is_ok() {
        return Ok(());
    }

    match carrier.response_message().filter(|msg| !msg.is_empty()) {
        Some(message) => Err(Error::Status {
            code: code.clone(),
            message: message.to_owned(),
        }),
        None => Err(Error::NonOkStatus {
            code: code.clone(),
            payload: envelope::to_value(dest),
        }),
    }
}
