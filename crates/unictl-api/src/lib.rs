// unictl-api: Async Rust client for the UniFi controller management API
//
// Responses are decoded through a declared/overflow envelope codec so that
// fields this crate does not know about survive a decode and re-encode.

pub mod auth;
pub mod client;
pub mod envelope;
pub mod error;
pub mod models;
pub mod response_code;
pub mod status;
pub mod transport;

pub use client::{Body, Client};
pub use envelope::{Envelope, Overflow, Slot, Value};
pub use error::Error;
pub use models::{ApiResponse, CommonMeta};
pub use response_code::ResponseCode;
pub use status::StatusCarrier;
pub use transport::{TlsMode, TransportConfig};

pub use reqwest::Method;
