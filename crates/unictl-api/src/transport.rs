// Transport configuration for building reqwest::Client instances.
//
// Every `Client` owns its own `reqwest::Client`, built once from this
// config. Nothing here is shared between instances.

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::error::Error;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// TLS verification mode. The options are mutually exclusive and resolved
/// once, when the HTTP client is built.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the platform certificate store.
    #[default]
    System,
    /// Trust only the certificates in the given PEM file.
    CustomCa(PathBuf),
    /// Trust only this set of DER-encoded certificates.
    Certificates(Vec<Vec<u8>>),
    /// Accept any certificate (for self-signed controllers).
    DangerAcceptInvalid,
}

/// Transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Applied uniformly to every request; there is no per-call override.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TransportConfig {
    pub fn new(tls: TlsMode, timeout: Duration) -> Self {
        Self { tls, timeout }
    }

    /// Build a `reqwest::Client` from this config.
    ///
    /// Invalid or unreadable trust material fails here, before any
    /// request is made.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let pem = std::fs::read(path).map_err(|e| {
                    Error::Tls(format!("failed to read CA cert {}: {e}", path.display()))
                })?;
                let certs = reqwest::Certificate::from_pem_bundle(&pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert {}: {e}", path.display())))?;
                if certs.is_empty() {
                    return Err(Error::Tls(format!(
                        "no certificates found in {}",
                        path.display()
                    )));
                }
                debug!(count = certs.len(), path = %path.display(), "trusting custom CA bundle");
                builder = builder.tls_built_in_root_certs(false);
                for cert in certs {
                    builder = builder.add_root_certificate(cert);
                }
            }
            TlsMode::Certificates(ders) => {
                if ders.is_empty() {
                    return Err(Error::Tls("empty certificate set".into()));
                }
                debug!(count = ders.len(), "trusting explicit certificate set");
                builder = builder.tls_built_in_root_certs(false);
                for der in ders {
                    let cert = reqwest::Certificate::from_der(der)
                        .map_err(|e| Error::Tls(format!("invalid certificate: {e}")))?;
                    builder = builder.add_root_certificate(cert);
                }
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}
