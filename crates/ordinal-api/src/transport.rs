// HTTP client construction: timeout, user agent, TLS trust.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::ClientBuilder;
use reqwest::header::HeaderMap;

use crate::error::Error;

/// How the appliance's certificate is checked.
///
/// Mirrors `ordinal_core::TlsVerification`; the CLI reaches all three
/// through `--insecure`, a profile's `ca_cert`, or neither.
#[derive(Debug, Clone)]
pub enum TlsMode {
    System,
    /// Trust the PEM bundle at this path in addition to the system roots.
    CustomCa(PathBuf),
    /// Appliances ship self-signed certificates out of the box.
    DangerAcceptInvalid,
}

impl TlsMode {
    fn apply(&self, builder: ClientBuilder) -> Result<ClientBuilder, Error> {
        Ok(match self {
            Self::System => builder,
            Self::CustomCa(path) => builder.add_root_certificate(read_ca(path)?),
            Self::DangerAcceptInvalid => builder.danger_accept_invalid_certs(true),
        })
    }
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::DangerAcceptInvalid,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build the `reqwest::Client` every console request goes through.
    ///
    /// `headers` are sent on each request; [`ConsoleClient`](crate::ConsoleClient)
    /// passes the `X-API-KEY` header here.
    pub fn build_client(&self, headers: HeaderMap) -> Result<reqwest::Client, Error> {
        let builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("ordinal/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);

        self.tls
            .apply(builder)?
            .build()
            .map_err(|e| Error::Tls(format!("cannot build HTTP client: {e}")))
    }
}

fn read_ca(path: &Path) -> Result<reqwest::Certificate, Error> {
    let pem = std::fs::read(path)
        .map_err(|e| Error::Tls(format!("cannot read CA bundle {}: {e}", path.display())))?;
    reqwest::Certificate::from_pem(&pem)
        .map_err(|e| Error::Tls(format!("{} is not a PEM certificate: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_ca_bundle_is_a_tls_error() {
        let config = TransportConfig {
            tls: TlsMode::CustomCa(PathBuf::from("/nonexistent/ordinal-ca.pem")),
            timeout: Duration::from_secs(5),
        };

        let err = config.build_client(HeaderMap::new()).unwrap_err();
        assert!(
            matches!(&err, Error::Tls(msg) if msg.contains("ordinal-ca.pem")),
            "unexpected error: {err:?}"
        );
    }
}
