// ── Runtime connection configuration ──
//
// These types describe *how* to reach the appliance API. They carry
// credential data and connection tuning, but never touch disk.
// The CLI constructs a `ConsoleConfig` and hands it in.

use secrecy::SecretString;
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs). Default for appliances.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for talking to a single appliance.
///
/// Built by the CLI, passed to [`Console`](crate::Console); core never
/// reads config files.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Appliance URL (e.g., `https://192.168.1.1`).
    pub url: Url,
    /// API key sent as `X-API-KEY`.
    pub api_key: SecretString,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: std::time::Duration,
    /// How often to refetch loaded, clean collections (seconds). 0 = never.
    pub refresh_interval_secs: u64,
}

impl ConsoleConfig {
    /// Config with default tuning for the given URL and key.
    pub fn new(url: Url, api_key: SecretString) -> Self {
        Self {
            url,
            api_key,
            tls: TlsVerification::default(),
            timeout: std::time::Duration::from_secs(30),
            refresh_interval_secs: 0,
        }
    }
}
