use thiserror::Error;

/// Top-level error type for the `ordinal-api` crate.
///
/// Covers every failure mode of the appliance API surface:
/// authentication, transport, HTTP status errors, envelope rejections
/// and payload decoding. `ordinal-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Invalid API key (rejected by the appliance with HTTP 401).
    #[error("Invalid API key")]
    InvalidApiKey,

    /// The API key could not be turned into a header value.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Appliance API ───────────────────────────────────────────────
    /// Non-success HTTP status from the appliance.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        message: String,
        code: Option<String>,
        status: u16,
    },

    /// The appliance answered 2xx but the envelope carried `success: false`.
    #[error("Request rejected by appliance: {message}")]
    Rejected { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}
