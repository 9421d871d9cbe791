//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use ordinal_config::ConfigError;
use ordinal_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to console at {url}")]
    #[diagnostic(
        code(ordinal::connection_failed),
        help(
            "Check that the console is running and reachable.\n\
             If it uses a self-signed certificate, retry with --insecure (-k)."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(ordinal::timeout),
        help("Increase the timeout with --timeout or check console responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(ordinal::auth_failed),
        help(
            "Verify the API key for this profile.\n\
             Store a new one with: ordinal config set-key"
        )
    )]
    AuthFailed { message: String },

    #[error("No API key configured for profile '{profile}'")]
    #[diagnostic(
        code(ordinal::no_credentials),
        help(
            "Store one with: ordinal config set-key {profile}\n\
             Or set the ORDINAL_API_KEY environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Collections ──────────────────────────────────────────────────
    #[error("Rule collection not found: {collection}")]
    #[diagnostic(
        code(ordinal::not_found),
        help("Check the chain, policy or list name (and --protocol / --family / --custom).")
    )]
    NotFound { collection: String },

    #[error("Rule {rule} is not in {collection}")]
    #[diagnostic(
        code(ordinal::unknown_rule),
        help("List the collection to see its rule numbers.")
    )]
    UnknownRule { rule: u32, collection: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Console rejected the change: {message}")]
    #[diagnostic(
        code(ordinal::rejected),
        help("Nothing was renumbered. Fix the reported problem and retry.")
    )]
    Rejected { message: String },

    #[error("API error ({code}): {message}")]
    #[diagnostic(code(ordinal::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ordinal::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(ordinal::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: ordinal config set-profile <NAME> --url <URL>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No console configured")]
    #[diagnostic(
        code(ordinal::no_config),
        help(
            "Pass --console and --api-key, or create a profile with:\n\
             ordinal config set-profile <NAME> --url <URL>\n\
             Config file: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(ordinal::config))]
    Config { message: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to a process exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::UnknownRule { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            CoreError::CollectionNotFound { collection } => CliError::NotFound { collection },
            CoreError::Rejected { message } => CliError::Rejected { message },
            CoreError::Api {
                message,
                code,
                status,
            } => CliError::ApiError {
                code: code
                    .or_else(|| status.map(|s| s.to_string()))
                    .unwrap_or_else(|| "unknown".into()),
                message,
            },
            CoreError::Config { message } => CliError::Config { message },
            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::ProfileNotFound { name, available } => {
                CliError::ProfileNotFound { name, available }
            }
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
