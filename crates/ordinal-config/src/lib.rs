//! Configuration for the `ordinal` CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `ordinal_core::ConsoleConfig`. The CLI layers its own
//! flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ordinal_core::{ConsoleConfig, TlsVerification};

const KEYRING_SERVICE: &str = "ordinal";
const ENV_PREFIX: &str = "ORDINAL_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found (available: {available})")]
    ProfileNotFound { name: String, available: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level contents of `config.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Pick the profile name: explicit choice, then `default_profile`.
    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(ToOwned::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.into(),
                available: self.profile_names(),
            })
    }

    fn profile_names(&self) -> String {
        if self.profiles.is_empty() {
            return "none".into();
        }
        self.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Settings applied when a profile does not override them.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Background refresh period in seconds; 0 disables it.
    #[serde(default)]
    pub refresh_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            refresh_interval: 0,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named console profile.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Console base URL (e.g., "https://192.168.1.1").
    pub console: String,

    /// API key in plaintext. Prefer the keyring or `api_key_env`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable holding the API key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_interval: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "ordinal", "ordinal").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("ordinal");
    p
}

// ── Loading and saving ──────────────────────────────────────────────

/// Load the config from the canonical path plus `ORDINAL_*` environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path` plus `ORDINAL_*` environment.
///
/// Layers, last wins: built-in defaults, the TOML file (if present),
/// then variables such as `ORDINAL_DEFAULTS__TIMEOUT=10`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;
    Ok(config)
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Serialize `cfg` as TOML to `path`, creating parent directories.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(cfg)?)?;
    Ok(())
}

// ── Credentials ─────────────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/api-key"))
}

/// Resolve a profile's API key: `api_key_env`, then keyring, then plaintext.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a profile's API key in the system keyring.
pub fn store_api_key(profile_name: &str, key: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(key.expose_secret())?;
    Ok(())
}

// ── Translation to core config ──────────────────────────────────────

/// Build a `ConsoleConfig` from a profile, with `defaults` filling gaps.
pub fn profile_to_console_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ConsoleConfig, ConfigError> {
    let url = parse_console_url(&profile.console)?;
    let api_key = resolve_api_key(profile, profile_name)?;

    let mut config = ConsoleConfig::new(url, api_key);
    config.tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.refresh_interval_secs = profile.refresh_interval.unwrap_or(defaults.refresh_interval);
    Ok(config)
}

/// Parse a console URL, rejecting anything that is not http(s).
pub fn parse_console_url(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "console".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Validation {
            field: "console".into(),
            reason: format!("unsupported scheme '{other}' in {raw}"),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SAMPLE: &str = r#"
default_profile = "lab"

[defaults]
timeout = 12
refresh_interval = 5

[profiles.lab]
console = "https://10.0.0.1"
api_key = "plain-key"

[profiles.edge]
console = "https://edge.example.net:8443"
api_key = "edge-key"
insecure = true
timeout = 60
"#;

    fn write_sample(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        path
    }

    #[test]
    fn loads_profiles_and_defaults_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&write_sample(&dir)).unwrap();

        assert_eq!(cfg.default_profile.as_deref(), Some("lab"));
        assert_eq!(cfg.defaults.timeout, 12);
        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(cfg.profiles.len(), 2);
        assert_eq!(cfg.profiles["edge"].timeout, Some(60));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_preserves_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "home".into(),
            Profile {
                console: "https://192.168.1.1".into(),
                api_key_env: Some("HOME_CONSOLE_KEY".into()),
                ..Profile::default()
            },
        );

        save_config_to(&cfg, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.profiles, cfg.profiles);
    }

    #[test]
    fn active_profile_prefers_explicit_name() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&write_sample(&dir)).unwrap();

        assert_eq!(cfg.active_profile_name(None), "lab");
        assert_eq!(cfg.active_profile_name(Some("edge")), "edge");
    }

    #[test]
    fn unknown_profile_lists_available() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&write_sample(&dir)).unwrap();

        let err = cfg.profile("nope").unwrap_err();
        assert!(
            matches!(err, ConfigError::ProfileNotFound { ref available, .. } if available == "edge, lab")
        );
    }

    #[test]
    fn profile_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&write_sample(&dir)).unwrap();

        let edge =
            profile_to_console_config(cfg.profile("edge").unwrap(), "edge-test", &cfg.defaults)
                .unwrap();
        assert_eq!(edge.timeout, Duration::from_secs(60));
        assert_eq!(edge.refresh_interval_secs, 5);
        assert_eq!(edge.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(edge.url.port(), Some(8443));

        let lab = profile_to_console_config(cfg.profile("lab").unwrap(), "lab-test", &cfg.defaults)
            .unwrap();
        assert_eq!(lab.timeout, Duration::from_secs(12));
        assert_eq!(lab.tls, TlsVerification::SystemDefaults);
    }

    #[test]
    fn plaintext_key_used_when_env_var_unset() {
        let profile = Profile {
            console: "https://10.0.0.1".into(),
            api_key: Some("fallback".into()),
            api_key_env: Some("ORDINAL_TEST_KEY_THAT_IS_NEVER_SET".into()),
            ..Profile::default()
        };

        let key = resolve_api_key(&profile, "ordinal-test-plaintext").unwrap();
        assert_eq!(key.expose_secret(), "fallback");
    }

    #[test]
    fn missing_key_is_reported() {
        let profile = Profile {
            console: "https://10.0.0.1".into(),
            ..Profile::default()
        };

        let err = resolve_api_key(&profile, "ordinal-test-no-key").unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { .. }));
    }

    #[test]
    fn rejects_non_http_console_url() {
        assert!(parse_console_url("https://10.0.0.1").is_ok());
        assert!(matches!(
            parse_console_url("ftp://10.0.0.1"),
            Err(ConfigError::Validation { .. })
        ));
        assert!(matches!(
            parse_console_url("not a url"),
            Err(ConfigError::Validation { .. })
        ));
    }
}
