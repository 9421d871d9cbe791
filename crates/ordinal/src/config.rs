//! CLI configuration: thin wrapper around `ordinal_config`.
//!
//! Adds resolution that respects `GlobalOpts` overrides (--console,
//! --api-key, --insecure, --timeout) on top of profile values.

use std::time::Duration;

use secrecy::SecretString;

use ordinal_core::{ConsoleConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use ordinal_config::{Config, Profile, config_path, load_config_or_default, save_config};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Build the `ConsoleConfig` for this invocation.
///
/// With a matching profile, flags override its values. Without one, the
/// console URL and API key must both come from flags or environment.
pub fn build_console_config(global: &GlobalOpts) -> Result<ConsoleConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, &cfg, global);
    }

    // An explicitly requested profile must exist.
    if global.profile.is_some() {
        cfg.profile(&profile_name)?;
    }

    let url_str = global.console.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let url = ordinal_config::parse_console_url(url_str)?;

    let api_key = global
        .api_key
        .clone()
        .map(SecretString::from)
        .ok_or(CliError::NoCredentials {
            profile: profile_name,
        })?;

    let mut config = ConsoleConfig::new(url, api_key);
    config.tls = if global.insecure || cfg.defaults.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    };
    config.timeout = Duration::from_secs(global.timeout.unwrap_or(cfg.defaults.timeout));
    Ok(config)
}

/// Translate a `Profile` plus global flags into a `ConsoleConfig`.
fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<ConsoleConfig, CliError> {
    let mut profile = profile.clone();
    if let Some(ref console) = global.console {
        profile.console.clone_from(console);
    }
    if global.api_key.is_some() {
        profile.api_key.clone_from(&global.api_key);
        profile.api_key_env = None;
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if global.timeout.is_some() {
        profile.timeout = global.timeout;
    }

    let mut config =
        ordinal_config::profile_to_console_config(&profile, profile_name, &cfg.defaults)?;

    // A key given on the command line must win over the keyring.
    if let Some(ref key) = global.api_key {
        config.api_key = SecretString::from(key.clone());
    }
    Ok(config)
}
