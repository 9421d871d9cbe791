//! Config subcommand handlers.

use std::io::BufRead;

use secrecy::SecretString;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Profile};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "<redacted>";

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        ConfigCommand::Show => {
            let mut cfg = config::load_config_or_default();
            for profile in cfg.profiles.values_mut() {
                if profile.api_key.is_some() {
                    profile.api_key = Some(REDACTED.into());
                }
            }
            output::print_output(&output::render_document(&global.output, &cfg), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::SetProfile {
            name,
            url,
            api_key_env,
            insecure,
            default,
        } => {
            ordinal_config::parse_console_url(&url)?;

            let mut cfg = config::load_config_or_default();
            let profile = cfg.profiles.entry(name.clone()).or_insert_with(Profile::default);
            profile.console = url;
            if api_key_env.is_some() {
                profile.api_key_env = api_key_env;
            }
            if insecure {
                profile.insecure = Some(true);
            }
            if default || cfg.profiles.len() == 1 {
                cfg.default_profile = Some(name.clone());
            }
            config::save_config(&cfg)?;

            output::print_status(
                &format!(
                    "profile '{name}' saved to {}",
                    config::config_path().display()
                ),
                color,
                global.quiet,
            );
            Ok(())
        }

        ConfigCommand::SetKey { name } => {
            let cfg = config::load_config_or_default();
            let name = name.unwrap_or_else(|| config::active_profile_name(global, &cfg));

            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            let key = line.trim();
            if key.is_empty() {
                return Err(CliError::Validation {
                    field: "api_key".into(),
                    reason: "expected the API key on stdin".into(),
                });
            }

            ordinal_config::store_api_key(&name, &SecretString::from(key.to_owned()))?;
            output::print_status(
                &format!("API key for profile '{name}' stored in the system keyring"),
                color,
                global.quiet,
            );
            Ok(())
        }
    }
}
