use crate::cli::actions::{login, request, users, Action, SessionArgs};
use crate::cli::commands::{console, resources, session};
use crate::config::ConsoleConfig;
use anyhow::{bail, Context, Result};
use reqwest::Method;
use secrecy::SecretString;
use std::time::Duration;

/// # Errors
/// Returns an error if required arguments are missing or malformed.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let config = console_config(matches)?;

    match matches.subcommand() {
        Some((session::CMD_LOGIN, sub_m)) => {
            let email = sub_m
                .get_one::<String>(session::ARG_EMAIL)
                .cloned()
                .context("missing required argument: --email")?;
            let password = sub_m
                .get_one::<String>(session::ARG_PASSWORD)
                .cloned()
                .context("missing required argument: --password")?;

            Ok(Action::Login(login::Args {
                config,
                email,
                password: SecretString::from(password),
                force: sub_m.get_flag(session::ARG_FORCE),
            }))
        }
        Some((session::CMD_LOGOUT, _)) => Ok(Action::Logout(SessionArgs { config })),
        Some((session::CMD_WHOAMI, _)) => Ok(Action::Whoami(SessionArgs { config })),
        Some((resources::CMD_REQUEST, sub_m)) => {
            let method = sub_m
                .get_one::<String>(resources::ARG_METHOD)
                .context("missing required argument: <METHOD>")?
                .to_uppercase()
                .parse::<Method>()
                .context("invalid HTTP method")?;
            let path = sub_m
                .get_one::<String>(resources::ARG_PATH)
                .cloned()
                .context("missing required argument: <PATH>")?;
            let body = sub_m
                .get_one::<String>(resources::ARG_DATA)
                .map(|data| serde_json::from_str::<serde_json::Value>(data))
                .transpose()
                .context("--data is not valid JSON")?;

            Ok(Action::Request(request::Args {
                config,
                method,
                path,
                body,
            }))
        }
        Some((resources::CMD_USERS, sub_m)) => match sub_m.subcommand() {
            Some((resources::CMD_LIST, list_m)) => {
                let filters = resources::USER_FILTERS
                    .iter()
                    .filter_map(|(arg, param, _)| {
                        list_m
                            .get_one::<String>(arg)
                            .map(|value| ((*param).to_string(), value.clone()))
                    })
                    .collect();
                Ok(Action::UsersList(users::Args { config, filters }))
            }
            _ => bail!("missing users subcommand"),
        },
        _ => bail!("missing subcommand"),
    }
}

/// Builds the console configuration from the global arguments.
///
/// # Errors
/// Returns an error if the timeout is missing.
pub fn console_config(matches: &clap::ArgMatches) -> Result<ConsoleConfig> {
    let mut config = ConsoleConfig::default();

    if let Some(url) = matches.get_one::<String>(console::ARG_API_URL) {
        config = config.with_api_base_url(url);
    }
    if let Some(urls) = matches.get_many::<String>(console::ARG_FALLBACK_URL) {
        config = config.with_fallback_urls(urls);
    }
    if let Some(dir) = matches.get_one::<String>(console::ARG_STATE_DIR) {
        if !dir.trim().is_empty() {
            config = config.with_state_dir(dir.trim());
        }
    }
    let timeout = matches
        .get_one::<u64>(console::ARG_TIMEOUT)
        .copied()
        .context("missing required argument: --timeout")?;

    Ok(config.with_timeout(Duration::from_secs(timeout)))
}
