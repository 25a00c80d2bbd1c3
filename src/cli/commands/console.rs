use crate::config::DEFAULT_API_BASE_URL;
use clap::{Arg, ArgAction, Command};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_FALLBACK_URL: &str = "fallback-url";
pub const ARG_STATE_DIR: &str = "state-dir";
pub const ARG_TIMEOUT: &str = "timeout";

/// Connection and storage options shared by every subcommand.
#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long("api-url")
                .help("Admin API base URL, example: https://api.rupantar.ai/api")
                .env("RUPANTAR_API_URL")
                .default_value(DEFAULT_API_BASE_URL)
                .global(true),
        )
        .arg(
            Arg::new(ARG_FALLBACK_URL)
                .long("fallback-url")
                .help("Base URL tried at login when the previous ones are unreachable (repeatable)")
                .long_help(
                    "Base URLs tried in order at login when the API URL cannot be reached. Defaults to http://localhost:4000/api and http://127.0.0.1:4000/api.",
                )
                .env("RUPANTAR_FALLBACK_URLS")
                .value_delimiter(',')
                .action(ArgAction::Append)
                .global(true),
        )
        .arg(
            Arg::new(ARG_STATE_DIR)
                .long("state-dir")
                .help("Directory holding the persisted session (default: $XDG_STATE_HOME/rupantar-admin)")
                .env("RUPANTAR_STATE_DIR")
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long("timeout")
                .help("Request timeout in seconds")
                .env("RUPANTAR_TIMEOUT")
                .default_value("60")
                .value_parser(clap::value_parser!(u64).range(1..))
                .global(true),
        )
}
