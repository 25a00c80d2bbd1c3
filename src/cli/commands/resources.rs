use clap::{builder::PossibleValuesParser, Arg, Command};

pub const CMD_REQUEST: &str = "request";
pub const CMD_USERS: &str = "users";
pub const CMD_LIST: &str = "list";

pub const ARG_METHOD: &str = "method";
pub const ARG_PATH: &str = "path";
pub const ARG_DATA: &str = "data";

/// `users list` filters as (flag, query parameter, help).
pub const USER_FILTERS: [(&str, &str, &str); 4] = [
    ("search", "search", "Search by name or email"),
    ("status", "status", "Filter by account status"),
    ("role", "role", "Filter by role"),
    ("sort-by", "sortBy", "Sort by field"),
];

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    let list = USER_FILTERS.iter().fold(
        Command::new(CMD_LIST).about("List platform users"),
        |list, (arg, _, help)| list.arg(Arg::new(*arg).long(*arg).help(*help)),
    );

    command
        .subcommand(
            Command::new(CMD_REQUEST)
                .about("Send an authenticated request to the admin API")
                .arg(
                    Arg::new(ARG_METHOD)
                        .help("HTTP method")
                        .required(true)
                        .ignore_case(true)
                        .value_parser(PossibleValuesParser::new(["GET", "POST", "PUT", "DELETE"])),
                )
                .arg(
                    Arg::new(ARG_PATH)
                        .help("Path below /admin, example: /users?status=active")
                        .required(true),
                )
                .arg(
                    Arg::new(ARG_DATA)
                        .short('d')
                        .long("data")
                        .help("JSON request body"),
                ),
        )
        .subcommand(
            Command::new(CMD_USERS)
                .about("Platform user administration")
                .subcommand_required(true)
                .subcommand(list),
        )
}
