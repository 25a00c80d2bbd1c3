use crate::cli::actions::protected::require_admin;
use crate::config::ConsoleConfig;
use crate::console::Console;
use crate::session::{Permission, Resource};
use anyhow::Result;

#[derive(Debug)]
pub struct Args {
    pub config: ConsoleConfig,
    /// Query parameters, already renamed to the API's names.
    pub filters: Vec<(String, String)>,
}

/// Execute the users list action.
/// # Errors
/// Returns an error if the admin may not view users or the request fails.
pub async fn execute(args: Args) -> Result<()> {
    let console = Console::start(args.config)?;
    require_admin(&console, Some(Permission::new(Resource::Users, "view"))).await?;

    let filters: Vec<(&str, &str)> = args
        .filters
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    let users = console.api().users().list(&filters).await?;
    println!("{}", serde_json::to_string_pretty(&users)?);
    Ok(())
}
