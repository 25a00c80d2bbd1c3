use crate::cli::actions::{protected::require_admin, SessionArgs};
use crate::console::Console;
use anyhow::Result;

/// Execute the whoami action: prints the signed-in admin as JSON.
/// # Errors
/// Returns an error if nobody is signed in.
pub async fn execute(args: SessionArgs) -> Result<()> {
    let console = Console::start(args.config)?;
    let admin = require_admin(&console, None).await?;
    println!("{}", serde_json::to_string_pretty(&admin)?);
    Ok(())
}
