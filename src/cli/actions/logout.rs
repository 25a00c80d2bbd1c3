use crate::cli::actions::SessionArgs;
use crate::console::Console;
use anyhow::Result;

/// Execute the logout action. Signing out twice is not an error.
/// # Errors
/// Returns an error if the console cannot be started.
pub fn execute(args: &SessionArgs) -> Result<()> {
    let console = Console::start(args.config.clone())?;
    console.logout();
    println!("Signed out");
    Ok(())
}
