use crate::config::ConsoleConfig;
use crate::console::Console;
use crate::session::{redirect_if_signed_in, Credentials, RecordingNavigator};
use anyhow::Result;
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub config: ConsoleConfig,
    pub email: String,
    pub password: SecretString,
    pub force: bool,
}

/// Execute the login action.
/// # Errors
/// Returns an error if the backend rejects the credentials, cannot be reached,
/// or the session cannot be saved.
pub async fn execute(args: Args) -> Result<()> {
    let console = Console::start(args.config)?;

    if !args.force {
        let navigator = RecordingNavigator::new();
        if redirect_if_signed_in(console.store(), &navigator).is_some() {
            let email = console.store().admin().map(|admin| admin.email).unwrap_or_default();
            println!("Already signed in as {email}. Use --force to sign in again.");
            return Ok(());
        }
    }

    let credentials = Credentials::new(args.email.trim(), args.password.expose_secret());
    let admin = console.login(&credentials).await?;

    info!("session saved under {}", console.config().state_dir.display());
    match admin.role {
        Some(role) => println!("Signed in as {} ({role})", admin.email),
        None => println!("Signed in as {}", admin.email),
    }
    Ok(())
}
