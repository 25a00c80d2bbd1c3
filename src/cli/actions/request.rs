use crate::cli::actions::protected::require_admin;
use crate::config::ConsoleConfig;
use crate::console::Console;
use anyhow::Result;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub config: ConsoleConfig,
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// Execute a raw admin API request and print the JSON answer.
/// # Errors
/// Returns an error if nobody is signed in or the request fails.
pub async fn execute(args: Args) -> Result<()> {
    let console = Console::start(args.config)?;
    let admin = require_admin(&console, None).await?;
    debug!("{} {} as {}", args.method, args.path, admin.id);

    let value: Value = console
        .api()
        .request(args.method, &args.path, args.body.as_ref())
        .await?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
