use crate::console::Console;
use crate::session::{Admin, GuardOutcome, Permission, RecordingNavigator, RedirectReason};
use anyhow::{bail, Result};
use tracing::debug;

/// Runs the route guard in front of a protected command.
///
/// # Errors
/// Returns an error when the guard redirects instead of authorizing.
pub async fn require_admin(console: &Console, permission: Option<Permission>) -> Result<Admin> {
    let navigator = RecordingNavigator::new();
    let mut guard = console.guard(&navigator);
    if let Some(permission) = permission.clone() {
        guard = guard.require(permission);
    }

    match guard.resolve().await {
        GuardOutcome::Authorized(admin) => Ok(admin),
        GuardOutcome::Redirecting(redirect) => {
            debug!("guard redirected to {}", redirect.to);
            match redirect.reason {
                RedirectReason::Forbidden => match permission {
                    Some(permission) => bail!("Permission denied: {permission} is required"),
                    None => bail!("Permission denied"),
                },
                _ => bail!("Not signed in. Run `rupantar-admin login` first."),
            }
        }
        GuardOutcome::Loading => bail!("Session check did not complete"),
    }
}
