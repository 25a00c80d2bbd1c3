pub mod login;
pub mod logout;
pub mod request;
pub mod users;
pub mod whoami;

mod protected;

// Internal "interpreter" for `Action`.
// We keep the match in a separate module so `mod.rs` stays small as more actions are added.
mod run;

use crate::config::ConsoleConfig;

/// Arguments of commands that only need the console configuration.
#[derive(Debug)]
pub struct SessionArgs {
    pub config: ConsoleConfig,
}

#[derive(Debug)]
pub enum Action {
    Login(login::Args),
    Logout(SessionArgs),
    Whoami(SessionArgs),
    Request(request::Args),
    UsersList(users::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
