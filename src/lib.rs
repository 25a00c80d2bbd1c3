//! # Rupantar Admin (session core and console)
//!
//! `rupantar-admin` is the operator console for the Rupantar AI platform. The
//! backend owns every business rule; this crate owns the part that lives on the
//! operator's side of the wire: who is signed in, whether that proof can still
//! be trusted, and how authenticated requests reach the admin API.
//!
//! ## Session lifecycle
//!
//! 1. **Start:** a [`console::Console`] is built with its storage, session store,
//!    auth backend and API client. Nothing is global.
//! 2. **Hydration:** [`session::hydration::hydrate`] runs once, loads the persisted
//!    session blob, and discards it when it is malformed or incomplete.
//! 3. **Guard:** every protected entry point runs a
//!    [`session::guard::RouteGuard`], which re-validates the session and either
//!    authorizes, redirects to `/login`, or reports that it is still loading.
//! 4. **Requests:** [`api::ApiClient`] reads the bearer token from durable
//!    storage on every call and maps failures to timeout, network or API errors.
//!
//! Client-side validation only checks that the session is well formed. The
//! backend must still verify every bearer token it receives.

pub mod api;
pub mod cli;
pub mod config;
pub mod console;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            return;
        }
        assert!(GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_user_agent_names_the_crate() {
        assert!(APP_USER_AGENT.starts_with("rupantar-admin/"));
    }
}
