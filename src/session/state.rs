//! In-memory session state and its persisted JSON form.
//!
//! The persisted record is `{"state":{"admin":…,"token":…,"isAuthenticated":…},"version":0}`.
//! Older releases wrote the inner object without the `state` wrapper, so both
//! shapes are accepted when reading. `has_hydrated` is never persisted.

use crate::session::types::Admin;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fixed storage key of the persisted session.
pub const STORAGE_KEY: &str = "rupantar-admin-auth";

/// Version written alongside the persisted state.
pub const PERSIST_VERSION: u32 = 0;

/// Who is signed in, as seen by this client.
#[derive(Clone, Debug, Default)]
pub struct Session {
    pub admin: Option<Admin>,
    pub token: Option<SecretString>,
    pub is_authenticated: bool,
}

impl Session {
    /// Builds an authenticated session. The result still goes through
    /// [`Session::is_valid`] before anyone trusts it.
    #[must_use]
    pub fn authenticated(admin: Admin, token: SecretString) -> Self {
        Self {
            admin: Some(admin),
            token: Some(token),
            is_authenticated: true,
        }
    }

    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.admin.is_none() && self.token.is_none() && !self.is_authenticated
    }

    /// `is_authenticated` holds and is backed by an identified admin and a
    /// non-blank token.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_authenticated
            && self.admin.as_ref().is_some_and(Admin::is_identified)
            && self.has_token()
    }

    /// A session claiming to be authenticated without the data to back it.
    #[must_use]
    pub fn is_corrupt(&self) -> bool {
        !self.is_valid() && !self.is_cleared()
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(|token| !token.expose_secret().trim().is_empty())
    }

    /// Returns the state that may be trusted: itself if valid, cleared otherwise.
    #[must_use]
    pub fn healed(self) -> Self {
        if self.is_valid() {
            self
        } else {
            Self::default()
        }
    }

    /// Encodes the session in the persisted, wrapped form.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_persisted(&self) -> serde_json::Result<String> {
        let envelope = PersistedEnvelope {
            state: PersistedSessionRef {
                admin: self.admin.as_ref(),
                token: self.token.as_ref().map(ExposeSecret::expose_secret),
                is_authenticated: self.is_authenticated,
            },
            version: PERSIST_VERSION,
        };
        serde_json::to_string(&envelope)
    }

    /// Decodes either the wrapped or the unwrapped persisted form. No validity
    /// check is applied here; callers decide what to do with corrupt state.
    ///
    /// # Errors
    /// Returns an error if the blob is not JSON or does not match either form.
    pub fn from_persisted(blob: &str) -> serde_json::Result<Self> {
        let mut value: Value = serde_json::from_str(blob)?;
        if !value.is_object() {
            return Err(serde::de::Error::custom("persisted session is not an object"));
        }
        let wrapped = value
            .as_object_mut()
            .and_then(|object| object.remove("state"));
        let inner = wrapped.unwrap_or(value);
        let state: PersistedSession = serde_json::from_value(inner)?;
        Ok(Self {
            admin: state.admin,
            token: state.token.map(SecretString::from),
            is_authenticated: state.is_authenticated,
        })
    }
}

#[derive(Serialize)]
struct PersistedEnvelope<'a> {
    state: PersistedSessionRef<'a>,
    version: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSessionRef<'a> {
    admin: Option<&'a Admin>,
    token: Option<&'a str>,
    is_authenticated: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSession {
    #[serde(default)]
    admin: Option<Admin>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    is_authenticated: bool,
}
