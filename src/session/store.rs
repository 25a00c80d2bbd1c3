//! Single source of truth for "who is signed in".
//!
//! Every mutation ends with an explicit save: a valid session is written to
//! durable storage, a cleared one erases it. Nothing is persisted implicitly.
//! The in-memory session sits behind a mutex that is never held across an
//! await, and the hydration flag is published on a watch channel so guards can
//! wait for it without polling.

use crate::session::{
    backend::{AuthBackend, Credentials},
    error::AuthError,
    state::{Session, STORAGE_KEY},
    storage::{SessionStorage, StorageError},
    types::Admin,
};
use secrecy::{ExposeSecret, SecretString};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    session: Mutex<Session>,
    hydrated: watch::Sender<bool>,
}

impl SessionStore {
    /// Creates an empty, not yet hydrated store over `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let (hydrated, _) = watch::channel(false);
        Self {
            storage,
            session: Mutex::new(Session::default()),
            hydrated,
        }
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<dyn SessionStorage> {
        &self.storage
    }

    /// Current values exactly as held, corrupt or not.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    /// Current session after the validity check. A corrupt session is cleared
    /// in memory and in durable storage before this returns.
    #[must_use]
    pub fn current(&self) -> Session {
        let mut session = self.lock();
        if session.is_corrupt() {
            warn!("corrupt session detected on read, clearing");
            *session = Session::default();
            drop(session);
            self.erase();
            return Session::default();
        }
        session.clone()
    }

    #[must_use]
    pub fn admin(&self) -> Option<Admin> {
        self.current().admin
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current().is_valid()
    }

    #[must_use]
    pub fn has_hydrated(&self) -> bool {
        *self.hydrated.borrow()
    }

    /// Receiver that observes `has_hydrated` flipping to `true`.
    #[must_use]
    pub fn hydration_signal(&self) -> watch::Receiver<bool> {
        self.hydrated.subscribe()
    }

    /// Signs in through `backend`. The session is saved before the in-memory
    /// state changes, so a failed login or a failed save leaves the store as
    /// it was.
    ///
    /// # Errors
    /// Returns an error if the backend rejects the credentials, is unreachable,
    /// answers without an admin and token, or the session cannot be saved.
    #[instrument(skip(self, backend, credentials), fields(email = %credentials.email))]
    pub async fn login<B: AuthBackend>(
        &self,
        backend: &B,
        credentials: &Credentials,
    ) -> Result<Admin, AuthError> {
        let response = backend.login(credentials).await?;

        let (admin, token) = match (response.admin, response.token) {
            (Some(admin), Some(token)) if admin.is_identified() && !token.trim().is_empty() => {
                (admin, token)
            }
            _ => {
                warn!("login response is missing admin or token");
                return Err(AuthError::InvalidResponse);
            }
        };

        let session = Session::authenticated(admin.clone(), SecretString::from(token));
        self.save(&session)?;
        *self.lock() = session;

        info!("admin {} signed in", admin.id);
        Ok(admin)
    }

    /// Clears the session in memory and erases the durable copy. Calling it on
    /// an already cleared store changes nothing.
    pub fn logout(&self) {
        *self.lock() = Session::default();
        self.erase();
        info!("signed out");
    }

    /// Validates the current state, clears it if corrupt, and flips
    /// `has_hydrated`. Waiters on [`SessionStore::hydration_signal`] wake up.
    pub fn mark_hydrated(&self) {
        let authenticated = {
            let mut session = self.lock();
            let valid = session.is_valid();
            if !valid {
                *session = Session::default();
            }
            valid
        };
        if !authenticated {
            self.erase();
        }
        self.hydrated.send_replace(true);
        debug!("session store hydrated (authenticated: {})", authenticated);
    }

    /// Applies an explicit change to the signed-in admin record and saves it.
    /// Returns `None` when nobody is signed in. An update that leaves the
    /// record without id or email clears the session instead.
    ///
    /// # Errors
    /// Returns an error if the updated session cannot be saved.
    pub fn update_admin<F>(&self, update: F) -> Result<Option<Admin>, StorageError>
    where
        F: FnOnce(&mut Admin),
    {
        let current = self.current();
        let (Some(mut admin), Some(token)) = (current.admin, current.token) else {
            return Ok(None);
        };

        update(&mut admin);
        let updated = Session::authenticated(admin, token);
        if !updated.is_valid() {
            warn!("admin update produced an invalid session, clearing");
            self.logout();
            return Ok(None);
        }

        self.save(&updated)?;
        let admin = updated.admin.clone();
        *self.lock() = updated;
        Ok(admin)
    }

    /// Bearer token of the current valid session.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        let session = self.current();
        if session.is_valid() {
            session.token
        } else {
            None
        }
    }

    /// Replaces in-memory state with a session read from durable storage.
    /// Nothing is written back; the caller decides whether the copy survives.
    pub(crate) fn restore(&self, session: Session) {
        *self.lock() = session;
    }

    /// Erases the durable copy. Failures are logged, never raised.
    pub(crate) fn erase(&self) {
        if let Err(err) = self.storage.remove(STORAGE_KEY) {
            warn!("failed to erase persisted session: {}", err);
        }
    }

    fn save(&self, session: &Session) -> Result<(), StorageError> {
        if session.is_valid() {
            let blob = session.to_persisted()?;
            self.storage.set(STORAGE_KEY, &blob)
        } else {
            self.storage.remove(STORAGE_KEY)
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.lock();
        f.debug_struct("SessionStore")
            .field("admin", &session.admin.as_ref().map(|admin| &admin.id))
            .field(
                "token",
                &session
                    .token
                    .as_ref()
                    .map(|token| token.expose_secret().len()),
            )
            .field("is_authenticated", &session.is_authenticated)
            .field("has_hydrated", &self.has_hydrated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::backend::LoginResponse;
    use crate::session::storage::MemoryStorage;
    use anyhow::{anyhow, Result};
    use serde_json::json;

    /// Answers every login with a canned result.
    struct FakeBackend {
        reply: fn() -> Result<LoginResponse, AuthError>,
    }

    impl AuthBackend for FakeBackend {
        async fn login(&self, _credentials: &Credentials) -> Result<LoginResponse, AuthError> {
            (self.reply)()
        }
    }

    fn admin_json() -> serde_json::Value {
        json!({ "id": "1", "email": "owner@x.com", "name": "Owner", "role": "owner" })
    }

    fn accepting() -> FakeBackend {
        FakeBackend {
            reply: || {
                Ok(LoginResponse {
                    admin: serde_json::from_value(admin_json()).ok(),
                    token: Some("tok-1".to_string()),
                })
            },
        }
    }

    fn store() -> (Arc<MemoryStorage>, SessionStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(storage.clone());
        (storage, store)
    }

    #[tokio::test]
    async fn login_sets_session_and_persists_it() -> Result<()> {
        let (storage, store) = store();

        let admin = store
            .login(&accepting(), &Credentials::new("owner@x.com", "pw"))
            .await?;

        assert_eq!(admin.id, "1");
        assert!(store.is_authenticated());
        assert_eq!(
            store.token().map(|t| t.expose_secret().to_string()),
            Some("tok-1".to_string())
        );
        let blob = storage
            .get(STORAGE_KEY)?
            .ok_or_else(|| anyhow!("session was not persisted"))?;
        assert!(Session::from_persisted(&blob)?.is_valid());
        Ok(())
    }

    #[tokio::test]
    async fn rejected_login_leaves_store_unchanged() -> Result<()> {
        let (storage, store) = store();
        let backend = FakeBackend {
            reply: || {
                Err(AuthError::Rejected {
                    status: 401,
                    message: "Invalid credentials".to_string(),
                })
            },
        };

        let err = store
            .login(&backend, &Credentials::new("owner@x.com", "wrongpass"))
            .await
            .err()
            .ok_or_else(|| anyhow!("expected error"))?;

        assert_eq!(err.to_string(), "Invalid credentials");
        assert!(store.snapshot().is_cleared());
        assert_eq!(storage.get(STORAGE_KEY)?, None);
        Ok(())
    }

    #[tokio::test]
    async fn login_without_token_is_invalid_response() -> Result<()> {
        let (_, store) = store();
        let responses: [fn() -> Result<LoginResponse, AuthError>; 3] = [
            || {
                Ok(LoginResponse {
                    admin: serde_json::from_value(admin_json()).ok(),
                    token: None,
                })
            },
            || {
                Ok(LoginResponse {
                    admin: serde_json::from_value(admin_json()).ok(),
                    token: Some("  ".to_string()),
                })
            },
            || {
                Ok(LoginResponse {
                    admin: None,
                    token: Some("tok".to_string()),
                })
            },
        ];

        for reply in responses {
            let err = store
                .login(&FakeBackend { reply }, &Credentials::new("a@b.com", "pw"))
                .await
                .err()
                .ok_or_else(|| anyhow!("expected error"))?;
            assert!(matches!(err, AuthError::InvalidResponse));
            assert!(store.snapshot().is_cleared());
        }
        Ok(())
    }

    #[tokio::test]
    async fn logout_is_idempotent_and_erases_durable_copy() -> Result<()> {
        let (storage, store) = store();
        store
            .login(&accepting(), &Credentials::new("owner@x.com", "pw"))
            .await?;

        store.logout();
        let once = store.snapshot();
        let once_blob = storage.get(STORAGE_KEY)?;

        store.logout();
        let twice = store.snapshot();

        assert!(once.is_cleared());
        assert!(twice.is_cleared());
        assert_eq!(once_blob, None);
        assert_eq!(storage.get(STORAGE_KEY)?, None);
        Ok(())
    }

    #[test]
    fn current_heals_corrupt_state() -> Result<()> {
        let (storage, store) = store();
        storage.set(STORAGE_KEY, "{}")?;
        store.restore(Session {
            admin: serde_json::from_value(admin_json()).ok(),
            token: Some(SecretString::from(String::new())),
            is_authenticated: true,
        });

        assert!(!store.is_authenticated());
        assert!(store.snapshot().is_cleared());
        assert_eq!(storage.get(STORAGE_KEY)?, None);
        Ok(())
    }

    #[test]
    fn mark_hydrated_signals_waiters() {
        let (_, store) = store();
        let signal = store.hydration_signal();
        assert!(!store.has_hydrated());

        store.mark_hydrated();

        assert!(store.has_hydrated());
        assert!(*signal.borrow());
    }

    #[tokio::test]
    async fn update_admin_saves_explicit_changes() -> Result<()> {
        let (storage, store) = store();
        store
            .login(&accepting(), &Credentials::new("owner@x.com", "pw"))
            .await?;

        let updated = store.update_admin(|admin| admin.name = "Renamed".to_string())?;
        assert_eq!(updated.map(|a| a.name), Some("Renamed".to_string()));

        let blob = storage
            .get(STORAGE_KEY)?
            .ok_or_else(|| anyhow!("session was not persisted"))?;
        let restored = Session::from_persisted(&blob)?;
        assert_eq!(restored.admin.map(|a| a.name), Some("Renamed".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn update_admin_that_drops_identity_clears_session() -> Result<()> {
        let (storage, store) = store();
        store
            .login(&accepting(), &Credentials::new("owner@x.com", "pw"))
            .await?;

        let updated = store.update_admin(|admin| admin.email.clear())?;

        assert!(updated.is_none());
        assert!(store.snapshot().is_cleared());
        assert_eq!(storage.get(STORAGE_KEY)?, None);
        Ok(())
    }

    #[test]
    fn update_admin_without_session_is_noop() -> Result<()> {
        let (_, store) = store();
        assert!(store.update_admin(|admin| admin.name.clear())?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn debug_output_hides_token() -> Result<()> {
        let (_, store) = store();
        store
            .login(&accepting(), &Credentials::new("owner@x.com", "pw"))
            .await?;
        assert!(!format!("{store:?}").contains("tok-1"));
        Ok(())
    }
}
