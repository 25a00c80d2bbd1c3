//! The console context: one explicit object that owns the session store and
//! hands out the collaborators built around it. Created at start, dropped at
//! exit; there is no process-wide session.

use crate::api::{ApiClient, ApiError};
use crate::config::ConsoleConfig;
use crate::session::{
    hydrate, Admin, AuthError, Credentials, FileStorage, HttpAuthBackend, HydrationOutcome,
    Navigator, RouteGuard, SessionStorage, SessionStore,
};
use crate::APP_USER_AGENT;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug)]
pub struct Console {
    config: ConsoleConfig,
    store: Arc<SessionStore>,
    backend: HttpAuthBackend,
    api: ApiClient,
}

impl Console {
    /// Builds the context over `storage` without hydrating it.
    ///
    /// # Errors
    /// Returns an error if an HTTP client cannot be built.
    pub fn new(config: ConsoleConfig, storage: Arc<dyn SessionStorage>) -> Result<Self, ConsoleError> {
        let backend = HttpAuthBackend::new(APP_USER_AGENT, config.timeout, config.login_candidates())?;
        let api = ApiClient::new(
            APP_USER_AGENT,
            &config.api_base_url,
            config.timeout,
            storage.clone(),
        )?;
        let store = Arc::new(SessionStore::new(storage));

        Ok(Self {
            config,
            store,
            backend,
            api,
        })
    }

    /// Builds the context over file storage in `config.state_dir` and runs
    /// hydration.
    ///
    /// # Errors
    /// Returns an error if an HTTP client cannot be built.
    pub fn start(config: ConsoleConfig) -> Result<Self, ConsoleError> {
        let storage = Arc::new(FileStorage::new(config.state_dir.clone()));
        let console = Self::new(config, storage)?;
        let outcome = console.hydrate();
        debug!("console started, hydration: {:?}", outcome);
        Ok(console)
    }

    pub fn hydrate(&self) -> HydrationOutcome {
        hydrate(&self.store)
    }

    #[must_use]
    pub const fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn backend(&self) -> &HttpAuthBackend {
        &self.backend
    }

    /// A guard over this console's store using the configured grace period.
    #[must_use]
    pub fn guard<'a>(&'a self, navigator: &'a dyn Navigator) -> RouteGuard<'a> {
        RouteGuard::new(&self.store, navigator).with_grace(self.config.hydration_grace)
    }

    /// # Errors
    /// See [`SessionStore::login`].
    pub async fn login(&self, credentials: &Credentials) -> Result<Admin, AuthError> {
        self.store.login(&self.backend, credentials).await
    }

    pub fn logout(&self) {
        self.store.logout();
    }
}
