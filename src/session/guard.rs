//! Route protection for dashboard views.
//!
//! A guard is created per protected entry point ("mount") and walks
//! `Init → CheckingAuth → Authorized | Redirecting`. It checks once right away
//! and, when that answer is not definitive because hydration is still
//! pending, waits for the hydration signal or a bounded grace period before a
//! final, fail-closed check. A guard unmounted while waiting does nothing when
//! it wakes up.
//!
//! This is a UX gate. Access control must still be enforced by the API.

use crate::config::DEFAULT_HYDRATION_GRACE;
use crate::session::{
    store::SessionStore,
    types::{Admin, Permission},
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

pub const LOGIN_ROUTE: &str = "/login";
pub const HOME_ROUTE: &str = "/";

/// Moves the client to another route.
pub trait Navigator: Send + Sync {
    /// Navigates to `path`, replacing the current history entry so going back
    /// cannot return to the page that redirected.
    fn replace(&self, path: &str);
}

/// Keeps every navigation request, most recent last.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<String> {
        self.visited().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn replace(&self, path: &str) {
        debug!("navigate (replace) to {}", path);
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardPhase {
    Init,
    CheckingAuth,
    Authorized,
    Redirecting,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedirectReason {
    /// No valid session; sent to the login page.
    Unauthenticated,
    /// Valid session without the required permission; sent home.
    Forbidden,
    /// Signed-in visitor on the login page; sent home.
    AlreadySignedIn,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
    pub to: &'static str,
    pub reason: RedirectReason,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardOutcome {
    Authorized(Admin),
    Redirecting(Redirect),
    Loading,
}

/// Shared liveness flag of one guard mount.
#[derive(Clone, Debug, Default)]
pub struct MountHandle(Arc<AtomicBool>);

impl MountHandle {
    pub fn unmount(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn mount(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

pub struct RouteGuard<'a> {
    store: &'a SessionStore,
    navigator: &'a dyn Navigator,
    requirement: Option<Permission>,
    grace: Duration,
    phase: GuardPhase,
    outcome: Option<GuardOutcome>,
    mount: MountHandle,
}

impl<'a> RouteGuard<'a> {
    #[must_use]
    pub fn new(store: &'a SessionStore, navigator: &'a dyn Navigator) -> Self {
        Self {
            store,
            navigator,
            requirement: None,
            grace: DEFAULT_HYDRATION_GRACE,
            phase: GuardPhase::Init,
            outcome: None,
            mount: MountHandle::default(),
        }
    }

    /// Additionally requires `permission` from the signed-in admin.
    #[must_use]
    pub fn require(mut self, permission: Permission) -> Self {
        self.requirement = Some(permission);
        self
    }

    #[must_use]
    pub const fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    #[must_use]
    pub const fn phase(&self) -> GuardPhase {
        self.phase
    }

    #[must_use]
    pub fn mount_handle(&self) -> MountHandle {
        self.mount.clone()
    }

    /// `Init → CheckingAuth`. Mounting twice is a no-op.
    pub fn mount(&mut self) {
        if self.phase == GuardPhase::Init {
            self.mount.mount();
            self.phase = GuardPhase::CheckingAuth;
        }
    }

    pub fn unmount(&self) {
        self.mount.unmount();
    }

    /// One check against the current store values. Returns `None` while the
    /// answer is not definitive, i.e. before mounting, after unmounting, or
    /// when the session is invalid but hydration has not completed yet.
    pub fn check(&mut self) -> Option<GuardOutcome> {
        self.evaluate(false)
    }

    /// Runs the whole mount: immediate check, bounded wait for hydration if
    /// needed, final check. Always settles; `Loading` means the guard was
    /// unmounted before it could decide.
    pub async fn resolve(&mut self) -> GuardOutcome {
        self.mount();

        if let Some(outcome) = self.evaluate(false) {
            return outcome;
        }

        let mut hydrated = self.store.hydration_signal();
        if tokio::time::timeout(self.grace, hydrated.wait_for(|done| *done))
            .await
            .is_err()
        {
            debug!("hydration signal not seen within {:?}", self.grace);
        }

        if !self.mount.is_mounted() {
            debug!("guard unmounted while waiting, ignoring late check");
            return GuardOutcome::Loading;
        }

        self.evaluate(true).unwrap_or(GuardOutcome::Loading)
    }

    fn evaluate(&mut self, final_check: bool) -> Option<GuardOutcome> {
        match self.phase {
            GuardPhase::Init => return None,
            GuardPhase::Authorized | GuardPhase::Redirecting => return self.outcome.clone(),
            GuardPhase::CheckingAuth => {}
        }
        if !self.mount.is_mounted() {
            return None;
        }

        let session = self.store.snapshot();
        if session.is_valid() {
            let admin = session.admin?;
            if let Some(permission) = &self.requirement {
                if !admin.has(permission) {
                    info!("admin {} lacks {}, redirecting home", admin.id, permission);
                    return Some(self.redirect(HOME_ROUTE, RedirectReason::Forbidden));
                }
            }
            return Some(self.settle(GuardPhase::Authorized, GuardOutcome::Authorized(admin)));
        }

        if !final_check && !self.store.has_hydrated() {
            return None;
        }

        info!("no valid session, redirecting to login");
        self.store.logout();
        Some(self.redirect(LOGIN_ROUTE, RedirectReason::Unauthenticated))
    }

    fn redirect(&mut self, to: &'static str, reason: RedirectReason) -> GuardOutcome {
        self.navigator.replace(to);
        self.settle(
            GuardPhase::Redirecting,
            GuardOutcome::Redirecting(Redirect { to, reason }),
        )
    }

    fn settle(&mut self, phase: GuardPhase, outcome: GuardOutcome) -> GuardOutcome {
        self.phase = phase;
        self.outcome = Some(outcome.clone());
        outcome
    }
}

/// Login-page counterpart of the guard: a signed-in, hydrated visitor is sent
/// to the dashboard instead of seeing the form again.
pub fn redirect_if_signed_in(store: &SessionStore, navigator: &dyn Navigator) -> Option<Redirect> {
    if !store.has_hydrated() || !store.is_authenticated() {
        return None;
    }
    navigator.replace(HOME_ROUTE);
    Some(Redirect {
        to: HOME_ROUTE,
        reason: RedirectReason::AlreadySignedIn,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{
        hydration::hydrate,
        state::{Session, STORAGE_KEY},
        storage::{MemoryStorage, SessionStorage},
        types::{PermissionSet, Resource},
    };
    use anyhow::{anyhow, Result};
    use secrecy::SecretString;
    use serde_json::json;

    const SHORT: Duration = Duration::from_millis(20);

    fn store_with(blob: Option<&str>) -> (Arc<MemoryStorage>, SessionStore) {
        let storage = match blob {
            Some(blob) => MemoryStorage::new().with_entry(STORAGE_KEY, blob),
            None => MemoryStorage::new(),
        };
        let storage = Arc::new(storage);
        let store = SessionStore::new(storage.clone());
        (storage, store)
    }

    fn valid_session(role: &str, permissions: Option<PermissionSet>) -> Result<Session> {
        let mut admin: Admin = serde_json::from_value(json!({
            "id": "1", "email": "a@b.com", "role": role
        }))?;
        admin.permissions = permissions;
        Ok(Session::authenticated(admin, SecretString::from("xyz".to_string())))
    }

    #[tokio::test]
    async fn no_persisted_session_redirects_to_login() {
        let (_, store) = store_with(None);
        hydrate(&store);
        let navigator = RecordingNavigator::new();

        let mut guard = RouteGuard::new(&store, &navigator).with_grace(SHORT);
        let outcome = guard.resolve().await;

        assert_eq!(
            outcome,
            GuardOutcome::Redirecting(Redirect {
                to: LOGIN_ROUTE,
                reason: RedirectReason::Unauthenticated
            })
        );
        assert_eq!(guard.phase(), GuardPhase::Redirecting);
        assert_eq!(navigator.visited(), vec!["/login".to_string()]);
    }

    #[tokio::test]
    async fn valid_persisted_session_is_authorized() -> Result<()> {
        let (_, store) = store_with(Some(
            r#"{"state":{"admin":{"id":"1","email":"a@b.com"},"token":"xyz","isAuthenticated":true}}"#,
        ));
        hydrate(&store);
        let navigator = RecordingNavigator::new();

        let outcome = RouteGuard::new(&store, &navigator).resolve().await;

        match outcome {
            GuardOutcome::Authorized(admin) => assert_eq!(admin.email, "a@b.com"),
            other => return Err(anyhow!("unexpected outcome: {other:?}")),
        }
        assert!(navigator.visited().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn persisted_session_without_admin_redirects_and_clears() -> Result<()> {
        let (storage, store) = store_with(Some(
            r#"{"state":{"admin":null,"token":"xyz","isAuthenticated":true}}"#,
        ));
        hydrate(&store);
        let navigator = RecordingNavigator::new();

        let outcome = RouteGuard::new(&store, &navigator).resolve().await;

        assert!(matches!(outcome, GuardOutcome::Redirecting(_)));
        assert_eq!(navigator.last().as_deref(), Some("/login"));
        assert_eq!(storage.get(STORAGE_KEY)?, None);
        Ok(())
    }

    #[tokio::test]
    async fn empty_token_never_renders_children() -> Result<()> {
        let (storage, store) = store_with(None);
        store.mark_hydrated();
        storage.set(STORAGE_KEY, "{}")?;
        let mut corrupt = valid_session("admin", None)?;
        corrupt.token = Some(SecretString::from(String::new()));
        store.restore(corrupt);

        let navigator = RecordingNavigator::new();
        let outcome = RouteGuard::new(&store, &navigator).resolve().await;

        assert!(matches!(
            outcome,
            GuardOutcome::Redirecting(Redirect {
                reason: RedirectReason::Unauthenticated,
                ..
            })
        ));
        assert!(store.snapshot().is_cleared());
        assert_eq!(storage.get(STORAGE_KEY)?, None);
        Ok(())
    }

    #[tokio::test]
    async fn empty_token_before_hydration_redirects_after_grace() -> Result<()> {
        let (_, store) = store_with(None);
        let mut corrupt = valid_session("admin", None)?;
        corrupt.token = Some(SecretString::from(String::new()));
        store.restore(corrupt);

        let navigator = RecordingNavigator::new();
        let mut guard = RouteGuard::new(&store, &navigator).with_grace(SHORT);

        guard.mount();
        assert_eq!(guard.check(), None);
        assert_eq!(guard.phase(), GuardPhase::CheckingAuth);

        let outcome = guard.resolve().await;
        assert!(matches!(outcome, GuardOutcome::Redirecting(_)));
        assert_eq!(navigator.visited(), vec!["/login".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn hydration_finishing_during_wait_is_observed() -> Result<()> {
        let storage = Arc::new(MemoryStorage::new().with_entry(
            STORAGE_KEY,
            r#"{"state":{"admin":{"id":"1","email":"a@b.com"},"token":"xyz","isAuthenticated":true}}"#,
        ));
        let store = SessionStore::new(storage);
        let navigator = RecordingNavigator::new();
        let mut guard = RouteGuard::new(&store, &navigator).with_grace(Duration::from_secs(5));

        let (outcome, _) = tokio::join!(guard.resolve(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            hydrate(&store);
        });

        assert!(matches!(outcome, GuardOutcome::Authorized(_)));
        assert!(navigator.visited().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn unmounted_guard_ignores_late_check() {
        let (_, store) = store_with(None);
        let navigator = RecordingNavigator::new();
        let mut guard = RouteGuard::new(&store, &navigator).with_grace(Duration::from_millis(200));
        let handle = guard.mount_handle();

        let (outcome, ()) = tokio::join!(guard.resolve(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            handle.unmount();
        });

        assert_eq!(outcome, GuardOutcome::Loading);
        assert!(navigator.visited().is_empty());
        assert!(!store.has_hydrated());
    }

    #[tokio::test]
    async fn missing_permission_redirects_home_and_keeps_session() -> Result<()> {
        let (_, store) = store_with(None);
        let permissions = PermissionSet::default().with(Resource::Users, "view", true);
        store.restore(valid_session("moderator", Some(permissions))?);
        store.mark_hydrated();

        let navigator = RecordingNavigator::new();
        let outcome = RouteGuard::new(&store, &navigator)
            .require(Permission::new(Resource::Users, "delete"))
            .resolve()
            .await;

        assert_eq!(
            outcome,
            GuardOutcome::Redirecting(Redirect {
                to: HOME_ROUTE,
                reason: RedirectReason::Forbidden
            })
        );
        assert!(store.is_authenticated());
        Ok(())
    }

    #[tokio::test]
    async fn owner_passes_any_requirement() -> Result<()> {
        let (_, store) = store_with(None);
        store.restore(valid_session("owner", None)?);
        store.mark_hydrated();

        let navigator = RecordingNavigator::new();
        let outcome = RouteGuard::new(&store, &navigator)
            .require(Permission::new(Resource::Admins, "create"))
            .resolve()
            .await;

        assert!(matches!(outcome, GuardOutcome::Authorized(_)));
        Ok(())
    }

    #[tokio::test]
    async fn settled_guard_returns_cached_outcome() -> Result<()> {
        let (_, store) = store_with(None);
        store.restore(valid_session("owner", None)?);
        store.mark_hydrated();
        let navigator = RecordingNavigator::new();
        let mut guard = RouteGuard::new(&store, &navigator);

        let first = guard.resolve().await;
        store.logout();
        assert_eq!(guard.check(), Some(first));
        assert_eq!(guard.phase(), GuardPhase::Authorized);
        Ok(())
    }

    #[test]
    fn check_before_mount_is_not_definitive() {
        let (_, store) = store_with(None);
        store.mark_hydrated();
        let navigator = RecordingNavigator::new();
        let mut guard = RouteGuard::new(&store, &navigator);

        assert_eq!(guard.phase(), GuardPhase::Init);
        assert_eq!(guard.check(), None);
        assert!(navigator.visited().is_empty());
    }

    #[test]
    fn login_page_sends_signed_in_admin_home() -> Result<()> {
        let (_, store) = store_with(None);
        let navigator = RecordingNavigator::new();

        store.mark_hydrated();
        assert_eq!(redirect_if_signed_in(&store, &navigator), None);

        store.restore(valid_session("admin", None)?);
        let redirect = redirect_if_signed_in(&store, &navigator)
            .ok_or_else(|| anyhow!("expected redirect"))?;
        assert_eq!(redirect.reason, RedirectReason::AlreadySignedIn);
        assert_eq!(navigator.visited(), vec!["/".to_string()]);
        Ok(())
    }
}
