//! Operator session: who is signed in, how that survives a restart, and how
//! protected views decide whether to render.

pub mod backend;
pub mod error;
pub mod guard;
pub mod hydration;
pub mod state;
pub mod storage;
pub mod store;
pub mod types;

pub use backend::{AuthBackend, Credentials, HttpAuthBackend, LoginResponse};
pub use error::AuthError;
pub use guard::{
    redirect_if_signed_in, GuardOutcome, GuardPhase, MountHandle, Navigator, RecordingNavigator,
    Redirect, RedirectReason, RouteGuard,
};
pub use hydration::{hydrate, HydrationOutcome};
pub use state::{Session, STORAGE_KEY};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
pub use store::SessionStore;
pub use types::{Admin, AdminRole, Permission, PermissionSet, Resource};
