//! One-time startup load of the persisted session.
//!
//! Fails closed: an unreadable, unparsable or incomplete blob is erased and
//! the store starts signed out. Nothing here returns an error to the caller.

use crate::session::{
    state::{Session, STORAGE_KEY},
    store::SessionStore,
};
use tracing::{debug, info, warn};

/// What hydration found in durable storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HydrationOutcome {
    /// A valid session was restored.
    Restored,
    /// Nothing was persisted.
    Empty,
    /// A blob was present but unusable; it has been erased.
    Discarded,
    /// The store had already been hydrated; nothing was read.
    AlreadyHydrated,
}

/// Loads, validates and publishes the persisted session, then marks the store
/// hydrated. Runs once per store; later calls return
/// [`HydrationOutcome::AlreadyHydrated`] without touching state.
pub fn hydrate(store: &SessionStore) -> HydrationOutcome {
    if store.has_hydrated() {
        debug!("session store already hydrated");
        return HydrationOutcome::AlreadyHydrated;
    }

    let outcome = match store.storage().get(STORAGE_KEY) {
        Ok(None) => {
            store.restore(Session::default());
            HydrationOutcome::Empty
        }
        Ok(Some(blob)) => match Session::from_persisted(&blob) {
            Ok(session) if session.is_valid() => {
                store.restore(session);
                HydrationOutcome::Restored
            }
            Ok(_) => {
                warn!("persisted session is incomplete, discarding");
                discard(store)
            }
            Err(err) => {
                warn!("persisted session is unreadable, discarding: {}", err);
                discard(store)
            }
        },
        Err(err) => {
            warn!("failed to read persisted session, discarding: {}", err);
            discard(store)
        }
    };

    store.mark_hydrated();

    match outcome {
        HydrationOutcome::Restored => info!("restored persisted session"),
        _ => debug!("hydration finished: {:?}", outcome),
    }
    outcome
}

fn discard(store: &SessionStore) -> HydrationOutcome {
    store.erase();
    store.restore(Session::default());
    HydrationOutcome::Discarded
}
