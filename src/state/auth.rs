//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! `Session` writes here after login/logout; UI code subscribes to re-render
//! identity-dependent views.
//!
//! DESIGN
//! ======
//! The user and the `is_authenticated` flag live in one `AuthState` value and
//! are published together, so no subscriber can observe one without the
//! other. The per-field subscriptions are projections of that single publish.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::{Mutex, OnceLock, PoisonError};

use super::store::{Store, Subscription};
use crate::net::types::User;

/// Current user plus the derived flag. `is_authenticated` is true iff a user
/// is present; the constructors are the only way to build one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    user: Option<User>,
    is_authenticated: bool,
}

impl AuthState {
    #[must_use]
    pub fn signed_out() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn signed_in(user: User) -> Self {
        Self { user: Some(user), is_authenticated: true }
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }
}

impl From<Option<User>> for AuthState {
    fn from(user: Option<User>) -> Self {
        user.map_or_else(Self::signed_out, Self::signed_in)
    }
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Clone)]
pub struct AuthStore {
    state: Store<AuthState>,
}

impl AuthStore {
    /// A store with no user.
    #[must_use]
    pub fn new() -> Self {
        Self { state: Store::new(AuthState::signed_out()) }
    }

    /// Replace the held user wholesale. `None` signs out.
    pub fn set_user(&self, user: Option<User>) {
        let next = AuthState::from(user);
        tracing::debug!(authenticated = next.is_authenticated(), "auth state set");
        self.state.set(next);
    }

    /// Clear the user. Always ends signed out, whatever the prior state.
    pub fn logout(&self) {
        self.set_user(None);
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthState {
        self.state.get()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.state.get().user
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.get().is_authenticated
    }

    /// Receive the full state now and on every change.
    pub fn subscribe(&self, callback: impl Fn(&AuthState) + Send + Sync + 'static) -> Subscription {
        self.state.subscribe(callback)
    }

    /// Receive the current user now and whenever it changes.
    pub fn subscribe_user(&self, callback: impl Fn(Option<&User>) + Send + Sync + 'static) -> Subscription {
        self.state.subscribe(move |state| callback(state.user()))
    }

    /// Receive the flag now and whenever it flips. Swapping one signed-in
    /// user for another does not re-notify.
    pub fn subscribe_authenticated(&self, callback: impl Fn(bool) + Send + Sync + 'static) -> Subscription {
        let last = Mutex::new(None::<bool>);
        self.state.subscribe(move |state| {
            let flag = state.is_authenticated();
            let changed = {
                let mut guard = last.lock().unwrap_or_else(PoisonError::into_inner);
                guard.replace(flag) != Some(flag)
            };
            if changed {
                callback(flag);
            }
        })
    }
}

impl Default for AuthStore {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide auth store, created signed out on first use.
#[must_use]
pub fn auth_store() -> &'static AuthStore {
    static STORE: OnceLock<AuthStore> = OnceLock::new();
    STORE.get_or_init(AuthStore::new)
}
