//! Session flow: run an API call, then update the auth store.
//!
//! The API client never touches the store itself. `Session` is the single
//! place that does, which keeps one writer per logical operation.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use serde_json::Value;

use crate::config::ClientConfig;
use crate::net::api::ApiClient;
use crate::net::error::ApiError;
use crate::net::types::LoginResponse;
use crate::state::auth::{AuthStore, auth_store};

#[derive(Clone)]
pub struct Session {
    client: ApiClient,
    store: AuthStore,
}

impl Session {
    #[must_use]
    pub fn new(client: ApiClient, store: AuthStore) -> Self {
        Self { client, store }
    }

    /// Build a client from `config` bound to the process-wide auth store.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::new(ApiClient::new(config)?, auth_store().clone()))
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    #[must_use]
    pub fn store(&self) -> &AuthStore {
        &self.store
    }

    /// Log in and publish the returned user. The store is left untouched on
    /// failure.
    ///
    /// # Errors
    ///
    /// Propagates the API error unchanged.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let response = self.client.auth().login(email, password).await?;
        tracing::info!(user_id = response.user.id, "logged in");
        self.store.set_user(Some(response.user.clone()));
        Ok(response)
    }

    /// Register a new account. Does not sign in.
    ///
    /// # Errors
    ///
    /// Propagates the API error unchanged.
    pub async fn register(&self, email: &str, password: &str) -> Result<Value, ApiError> {
        self.client.auth().register(email, password).await
    }

    /// Log out on the server and clear the store. The store is cleared even if
    /// the server call fails.
    ///
    /// # Errors
    ///
    /// Returns the API error after the store has been cleared.
    pub async fn logout(&self) -> Result<Value, ApiError> {
        let result = self.client.auth().logout().await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "server logout failed; clearing local session anyway");
        }
        self.store.logout();
        tracing::info!("logged out");
        result
    }
}
