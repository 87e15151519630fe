//! REST API client for the Dropfarm backend.
//!
//! DESIGN
//! ======
//! One `reqwest::Client` with a cookie jar is shared by every call, so the
//! session cookie set by `/auth/login` rides along on later requests. The
//! client never reads or attaches tokens itself.
//!
//! Operations are grouped per resource (`auth()`, `routines()`,
//! `schedules()`). Each is a single attempt: no retries, no timeouts.
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx responses become `ApiError::Http` carrying the server `detail` or
//! the operation's fallback message. Anything that stops the exchange from
//! completing is `ApiError::Transport`.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ApiError;
use super::types::{Credentials, LoginResponse, Routine, Schedule};
use crate::config::ClientConfig;

const LOGIN_FAILED: &str = "Login failed";
const REGISTER_FAILED: &str = "Registration failed";
const LOGOUT_FAILED: &str = "Logout failed";
const LIST_ROUTINES_FAILED: &str = "Failed to fetch routines";
const CREATE_ROUTINE_FAILED: &str = "Failed to create routine";
const START_ROUTINE_FAILED: &str = "Failed to start routine";
const STOP_ROUTINE_FAILED: &str = "Failed to stop routine";
const LIST_SCHEDULES_FAILED: &str = "Failed to fetch schedules";
const CREATE_SCHEDULE_FAILED: &str = "Failed to create schedule";

/// Serializes as `{}` for POSTs that carry no payload.
#[derive(Serialize)]
struct EmptyBody {}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base_url: String,
}

impl ApiClient {
    /// Build a client for `config.base_url`, seeding `config.session_cookie`
    /// into the cookie jar when present.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base_url = config.base_url.trim_end_matches('/').to_owned();
        let jar = Arc::new(Jar::default());

        if let Some(cookie) = &config.session_cookie {
            match Url::parse(&base_url) {
                Ok(url) => jar.add_cookie_str(&format!("{cookie}; Path=/"), &url),
                Err(e) => tracing::warn!(%base_url, error = %e, "session cookie not seeded"),
            }
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .default_headers(headers)
            .build()?;

        Ok(Self { http, jar, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Cookies the jar currently sends to the base URL, as `name=value` pairs.
    #[must_use]
    pub fn session_cookies(&self) -> Vec<String> {
        let Ok(url) = Url::parse(&self.base_url) else {
            return Vec::new();
        };
        self.jar
            .cookies(&url)
            .and_then(|header| header.to_str().map(str::to_owned).ok())
            .map(|header| header.split("; ").map(str::to_owned).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { client: self }
    }

    #[must_use]
    pub fn routines(&self) -> RoutinesApi<'_> {
        RoutinesApi { client: self }
    }

    #[must_use]
    pub fn schedules(&self) -> SchedulesApi<'_> {
        SchedulesApi { client: self }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, fallback: &str) -> Result<T, ApiError> {
        self.send(Method::GET, path, None::<&EmptyBody>, fallback).await
    }

    async fn post<B, T>(&self, path: &str, body: &B, fallback: &str) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(body), fallback).await
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>, fallback: &str) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(%method, path, "api request");

        let request = self.http.request(method.clone(), self.url(path));
        let request = if let Some(body) = body { request.json(body) } else { request };

        let response = request.send().await.inspect_err(|e| {
            tracing::warn!(%method, path, error = %e, "api request did not complete");
        })?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let err = ApiError::from_response(status, &text, fallback);
            tracing::warn!(%method, path, status = status.as_u16(), message = %err, "api request failed");
            return Err(err);
        }

        decode_body(&text)
    }
}

/// Decode a success body. An empty body decodes as JSON `null`.
pub(crate) fn decode_body<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    if text.trim().is_empty() {
        return Ok(serde_json::from_value(Value::Null)?);
    }
    Ok(serde_json::from_str(text)?)
}

pub(crate) fn routine_action_path(routine_id: i64, action: &str) -> String {
    format!("/routines/{routine_id}/{action}")
}

// =============================================================================
// AUTH
// =============================================================================

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl AuthApi<'_> {
    /// `POST /auth/login` with a JSON `{email, password}` body.
    ///
    /// # Errors
    ///
    /// Returns the server `detail` (or `Login failed`) on a non-2xx status.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.client.post("/auth/login", &Credentials { email, password }, LOGIN_FAILED).await
    }

    /// `POST /auth/register`.
    ///
    /// # Errors
    ///
    /// Returns the server `detail` (or `Registration failed`) on a non-2xx status.
    pub async fn register(&self, email: &str, password: &str) -> Result<Value, ApiError> {
        self.client.post("/auth/register", &Credentials { email, password }, REGISTER_FAILED).await
    }

    /// `POST /auth/logout`.
    ///
    /// # Errors
    ///
    /// Returns the server `detail` (or `Logout failed`) on a non-2xx status.
    pub async fn logout(&self) -> Result<Value, ApiError> {
        self.client.post("/auth/logout", &EmptyBody {}, LOGOUT_FAILED).await
    }
}

// =============================================================================
// ROUTINES
// =============================================================================

pub struct RoutinesApi<'a> {
    client: &'a ApiClient,
}

impl RoutinesApi<'_> {
    /// `GET /routines`. The array is returned exactly as sent.
    ///
    /// # Errors
    ///
    /// Fails on a non-2xx status or a body that is not a JSON array.
    pub async fn list(&self) -> Result<Vec<Routine>, ApiError> {
        self.client.get("/routines", LIST_ROUTINES_FAILED).await
    }

    /// `POST /routines` with any serializable routine body.
    ///
    /// # Errors
    ///
    /// Fails on a non-2xx status.
    pub async fn create<B: Serialize + ?Sized>(&self, routine: &B) -> Result<Routine, ApiError> {
        self.client.post("/routines", routine, CREATE_ROUTINE_FAILED).await
    }

    /// `POST /routines/{id}/start`.
    ///
    /// # Errors
    ///
    /// Fails on a non-2xx status.
    pub async fn start(&self, routine_id: i64) -> Result<Value, ApiError> {
        let path = routine_action_path(routine_id, "start");
        self.client.post(&path, &EmptyBody {}, START_ROUTINE_FAILED).await
    }

    /// `POST /routines/{id}/stop`.
    ///
    /// # Errors
    ///
    /// Fails on a non-2xx status.
    pub async fn stop(&self, routine_id: i64) -> Result<Value, ApiError> {
        let path = routine_action_path(routine_id, "stop");
        self.client.post(&path, &EmptyBody {}, STOP_ROUTINE_FAILED).await
    }
}

// =============================================================================
// SCHEDULES
// =============================================================================

pub struct SchedulesApi<'a> {
    client: &'a ApiClient,
}

impl SchedulesApi<'_> {
    /// `GET /schedules`. The array is returned exactly as sent.
    ///
    /// # Errors
    ///
    /// Fails on a non-2xx status or a body that is not a JSON array.
    pub async fn list(&self) -> Result<Vec<Schedule>, ApiError> {
        self.client.get("/schedules", LIST_SCHEDULES_FAILED).await
    }

    /// `POST /schedules` with any serializable schedule body.
    ///
    /// # Errors
    ///
    /// Fails on a non-2xx status.
    pub async fn create<B: Serialize + ?Sized>(&self, schedule: &B) -> Result<Schedule, ApiError> {
        self.client.post("/schedules", schedule, CREATE_SCHEDULE_FAILED).await
    }
}
