//! Client configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! The backend base URL has three layers: the built-in default, a
//! compile-time `DROPFARM_API_URL`, and a run-time `DROPFARM_API_URL`
//! (process environment or `.env`). Later layers win.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const API_URL_ENV: &str = "DROPFARM_API_URL";
pub const SESSION_COOKIE_ENV: &str = "DROPFARM_SESSION_COOKIE";

/// Errors produced while building a [`ClientConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid session cookie: expected `name=value`")]
    InvalidSessionCookie,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash.
    pub base_url: String,
    /// Optional `name=value` cookie seeded into the jar before the first call.
    pub session_cookie: Option<String>,
}

impl ClientConfig {
    /// Build a config for an explicit base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL is not absolute http(s).
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self { base_url: parse_base_url(base_url)?, session_cookie: None })
    }

    /// Attach a session cookie (`name=value`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSessionCookie`] if the cookie has no name.
    pub fn with_session_cookie(mut self, cookie: &str) -> Result<Self, ConfigError> {
        self.session_cookie = Some(parse_session_cookie(cookie)?);
        Ok(self)
    }

    /// Build config from the environment, loading `.env` first if present.
    ///
    /// Optional:
    /// - `DROPFARM_API_URL`: backend base URL (default [`default_api_url`])
    /// - `DROPFARM_SESSION_COOKIE`: `name=value` cookie to start with
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if either variable is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let raw_url = std::env::var(API_URL_ENV).unwrap_or_else(|_| default_api_url().to_owned());
        let config = Self::new(&raw_url)?;

        match std::env::var(SESSION_COOKIE_ENV) {
            Ok(cookie) if !cookie.trim().is_empty() => config.with_session_cookie(&cookie),
            _ => Ok(config),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url().trim_end_matches('/').to_owned(),
            session_cookie: None,
        }
    }
}

/// Base URL baked in at build time, falling back to [`DEFAULT_API_URL`].
#[must_use]
pub fn default_api_url() -> &'static str {
    option_env!("DROPFARM_API_URL").unwrap_or(DEFAULT_API_URL)
}

pub(crate) fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let invalid = |reason: String| ConfigError::InvalidBaseUrl { url: raw.to_owned(), reason };

    let url = reqwest::Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme `{other}`"))),
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed".to_owned()));
    }

    Ok(trimmed.to_owned())
}

pub(crate) fn parse_session_cookie(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    match trimmed.split_once('=') {
        Some((name, _)) if !name.trim().is_empty() => Ok(trimmed.to_owned()),
        _ => Err(ConfigError::InvalidSessionCookie),
    }
}
