//! Wire DTOs for the backend REST API.
//!
//! DESIGN
//! ======
//! Only the auth payloads are typed. Routines and schedules are opaque to the
//! client and travel as `serde_json::Value`; the `New*` structs are optional
//! helpers for building request bodies and are never used to check responses.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A routine as returned by the backend. Passed through untouched.
pub type Routine = Value;

/// A schedule as returned by the backend. Passed through untouched.
pub type Schedule = Value;

/// The authenticated user carried in login responses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub is_active: bool,
}

/// JSON body for `POST /auth/login` and `POST /auth/register`.
#[derive(Debug, Serialize)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of a successful `POST /auth/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}

/// Request body for `POST /routines`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewRoutine {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Recorded automation steps, opaque to the client.
    pub steps: Value,
}

impl NewRoutine {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), description: None, steps: Value::Array(Vec::new()) }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_steps(mut self, steps: Value) -> Self {
        self.steps = steps;
        self
    }
}

/// Request body for `POST /schedules`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct NewSchedule {
    pub routine_id: i64,
    pub interval_seconds: i64,
    pub is_active: bool,
}

impl NewSchedule {
    /// An active schedule running `routine_id` every `interval_seconds`.
    #[must_use]
    pub fn new(routine_id: i64, interval_seconds: i64) -> Self {
        Self { routine_id, interval_seconds, is_active: true }
    }

    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}
