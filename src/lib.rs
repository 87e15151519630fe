//! # dropfarm
//!
//! Client library for the Dropfarm automation backend.
//!
//! - [`net::api::ApiClient`]: REST calls for auth, routines and schedules,
//!   with cookie-based sessions.
//! - [`state::auth::AuthStore`]: reactive holder for the signed-in user.
//! - [`session::Session`]: runs an API call and updates the auth store.
//!
//! The library logs through `tracing` and never installs a subscriber.

pub mod config;
pub mod net;
pub mod session;
pub mod state;

#[cfg(test)]
mod test_helpers;

pub use config::{ClientConfig, ConfigError};
pub use net::api::ApiClient;
pub use net::error::{ApiError, ErrorKind};
pub use net::types::{LoginResponse, NewRoutine, NewSchedule, Routine, Schedule, User};
pub use session::Session;
pub use state::auth::{AuthState, AuthStore, auth_store};
pub use state::store::{Store, Subscription};
