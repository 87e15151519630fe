//! Client-side reactive state.
//!
//! DESIGN
//! ======
//! `store` is the generic writable primitive; `auth` builds the session's
//! auth state on top of it.

pub mod auth;
pub mod store;
