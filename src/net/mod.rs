//! Backend networking: REST client, wire types, errors.

pub mod api;
pub mod error;
pub mod types;
