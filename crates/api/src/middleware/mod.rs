//! Authentication extractor.
//!
//! - [`auth::AuthUser`] -- Requires a Bearer token and identifies the caller.

pub mod auth;
