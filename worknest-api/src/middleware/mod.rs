/// Middleware modules for the API server
///
/// Token validation lives in `worknest_shared::auth::middleware`; this module
/// holds the admin gate, which needs storage, and response-level concerns.

pub mod admin;
pub mod security;
