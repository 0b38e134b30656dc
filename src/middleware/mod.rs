//! Middleware for the user registration API
//!
//! Request tracing, security headers, and bearer authentication.

pub mod auth;
mod request_trace;
mod security;

pub use auth::AuthenticatedUser;
pub use request_trace::request_tracing;
pub use security::security_headers;
