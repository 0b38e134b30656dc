//! API handlers for the user registration service

pub mod auth;
mod extract;
pub mod user;

pub use auth::{login, refresh_token};
pub use extract::ValidatedJson;
pub use user::{create_user, get_current_user, get_user, get_workflow_history, update_user};

// Re-export AuthenticatedUser from middleware for handler use
pub use crate::middleware::auth::AuthenticatedUser;
