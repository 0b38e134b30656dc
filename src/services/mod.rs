//! Service layer exposed to the HTTP handlers

mod error;
pub mod user_service;

pub use error::ServiceError;
pub use user_service::{UserService, UserUpdate};
