//! User route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::user::{
    create_user, get_current_user, get_user, get_workflow_history, update_user,
};
use crate::state::AppState;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/user", post(create_user).put(update_user))
        .route("/api/user/me", get(get_current_user))
        .route("/api/user/:user_id", get(get_user))
        .route("/api/user/:user_id/workflow", get(get_workflow_history))
}
