pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::aggregation;
use crate::notes;
use crate::selection;
use crate::state::AppState;
use crate::summary;
use crate::users;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // User directory and identity selection
        .route("/api/v1/users", get(users::handlers::handle_list_users))
        .route("/api/v1/users", post(users::handlers::handle_create_user))
        .route("/api/v1/login", post(users::handlers::handle_login))
        .route(
            "/api/v1/users/:id/profile",
            put(users::handlers::handle_update_profile),
        )
        // Daily notes
        .route(
            "/api/v1/users/:id/notes",
            get(notes::handlers::handle_list_notes).post(notes::handlers::handle_submit_note),
        )
        .route(
            "/api/v1/users/:id/notes/by-date",
            get(notes::handlers::handle_note_by_date),
        )
        // Selection roster
        .route(
            "/api/v1/users/:id/selection",
            get(selection::handlers::handle_get_selection),
        )
        .route(
            "/api/v1/users/:id/selection/toggle",
            post(selection::handlers::handle_toggle),
        )
        // Aggregated view
        .route(
            "/api/v1/users/:id/aggregate",
            get(aggregation::handlers::handle_aggregate),
        )
        // AI summary pipeline
        .route(
            "/api/v1/users/:id/summary",
            post(summary::handlers::handle_summarize),
        )
        // The summarization function itself; non-POST methods get a 405
        // with the function's flat error body.
        .route(
            "/generate-summary",
            post(summary::generate::handle_generate_summary)
                .fallback(summary::generate::handle_method_not_allowed),
        )
        .with_state(state)
}
