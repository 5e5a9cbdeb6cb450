pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::terms::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/terms",
            get(handlers::handle_list_terms).post(handlers::handle_add_term),
        )
        .route(
            "/api/terms/:id",
            get(handlers::handle_get_term).delete(handlers::handle_delete_term),
        )
        .route("/api/check/:id", post(handlers::handle_check_term))
        .route("/api/check-all", post(handlers::handle_check_all))
        .with_state(state)
}
