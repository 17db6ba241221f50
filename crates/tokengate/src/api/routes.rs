//! API route definitions.

use axum::{
    Router, middleware,
    routing::{any, get, post},
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::auth::{auth_middleware, require_role};

use super::handlers;
use super::state::AppState;

/// Create the application router, mounted under `/api/v1`.
pub fn create_router(state: AppState) -> Router {
    // Tracing layer with request timing
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let auth_state = state.auth.clone();

    // Admin routes (require the admin role on top of authentication)
    let admin_routes = Router::new()
        .route("/users", get(handlers::list_users))
        .route("/get-all-users", get(handlers::list_users))
        .route("/", any(handlers::not_found))
        .route("/{*rest}", any(handlers::not_found))
        .route_layer(middleware::from_fn_with_state(
            state.admin_gate.clone(),
            require_role,
        ));

    // Protected routes (require authentication)
    let protected_routes = Router::new()
        .route("/hello", get(handlers::hello))
        .route("/me", get(handlers::me))
        .nest("/admin", admin_routes)
        // Unknown paths are gated like known ones
        .route("/{*rest}", any(handlers::not_found))
        .route_layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .with_state(state.clone());

    // Public routes (no authentication)
    let public_routes = Router::new()
        .route("/auth/login", post(handlers::login))
        .route("/login", post(handlers::login))
        .with_state(state);

    Router::new()
        .nest("/api/v1", public_routes.merge(protected_routes))
        .layer(trace_layer)
}
