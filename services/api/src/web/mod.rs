pub mod affirmations;
pub mod auth;
pub mod middleware;
pub mod rest;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub use middleware::require_auth;
pub use rest::ApiDoc;
pub use state::AppState;

/// Builds the API router: public auth and guest routes plus the routes
/// guarded by `require_auth`.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/guest/prompt", get(rest::guest_prompt_handler));

    let protected_routes = Router::new()
        .route("/prompts", post(rest::generate_prompt_handler))
        .route(
            "/sessions",
            post(rest::create_session_handler).get(rest::list_sessions_handler),
        )
        .route("/dashboard", get(rest::dashboard_handler))
        .route(
            "/profile",
            get(rest::get_profile_handler).put(rest::update_profile_handler),
        )
        .route("/affirmations", post(affirmations::create_affirmation_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}
