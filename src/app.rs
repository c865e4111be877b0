use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::handlers::{elevated, protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Build the full HTTP application. Every route lives under `/api`.
pub fn app(state: AppState) -> Router {
    let max_body = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config.security);

    Router::new()
        .nest("/api", api_routes(state.clone()))
        .fallback(route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(max_body)),
        )
        .with_state(state)
}

// A known path with the wrong method is still an unknown route
fn api_routes(state: AppState) -> Router<AppState> {
    public_routes()
        .merge(protected_routes(state))
        .method_not_allowed_fallback(route_not_found)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(public::health))
        .route("/setup/status", get(public::setup_status))
        .route("/setup/init", post(public::setup_init))
        .route("/auth/login", post(public::login))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Caller's own account
        .route("/auth/logout", post(protected::logout))
        .route("/auth/me", get(protected::me))
        .route("/auth/password", put(protected::change_password))
        // Teams and membership
        .route("/team", get(protected::team_list).post(protected::team_create))
        .route(
            "/team/:id",
            get(protected::team_get)
                .put(protected::team_update)
                .delete(protected::team_delete),
        )
        .route("/team/:id/members", post(protected::member_add))
        .route(
            "/team/:id/members/:user_id",
            put(protected::member_update).delete(protected::member_remove),
        )
        // User administration
        .route("/setup/create-admin", post(elevated::create_admin))
        .route("/admin/users", get(elevated::user_list))
        .route("/admin/users/:id/role", put(elevated::user_update_role))
        .route("/admin/users/:id", delete(elevated::user_delete))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
