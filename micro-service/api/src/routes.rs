use axum::{
    Router,
    routing::{get, post},
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use app_config::CorsConfig;
use app_error::middleware_handling::error_handling_middleware;
use app_middleware::api_middleware::{logging_middleware, security_headers_middleware};

use crate::{
    handlers::{auth, chat, system},
    state::AppState,
};

/// Prefix under which the auth and chat routes are also mounted
pub const API_PREFIX: &str = "/api/v1";

fn cors_layer(cors_config: &CorsConfig) -> CorsLayer {
    CorsLayer::new()
        // "*" means any origin, otherwise use the exact list
        .allow_origin(
            if cors_config.allowed_origins.iter().any(|origin| origin == "*") {
                AllowOrigin::any()
            } else {
                AllowOrigin::list(
                    cors_config
                        .allowed_origins
                        .iter()
                        .filter_map(|origin| origin.parse().ok())
                        .collect::<Vec<_>>(),
                )
            },
        )
        .allow_methods(
            cors_config
                .allowed_methods
                .iter()
                .filter_map(|method| method.parse().ok())
                .collect::<Vec<_>>(),
        )
        .allow_headers(
            cors_config
                .allowed_headers
                .iter()
                .filter_map(|header| header.parse().ok())
                .collect::<Vec<_>>(),
        )
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/chat", post(chat::chat))
}

pub fn create_routes(state: AppState) -> Router {
    let server_config = &state.config.server;
    let body_limit = server_config.body_limit;
    let timeout = Duration::from_secs(server_config.request_timeout_secs);
    let cors = cors_layer(&state.config.security.cors);

    // Global middleware stack, outermost first
    let middleware_stack = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(cors)
        .layer(CompressionLayer::new());

    let api = api_routes();

    let app = Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .merge(api.clone())
        .nest(API_PREFIX, api)
        .fallback(system::not_found)
        .with_state(state);

    // Innermost first: anything these produce is reshaped by the error middleware
    let app = app
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TimeoutLayer::new(timeout))
        .layer(CatchPanicLayer::new())
        .layer(axum::middleware::from_fn(error_handling_middleware));

    let app = app
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(axum::middleware::from_fn(logging_middleware));

    app.layer(middleware_stack)
}
