use axum::{
    Json,
    body::Body,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Instant;
use tracing::{debug, error};

use crate::ErrorResponse;

/// Normalises responses produced outside the handlers (body limit,
/// timeouts, panics) into the JSON error shape. JSON bodies from
/// `AppError` are passed through untouched.
pub async fn error_handling_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let path = req.uri().path().to_owned();
    let method = req.method().clone();

    let response = next.run(req).await;

    debug!(
        "Request completed: {} {} - Status: {} - Time: {:?}",
        method,
        path,
        response.status(),
        start.elapsed()
    );

    let status = response.status();
    if is_json(&response) {
        return response;
    }

    if status == StatusCode::PAYLOAD_TOO_LARGE {
        error!("Request body too large: {}", status);

        let body = ErrorResponse::new(
            status,
            "PAYLOAD_TOO_LARGE",
            "The request body exceeds the maximum allowed size",
        )
        .with_help("Please reduce the size of your request and try again");
        return (status, Json(body)).into_response();
    }

    if status == StatusCode::REQUEST_TIMEOUT {
        error!("Request timed out: {} {}", method, path);

        let body = ErrorResponse::new(status, "TIMEOUT", "The request took too long to complete")
            .with_help("Please try again later");
        return (status, Json(body)).into_response();
    }

    if status.is_server_error() {
        error!("Server error occurred: {}", status);

        let body = ErrorResponse::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "SERVER_ERROR",
            "An internal server error occurred",
        )
        .with_help("Please try again later or contact support if the issue persists");
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
    }

    response
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}
